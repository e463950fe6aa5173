//! Form model rendered by the page
//!
//! Holds the two choice controls populated from the fitted vocabularies and
//! the four numeric inputs, with the currently submitted values retained.

use crate::encoder::CategoricalEncoder;
use crate::flow::PredictionContext;
use crate::request::{FormSubmission, MEASUREMENT_MIN};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceField {
    pub name: &'static str,
    pub label: &'static str,
    pub options: Vec<String>,
    pub selected: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberField {
    pub name: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub step: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormView {
    pub island: ChoiceField,
    pub measurements: Vec<NumberField>,
    pub sex: ChoiceField,
}

const MEASUREMENTS: [(&str, &str); 4] = [
    ("culmen_length_mm", "Culmen Length (mm)"),
    ("culmen_depth_mm", "Culmen Depth (mm)"),
    ("flipper_length_mm", "Flipper Length (mm)"),
    ("body_mass_g", "Body Mass (g)"),
];

/// Measurements are any non-negative real, not a fixed grid.
const MEASUREMENT_STEP: &str = "any";

fn choice(
    name: &'static str,
    label: &'static str,
    encoder: &impl CategoricalEncoder,
    submitted: Option<&str>,
) -> ChoiceField {
    let options = encoder.vocabulary().to_vec();
    // the first class is preselected, as a select box does
    let selected = submitted
        .map(str::to_string)
        .or_else(|| options.first().cloned())
        .unwrap_or_default();
    ChoiceField {
        name,
        label,
        options,
        selected,
    }
}

impl FormView {
    /// Form with every control at its default.
    pub fn new(context: &PredictionContext) -> Self {
        Self::with_values(context, &FormSubmission::default())
    }

    /// Form reflecting `submitted`, for the re-render after a submission.
    pub fn with_values(context: &PredictionContext, submitted: &FormSubmission) -> Self {
        let measurement_values = [
            &submitted.culmen_length_mm,
            &submitted.culmen_depth_mm,
            &submitted.flipper_length_mm,
            &submitted.body_mass_g,
        ];
        let measurements = MEASUREMENTS
            .into_iter()
            .zip(measurement_values)
            .map(|((name, label), value)| NumberField {
                name,
                label,
                min: MEASUREMENT_MIN,
                step: MEASUREMENT_STEP,
                value: value
                    .clone()
                    .unwrap_or_else(|| format!("{MEASUREMENT_MIN:.1}")),
            })
            .collect();

        FormView {
            island: choice(
                "island",
                "Island",
                context.island(),
                submitted.island.as_deref(),
            ),
            measurements,
            sex: choice("sex", "Sex", context.sex(), submitted.sex.as_deref()),
        }
    }
}
