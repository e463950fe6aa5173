//! Prediction requests
//!
//! A [`FormSubmission`] is the raw, untrusted state of the form controls. It is
//! validated into a [`PredictionRequest`] and then encoded into an
//! [`EncodedRequest`] whose feature vector matches the training column order.

use crate::encoder::CategoricalEncoder;
use crate::error::{PredictionError, Result};
use ndarray::Array1;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Column order the classifier was trained on.
pub const FEATURE_COLUMNS: [&str; 6] = [
    "island",
    "culmen_length_mm",
    "culmen_depth_mm",
    "flipper_length_mm",
    "body_mass_g",
    "sex",
];

/// Lower bound (and default) for every numeric measurement.
pub const MEASUREMENT_MIN: f64 = 0.0;

/// Raw form state as submitted by the page. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormSubmission {
    #[serde(default)]
    pub island: Option<String>,
    #[serde(default)]
    pub culmen_length_mm: Option<String>,
    #[serde(default)]
    pub culmen_depth_mm: Option<String>,
    #[serde(default)]
    pub flipper_length_mm: Option<String>,
    #[serde(default)]
    pub body_mass_g: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PredictionRequest {
    pub island: String,
    pub culmen_length_mm: f64,
    pub culmen_depth_mm: f64,
    pub flipper_length_mm: f64,
    pub body_mass_g: f64,
    pub sex: String,
}

/// [`PredictionRequest`] with the categorical fields replaced by their codes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EncodedRequest {
    pub island: usize,
    pub culmen_length_mm: f64,
    pub culmen_depth_mm: f64,
    pub flipper_length_mm: f64,
    pub body_mass_g: f64,
    pub sex: usize,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_measurement(field: &'static str, raw: &str) -> Result<f64> {
    let value: f64 = raw.parse().map_err(|_| PredictionError::InvalidInput {
        field,
        reason: format!("`{raw}` is not a number"),
    })?;
    if !value.is_finite() {
        return Err(PredictionError::InvalidInput {
            field,
            reason: format!("`{raw}` is not a finite number"),
        });
    }
    if value < MEASUREMENT_MIN {
        return Err(PredictionError::InvalidInput {
            field,
            reason: format!("must be at least {MEASUREMENT_MIN}, got {value}"),
        });
    }
    Ok(value)
}

impl TryFrom<&FormSubmission> for PredictionRequest {
    type Error = PredictionError;

    /// Rejects blank fields first (naming all of them), then validates the
    /// numeric ones. Category membership is left to the encoder stage.
    fn try_from(form: &FormSubmission) -> Result<Self> {
        let fields = [
            ("island", &form.island),
            ("culmen_length_mm", &form.culmen_length_mm),
            ("culmen_depth_mm", &form.culmen_depth_mm),
            ("flipper_length_mm", &form.flipper_length_mm),
            ("body_mass_g", &form.body_mass_g),
            ("sex", &form.sex),
        ];
        let missing: Vec<&'static str> = fields
            .iter()
            .filter(|(_, value)| present(value).is_none())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(PredictionError::MissingInput { fields: missing });
        }

        let measurement = |field: &'static str, value: &Option<String>| {
            parse_measurement(field, present(value).unwrap_or_default())
        };

        Ok(PredictionRequest {
            island: present(&form.island).unwrap_or_default().to_string(),
            culmen_length_mm: measurement("culmen_length_mm", &form.culmen_length_mm)?,
            culmen_depth_mm: measurement("culmen_depth_mm", &form.culmen_depth_mm)?,
            flipper_length_mm: measurement("flipper_length_mm", &form.flipper_length_mm)?,
            body_mass_g: measurement("body_mass_g", &form.body_mass_g)?,
            sex: present(&form.sex).unwrap_or_default().to_string(),
        })
    }
}

impl PredictionRequest {
    #[tracing::instrument(name = "encode", level = "debug", skip_all)]
    pub fn encode(
        &self,
        island: &impl CategoricalEncoder,
        sex: &impl CategoricalEncoder,
    ) -> Result<EncodedRequest> {
        Ok(EncodedRequest {
            island: island.encode(&self.island)?,
            culmen_length_mm: self.culmen_length_mm,
            culmen_depth_mm: self.culmen_depth_mm,
            flipper_length_mm: self.flipper_length_mm,
            body_mass_g: self.body_mass_g,
            sex: sex.encode(&self.sex)?,
        })
    }

    /// `(column, display value)` pairs in training order for the diagnostic echo.
    pub fn columns(&self) -> Vec<(&'static str, String)> {
        vec![
            (FEATURE_COLUMNS[0], self.island.clone()),
            (FEATURE_COLUMNS[1], self.culmen_length_mm.to_string()),
            (FEATURE_COLUMNS[2], self.culmen_depth_mm.to_string()),
            (FEATURE_COLUMNS[3], self.flipper_length_mm.to_string()),
            (FEATURE_COLUMNS[4], self.body_mass_g.to_string()),
            (FEATURE_COLUMNS[5], self.sex.clone()),
        ]
    }
}

impl EncodedRequest {
    /// Single-row feature vector in [`FEATURE_COLUMNS`] order.
    pub fn to_features(&self) -> Array1<f64> {
        Array1::from(vec![
            self.island as f64,
            self.culmen_length_mm,
            self.culmen_depth_mm,
            self.flipper_length_mm,
            self.body_mass_g,
            self.sex as f64,
        ])
    }
}
