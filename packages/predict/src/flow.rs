//! The prediction flow
//!
//! validate → encode → predict → decode, each stage returning an explicit
//! [`Result`] so the presenter can show the first failure.

use crate::classifier::Classifier;
use crate::encoder::{CategoricalDecoder, CategoricalEncoder, LabelEncoder};
use crate::error::{ArtifactLoadError, PredictionError, Result};
use crate::request::{FEATURE_COLUMNS, FormSubmission, PredictionRequest};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Read-only artifacts shared by every request.
pub struct PredictionContext {
    classifier: Box<dyn Classifier>,
    island: LabelEncoder,
    sex: LabelEncoder,
    species: LabelEncoder,
}

impl fmt::Debug for PredictionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredictionContext")
            .field("n_features", &self.classifier.n_features())
            .field("island", &self.island.vocabulary())
            .field("sex", &self.sex.vocabulary())
            .field("species", &self.species.vocabulary())
            .finish()
    }
}

impl PredictionContext {
    /// Assembles a context, rejecting artifacts whose code spaces disagree.
    pub fn new(
        classifier: Box<dyn Classifier>,
        island: LabelEncoder,
        sex: LabelEncoder,
        species: LabelEncoder,
    ) -> Result<Self, ArtifactLoadError> {
        if classifier.n_features() != FEATURE_COLUMNS.len() {
            return Err(ArtifactLoadError::Inconsistent(format!(
                "classifier expects {} features, the form provides {}",
                classifier.n_features(),
                FEATURE_COLUMNS.len()
            )));
        }
        if let Some(code) = classifier
            .classes()
            .into_iter()
            .find(|code| *code >= species.len())
        {
            return Err(ArtifactLoadError::Inconsistent(format!(
                "classifier class {code} has no species label ({} species known)",
                species.len()
            )));
        }

        Ok(Self {
            classifier,
            island,
            sex,
            species,
        })
    }

    pub fn island(&self) -> &LabelEncoder {
        &self.island
    }

    pub fn sex(&self) -> &LabelEncoder {
        &self.sex
    }

    pub fn species(&self) -> &LabelEncoder {
        &self.species
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    /// Runs the whole flow for one validated request.
    #[tracing::instrument(name = "predict", level = "debug", skip_all)]
    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult> {
        let encoded = request.encode(&self.island, &self.sex)?;
        tracing::debug!(?encoded, "Encoded request");

        if let Some(names) = self.classifier.feature_names() {
            if names.iter().map(String::as_str).ne(FEATURE_COLUMNS) {
                return Err(PredictionError::Inference(format!(
                    "feature names {names:?} do not match the form columns {FEATURE_COLUMNS:?}"
                )));
            }
        }

        let vote = self.classifier.predict(encoded.to_features().view())?;
        let species = self.species.decode(vote.code)?.to_string();
        tracing::debug!(code = vote.code, %species, "Decoded prediction");

        Ok(PredictionResult {
            species,
            code: vote.code,
            confidence: vote.confidence,
        })
    }

    /// Validates the raw form and runs the flow, keeping the assembled
    /// request for the diagnostic echo even when a later stage fails.
    pub fn submit(&self, form: &FormSubmission) -> Submission {
        let request = match PredictionRequest::try_from(form) {
            Ok(request) => request,
            Err(err) => {
                return Submission {
                    request: None,
                    outcome: Err(err),
                };
            }
        };
        let outcome = self.predict(&request);
        Submission {
            request: Some(request),
            outcome,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PredictionResult {
    /// Decoded species label.
    pub species: String,
    /// Raw class code emitted by the classifier.
    pub code: usize,
    /// Vote share of the winning class.
    pub confidence: f64,
}

/// Terminal state of one form submission.
#[derive(Debug)]
pub struct Submission {
    pub request: Option<PredictionRequest>,
    pub outcome: Result<PredictionResult>,
}

impl Submission {
    pub fn outcome_label(&self) -> &'static str {
        match &self.outcome {
            Ok(_) => "success",
            Err(err) => err.kind(),
        }
    }
}
