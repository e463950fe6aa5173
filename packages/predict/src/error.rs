//! Error taxonomy for the prediction flow
//!
//! Every stage returns an explicit `Result` with one of these kinds so the
//! presenter can turn any failure into a user-visible message.

use std::path::PathBuf;

/// Failure to read or validate one of the artifact files.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactLoadError {
    #[error("Artifact `{artifact}` not found at {}", .path.display())]
    Missing {
        artifact: &'static str,
        path: PathBuf,
    },
    #[error("Failed to read artifact `{artifact}` from {}: {source}", .path.display())]
    Io {
        artifact: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse artifact `{artifact}` from {}: {reason}", .path.display())]
    Corrupt {
        artifact: &'static str,
        path: PathBuf,
        reason: String,
    },
    #[error("Artifact `{artifact}` is invalid: {reason}")]
    Invalid {
        artifact: &'static str,
        reason: String,
    },
    #[error("Artifacts are inconsistent: {0}")]
    Inconsistent(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("Unknown {field} `{value}`, expected one of: {}", .expected.join(", "))]
    Encoding {
        field: &'static str,
        value: String,
        expected: Vec<String>,
    },

    #[error("Please fill in: {}", .fields.join(", "))]
    MissingInput { fields: Vec<&'static str> },

    #[error("Invalid value for {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Prediction failed: {0}")]
    Inference(String),

    #[error("Couldn't map prediction {code} to any of these classes {classes:?}")]
    Decoding { code: usize, classes: Vec<String> },
}

impl PredictionError {
    /// Stable name of the error kind, used for logs, metrics and the page.
    pub fn kind(&self) -> &'static str {
        match self {
            PredictionError::Encoding { .. } => "EncodingError",
            PredictionError::MissingInput { .. } => "MissingInputError",
            PredictionError::InvalidInput { .. } => "InvalidInputError",
            PredictionError::Inference(_) => "InferenceError",
            PredictionError::Decoding { .. } => "DecodingError",
        }
    }

    /// Errors the user can fix by changing the submitted form.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PredictionError::Encoding { .. }
                | PredictionError::MissingInput { .. }
                | PredictionError::InvalidInput { .. }
        )
    }
}

pub type Result<T, E = PredictionError> = std::result::Result<T, E>;
