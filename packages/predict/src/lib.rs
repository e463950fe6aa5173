//! Penguin species prediction
//!
//! Loads a previously trained classifier and the label encoders it was fitted
//! with, validates a single form submission and predicts the species.
//!
//! The flow is strictly linear: render form → validate → encode → predict →
//! decode → display. Artifacts are read once into an immutable
//! [`PredictionContext`] that is shared by every request.

pub mod artifacts;
pub mod classifier;
pub mod encoder;
pub mod error;
pub mod flow;
pub mod form;
pub mod request;


pub use artifacts::{ArtifactBundle, ArtifactLocation, artifact_schema, load_context};
pub use classifier::{ClassVote, Classifier, ClassifierArtifact, KnnArtifact, KnnClassifier};
pub use encoder::{CategoricalDecoder, CategoricalEncoder, EncoderArtifact, LabelEncoder};
pub use error::{ArtifactLoadError, PredictionError};
pub use flow::{PredictionContext, PredictionResult, Submission};
pub use form::FormView;
pub use request::{EncodedRequest, FEATURE_COLUMNS, FormSubmission, PredictionRequest};
