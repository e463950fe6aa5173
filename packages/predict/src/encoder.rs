//! Fitted categorical encoders
//!
//! A [`LabelEncoder`] maps each class of its fitted vocabulary to the dense
//! integer code it had during training (its position in `classes`) and back.

use crate::error::{ArtifactLoadError, PredictionError, Result};
use ahash::AHashMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Forward mapping from category to code.
pub trait CategoricalEncoder {
    /// Fitted vocabulary in code order.
    fn vocabulary(&self) -> &[String];
    fn encode(&self, value: &str) -> Result<usize>;
}

/// Reverse mapping from code to category.
pub trait CategoricalDecoder {
    fn decode(&self, code: usize) -> Result<&str>;
}

/// Serialized form of a fitted label encoder.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EncoderArtifact {
    /// Classes in code order: `classes[i]` is encoded as `i`.
    pub classes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(into = "EncoderArtifact")]
pub struct LabelEncoder {
    field: &'static str,
    classes: Vec<String>,
    index: AHashMap<String, usize>,
}

impl LabelEncoder {
    /// Builds an encoder for the form field `field`, rejecting empty or
    /// duplicated vocabularies.
    pub fn new(
        field: &'static str,
        classes: Vec<String>,
    ) -> Result<Self, ArtifactLoadError> {
        if classes.is_empty() {
            return Err(ArtifactLoadError::Invalid {
                artifact: field,
                reason: "encoder has no classes".to_string(),
            });
        }

        let mut index = AHashMap::with_capacity(classes.len());
        for (code, class) in classes.iter().enumerate() {
            if index.insert(class.clone(), code).is_some() {
                return Err(ArtifactLoadError::Invalid {
                    artifact: field,
                    reason: format!("duplicate class `{class}`"),
                });
            }
        }

        Ok(Self {
            field,
            classes,
            index,
        })
    }

    pub fn from_artifact(
        field: &'static str,
        artifact: EncoderArtifact,
    ) -> Result<Self, ArtifactLoadError> {
        Self::new(field, artifact.classes)
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl CategoricalEncoder for LabelEncoder {
    fn vocabulary(&self) -> &[String] {
        &self.classes
    }

    fn encode(&self, value: &str) -> Result<usize> {
        self.index
            .get(value)
            .copied()
            .ok_or_else(|| PredictionError::Encoding {
                field: self.field,
                value: value.to_string(),
                expected: self.classes.clone(),
            })
    }
}

impl CategoricalDecoder for LabelEncoder {
    fn decode(&self, code: usize) -> Result<&str> {
        self.classes
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| PredictionError::Decoding {
                code,
                classes: self.classes.clone(),
            })
    }
}

impl From<LabelEncoder> for EncoderArtifact {
    fn from(encoder: LabelEncoder) -> Self {
        EncoderArtifact {
            classes: encoder.classes,
        }
    }
}
