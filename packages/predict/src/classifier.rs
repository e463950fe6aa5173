//! Pre-trained classifiers
//!
//! The classifier artifact is a tagged enum so further model families can be
//! added without changing the artifact loader. Today only k-nearest-neighbours
//! is supported; neighbour search is done with [`linfa_nn`].

use crate::error::{ArtifactLoadError, PredictionError, Result};
use linfa_nn::distance::{Distance, L2Dist};
use linfa_nn::{CommonNearestNeighbour, NearestNeighbour};
use ndarray::{Array1, Array2, ArrayView1};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Winning class of a single inference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClassVote {
    /// Predicted class code, decoded through the species encoder.
    pub code: usize,
    /// Share of the total vote held by the winning class (0.0 - 1.0).
    pub confidence: f64,
}

/// Inference seam of the prediction flow.
pub trait Classifier: Send + Sync {
    /// Number of input features the model was fitted on.
    fn n_features(&self) -> usize;

    /// Feature names in training order, if the artifact recorded them.
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    /// Distinct class codes the model can emit.
    fn classes(&self) -> Vec<usize>;

    fn predict(&self, features: ArrayView1<'_, f64>) -> Result<ClassVote>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Weights {
    /// Every neighbour votes 1.
    #[default]
    Uniform,
    /// Every neighbour votes `1 / distance`.
    Distance,
}

/// Standardization applied to the features before the distance computation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    fn transform(&self, x: ArrayView1<'_, f64>) -> Array1<f64> {
        let mean = ArrayView1::from(&self.mean[..]);
        let scale = ArrayView1::from(&self.scale[..]);
        (&x - &mean) / &scale
    }
}

/// Serialized k-nearest-neighbours classifier.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct KnnArtifact {
    pub k: usize,
    #[serde(default)]
    pub weights: Weights,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaler: Option<StandardScaler>,
    /// Training samples, one row per sample, unscaled.
    pub points: Vec<Vec<f64>>,
    /// Class code of every training sample.
    pub labels: Vec<usize>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
/// # Unified Type for serialized classifiers
pub enum ClassifierArtifact {
    KNearestNeighbors(KnnArtifact),
}

impl fmt::Display for ClassifierArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierArtifact::KNearestNeighbors(model) => write!(
                f,
                "K-Nearest-Neighbors Classification (k={}, {} samples)",
                model.k,
                model.points.len()
            ),
        }
    }
}

impl ClassifierArtifact {
    pub fn into_classifier(self) -> Result<Box<dyn Classifier>, ArtifactLoadError> {
        match self {
            ClassifierArtifact::KNearestNeighbors(model) => {
                Ok(Box::new(KnnClassifier::try_from(model)?))
            }
        }
    }
}

#[derive(Debug)]
pub struct KnnClassifier {
    k: usize,
    weights: Weights,
    feature_names: Option<Vec<String>>,
    scaler: Option<StandardScaler>,
    /// Samples already passed through the scaler.
    points: Array2<f64>,
    labels: Vec<usize>,
}

fn invalid(reason: impl Into<String>) -> ArtifactLoadError {
    ArtifactLoadError::Invalid {
        artifact: "model",
        reason: reason.into(),
    }
}

impl TryFrom<KnnArtifact> for KnnClassifier {
    type Error = ArtifactLoadError;

    fn try_from(artifact: KnnArtifact) -> Result<Self, Self::Error> {
        if artifact.k == 0 {
            return Err(invalid("k must be at least 1"));
        }
        let rows = artifact.points.len();
        if rows == 0 {
            return Err(invalid("model has no training samples"));
        }
        if artifact.labels.len() != rows {
            return Err(invalid(format!(
                "{} labels for {} samples",
                artifact.labels.len(),
                rows
            )));
        }

        let cols = artifact.points[0].len();
        if cols == 0 {
            return Err(invalid("samples have no features"));
        }
        let mut flat = Vec::with_capacity(rows * cols);
        for (r, row) in artifact.points.iter().enumerate() {
            if row.len() != cols {
                return Err(invalid(format!(
                    "Row {r}: inconsistent length (expected {cols}, got {})",
                    row.len()
                )));
            }
            if row.iter().any(|x| !x.is_finite()) {
                return Err(invalid(format!("Row {r}: non-finite feature value")));
            }
            flat.extend_from_slice(row);
        }
        let mut points = Array2::from_shape_vec((rows, cols), flat)
            .map_err(|e| invalid(e.to_string()))?;

        if let Some(names) = &artifact.feature_names {
            if names.len() != cols {
                return Err(invalid(format!(
                    "{} feature names for {cols} features",
                    names.len()
                )));
            }
        }

        if let Some(scaler) = &artifact.scaler {
            if scaler.mean.len() != cols || scaler.scale.len() != cols {
                return Err(invalid(format!(
                    "scaler expects {}/{} features, samples have {cols}",
                    scaler.mean.len(),
                    scaler.scale.len()
                )));
            }
            if scaler.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
                return Err(invalid("scaler contains a zero or non-finite scale"));
            }
            for mut row in points.rows_mut() {
                let scaled = scaler.transform(row.view());
                row.assign(&scaled);
            }
        }

        Ok(KnnClassifier {
            k: artifact.k,
            weights: artifact.weights,
            feature_names: artifact.feature_names,
            scaler: artifact.scaler,
            points,
            labels: artifact.labels,
        })
    }
}

impl KnnClassifier {
    fn tally(&self, neighbours: &[(usize, f64)]) -> ClassVote {
        // ordered by class code so ties resolve to the smallest one
        let mut votes: BTreeMap<usize, f64> = BTreeMap::new();

        let exact: Vec<&(usize, f64)> = neighbours.iter().filter(|(_, d)| *d == 0.0).collect();
        match self.weights {
            Weights::Distance if !exact.is_empty() => {
                for (idx, _) in exact {
                    *votes.entry(self.labels[*idx]).or_default() += 1.0;
                }
            }
            Weights::Distance => {
                for (idx, d) in neighbours {
                    *votes.entry(self.labels[*idx]).or_default() += 1.0 / d;
                }
            }
            Weights::Uniform => {
                for (idx, _) in neighbours {
                    *votes.entry(self.labels[*idx]).or_default() += 1.0;
                }
            }
        }

        let mut winner = (0, f64::NEG_INFINITY);
        for (class, vote) in &votes {
            if *vote > winner.1 {
                winner = (*class, *vote);
            }
        }
        let total: f64 = votes.values().sum();
        let confidence = if total > 0.0 { winner.1 / total } else { 0.0 };
        ClassVote {
            code: winner.0,
            confidence,
        }
    }
}

impl Classifier for KnnClassifier {
    fn n_features(&self) -> usize {
        self.points.ncols()
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn classes(&self) -> Vec<usize> {
        let mut classes = self.labels.clone();
        classes.sort_unstable();
        classes.dedup();
        classes
    }

    fn predict(&self, features: ArrayView1<'_, f64>) -> Result<ClassVote> {
        if features.len() != self.n_features() {
            return Err(PredictionError::Inference(format!(
                "expected {} features, got {}",
                self.n_features(),
                features.len()
            )));
        }
        if let Some(j) = features.iter().position(|x| !x.is_finite()) {
            return Err(PredictionError::Inference(format!(
                "feature {j} is not a finite number"
            )));
        }

        let query = match &self.scaler {
            Some(scaler) => scaler.transform(features),
            None => features.to_owned(),
        };

        let index = CommonNearestNeighbour::LinearSearch
            .from_batch(&self.points, L2Dist)
            .map_err(|e| PredictionError::Inference(e.to_string()))?;
        let k = self.k.min(self.points.nrows());
        let neighbours: Vec<(usize, f64)> = index
            .k_nearest(query.view(), k)
            .map_err(|e| PredictionError::Inference(e.to_string()))?
            .into_iter()
            .map(|(point, idx)| (idx, L2Dist.distance(point, query.view())))
            .collect();

        if neighbours.is_empty() {
            return Err(PredictionError::Inference("Got an empty prediction".into()));
        }

        Ok(self.tally(&neighbours))
    }
}
