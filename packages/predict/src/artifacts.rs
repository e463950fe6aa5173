//! Artifact loading
//!
//! Deserializes the classifier and the three label encoders produced by the
//! export step. Two layouts are supported:
//!
//! * a directory holding one JSON file per artifact ([`MODEL_FILE`],
//!   [`ISLAND_ENCODER_FILE`], [`SEX_ENCODER_FILE`], [`SPECIES_ENCODER_FILE`])
//! * a single bundle file (JSON, or MessagePack for `.msgpack` / `.mpk`)
//!   holding all four objects under the keys of [`ArtifactBundle`].
//!
//! Loading never falls back to another artifact: the first missing or broken
//! file aborts with an [`ArtifactLoadError`].

use crate::classifier::ClassifierArtifact;
use crate::encoder::{EncoderArtifact, LabelEncoder};
use crate::error::ArtifactLoadError;
use crate::flow::PredictionContext;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const MODEL_FILE: &str = "knn_penguin_model.json";
pub const ISLAND_ENCODER_FILE: &str = "island_encoder.json";
pub const SEX_ENCODER_FILE: &str = "sex_encoder.json";
pub const SPECIES_ENCODER_FILE: &str = "species_encoder.json";

/// Where the artifacts live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactLocation {
    Directory(PathBuf),
    Bundle(PathBuf),
}

impl ArtifactLocation {
    /// Every file the location resolves to, with the artifact it holds.
    pub fn paths(&self) -> Vec<(&'static str, PathBuf)> {
        match self {
            ArtifactLocation::Directory(dir) => vec![
                ("model", dir.join(MODEL_FILE)),
                ("island_encoder", dir.join(ISLAND_ENCODER_FILE)),
                ("sex_encoder", dir.join(SEX_ENCODER_FILE)),
                ("species_encoder", dir.join(SPECIES_ENCODER_FILE)),
            ],
            ArtifactLocation::Bundle(path) => vec![("bundle", path.clone())],
        }
    }
}

impl std::fmt::Display for ArtifactLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactLocation::Directory(dir) => write!(f, "directory {}", dir.display()),
            ArtifactLocation::Bundle(path) => write!(f, "bundle {}", path.display()),
        }
    }
}

/// All four artifacts in one serialized object.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ArtifactBundle {
    pub model: ClassifierArtifact,
    pub island_encoder: EncoderArtifact,
    pub sex_encoder: EncoderArtifact,
    pub species_encoder: EncoderArtifact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    MessagePack,
}

impl Format {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("msgpack") | Some("mpk") => Format::MessagePack,
            _ => Format::Json,
        }
    }
}

fn read_artifact<T: DeserializeOwned>(
    artifact: &'static str,
    path: &Path,
) -> Result<T, ArtifactLoadError> {
    if !path.is_file() {
        return Err(ArtifactLoadError::Missing {
            artifact,
            path: path.to_path_buf(),
        });
    }
    let bytes = std::fs::read(path).map_err(|source| ArtifactLoadError::Io {
        artifact,
        path: path.to_path_buf(),
        source,
    })?;
    let corrupt = |reason: String| ArtifactLoadError::Corrupt {
        artifact,
        path: path.to_path_buf(),
        reason,
    };
    match Format::of(path) {
        Format::Json => serde_json::from_slice(&bytes).map_err(|e| corrupt(e.to_string())),
        Format::MessagePack => rmp_serde::from_slice(&bytes).map_err(|e| corrupt(e.to_string())),
    }
}

impl ArtifactBundle {
    #[tracing::instrument(name = "load_artifacts", skip_all, fields(location = %location))]
    pub fn load(location: &ArtifactLocation) -> Result<Self, ArtifactLoadError> {
        let bundle = match location {
            ArtifactLocation::Directory(dir) => ArtifactBundle {
                model: read_artifact("model", &dir.join(MODEL_FILE))?,
                island_encoder: read_artifact("island_encoder", &dir.join(ISLAND_ENCODER_FILE))?,
                sex_encoder: read_artifact("sex_encoder", &dir.join(SEX_ENCODER_FILE))?,
                species_encoder: read_artifact(
                    "species_encoder",
                    &dir.join(SPECIES_ENCODER_FILE),
                )?,
            },
            ArtifactLocation::Bundle(path) => read_artifact("bundle", path)?,
        };
        tracing::debug!("Loaded classifier artifact: {}", bundle.model);
        Ok(bundle)
    }

    /// Serializes the bundle in the format implied by `path`'s extension.
    pub fn save(&self, path: &Path) -> Result<(), ArtifactLoadError> {
        let bytes = match Format::of(path) {
            Format::Json => serde_json::to_vec_pretty(self).map_err(|e| e.to_string()),
            Format::MessagePack => rmp_serde::to_vec_named(self).map_err(|e| e.to_string()),
        }
        .map_err(|reason| ArtifactLoadError::Invalid {
            artifact: "bundle",
            reason,
        })?;
        std::fs::write(path, bytes).map_err(|source| ArtifactLoadError::Io {
            artifact: "bundle",
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validates the artifacts and checks that they agree with each other.
    pub fn into_context(self) -> Result<PredictionContext, ArtifactLoadError> {
        let island = LabelEncoder::from_artifact("island", self.island_encoder)?;
        let sex = LabelEncoder::from_artifact("sex", self.sex_encoder)?;
        let species = LabelEncoder::from_artifact("species", self.species_encoder)?;
        let classifier = self.model.into_classifier()?;
        PredictionContext::new(classifier, island, sex, species)
    }
}

/// JSON schema of the bundle layout, for the export step to validate against.
pub fn artifact_schema() -> schemars::Schema {
    schemars::schema_for!(ArtifactBundle)
}

/// Loads and validates every artifact at `location`.
pub fn load_context(location: &ArtifactLocation) -> Result<PredictionContext, ArtifactLoadError> {
    let context = ArtifactBundle::load(location)?.into_context()?;
    tracing::info!(
        "Artifacts loaded from {}: {} islands, {} sexes, {} species",
        location,
        context.island().len(),
        context.sex().len(),
        context.species().len()
    );
    Ok(context)
}
