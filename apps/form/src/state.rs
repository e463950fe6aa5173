use crate::page::Pages;
use penguin_predict::{ArtifactLoadError, ArtifactLocation, PredictionContext, load_context};
use std::sync::Arc;

pub type AppState = Arc<State>;

/// Process-wide, read-only state. Artifacts are loaded once; a load failure
/// is kept so every render cycle can report it instead of offering the form.
pub struct State {
    pub location: ArtifactLocation,
    pub artifacts: Result<PredictionContext, ArtifactLoadError>,
    pub pages: Pages,
}

impl State {
    pub fn new(location: ArtifactLocation) -> Self {
        let artifacts = load_context(&location);
        if let Err(err) = &artifacts {
            tracing::error!("Failed to load artifacts: {}", err);
        }
        Self::with_artifacts(location, artifacts)
    }

    pub fn with_artifacts(
        location: ArtifactLocation,
        artifacts: Result<PredictionContext, ArtifactLoadError>,
    ) -> Self {
        State {
            location,
            artifacts,
            pages: Pages::new(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.artifacts.is_ok()
    }
}
