use penguin_predict::ArtifactLocation;
use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub artifacts: ArtifactLocation,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any variable source; `from_env` passes
    /// the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = lookup("PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?;

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        if host.trim().is_empty() {
            return Err(ConfigError::InvalidValue("HOST".to_string()));
        }

        let artifacts = match lookup("ARTIFACT_BUNDLE").filter(|v| !v.trim().is_empty()) {
            Some(bundle) => ArtifactLocation::Bundle(PathBuf::from(bundle)),
            None => {
                let dir = lookup("ARTIFACT_DIR").unwrap_or_else(|| "artifacts".to_string());
                if dir.trim().is_empty() {
                    return Err(ConfigError::InvalidValue("ARTIFACT_DIR".to_string()));
                }
                ArtifactLocation::Directory(PathBuf::from(dir))
            }
        };

        Ok(Config {
            host,
            port,
            artifacts,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for: {0}")]
    InvalidValue(String),
}
