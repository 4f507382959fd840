//! YAML configuration file support.
//!
//! Lets deployments define every stage of the engine in one YAML file and
//! load it at runtime. Missing sections and fields fall back to the same
//! defaults the stage configs ship with, so a minimal file is valid.
//!
//! ## Example
//!
//! ```yaml
//! version: "1.0"
//! name: "local catalog"
//!
//! spectral:
//!   target_rate: 11025
//!   cutoff_hz: 5000.0
//!   window_size: 1024
//!   hop_size: 1024
//!
//! fingerprint:
//!   target_zone_size: 5
//!
//! matcher:
//!   tolerance_ms: 3
//!
//! store:
//!   backend: "redb"
//!   path: "catalog.redb"
//!
//! ingest:
//!   workers: 4
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ingest::IngestConfig;
use crate::{FingerprintConfig, MatchConfig, SpectralConfig, StoreConfig};

/// Errors that can occur when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level configuration for the whole engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveprintConfig {
    /// Configuration format version.
    pub version: String,

    /// Optional configuration name/description.
    #[serde(default)]
    pub name: Option<String>,

    /// Spectral analysis configuration.
    #[serde(default)]
    pub spectral: SpectralConfig,

    /// Fingerprint generation configuration.
    #[serde(default)]
    pub fingerprint: FingerprintConfig,

    /// Matcher configuration.
    #[serde(default)]
    pub matcher: MatchConfig,

    /// Catalog store selection.
    #[serde(default)]
    pub store: StoreYamlConfig,

    /// Ingest facade configuration.
    #[serde(default)]
    pub ingest: IngestConfig,
}

impl WaveprintConfig {
    /// Load a YAML configuration file from the given path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: WaveprintConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration, delegating to every stage.
    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => {}
            v => return Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }

        self.spectral
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.fingerprint
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.matcher
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.store.validate()?;
        Ok(())
    }
}

impl Default for WaveprintConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            spectral: SpectralConfig::default(),
            fingerprint: FingerprintConfig::default(),
            matcher: MatchConfig::default(),
            store: StoreYamlConfig::default(),
            ingest: IngestConfig::default(),
        }
    }
}

/// Store selection as written in YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreYamlConfig {
    /// `"in_memory"` or `"redb"`.
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Database file path; required for the redb backend.
    #[serde(default)]
    pub path: Option<String>,
}

fn default_backend() -> String {
    "in_memory".to_string()
}

impl StoreYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.backend.as_str() {
            "in_memory" => Ok(()),
            "redb" => {
                if self.path.is_none() {
                    return Err(ConfigLoadError::Validation(
                        "store.path is required when backend is 'redb'".to_string(),
                    ));
                }
                Ok(())
            }
            other => Err(ConfigLoadError::Validation(format!(
                "store.backend must be 'in_memory' or 'redb' (got '{other}')"
            ))),
        }
    }

    /// Convert to the runtime [`StoreConfig`].
    pub fn to_store_config(&self) -> StoreConfig {
        match self.backend.as_str() {
            "redb" => StoreConfig::redb(self.path.clone().unwrap_or_default()),
            _ => StoreConfig::in_memory(),
        }
    }
}

impl Default for StoreYamlConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: None,
        }
    }
}
