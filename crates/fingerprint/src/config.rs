//! Configuration and error types for fingerprint generation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for combinatorial fingerprint generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintConfig {
    /// Configuration schema version. Bump on any change that can affect the
    /// generated addresses.
    #[serde(default = "default_version")]
    pub version: u32,
    /// Number of successor peaks paired with each anchor.
    #[serde(default = "default_target_zone_size")]
    pub target_zone_size: usize,
}

fn default_version() -> u32 {
    1
}
fn default_target_zone_size() -> usize {
    5
}

impl FingerprintConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of successor peaks paired with each anchor.
    pub fn with_target_zone_size(mut self, target_zone_size: usize) -> Self {
        self.target_zone_size = target_zone_size;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), FingerprintError> {
        if self.version == 0 {
            return Err(FingerprintError::InvalidConfigVersion {
                version: self.version,
            });
        }
        if self.target_zone_size == 0 {
            return Err(FingerprintError::InvalidTargetZone {
                target_zone_size: self.target_zone_size,
            });
        }
        Ok(())
    }
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            version: 1,
            target_zone_size: 5,
        }
    }
}

/// Errors returned by fingerprint generation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FingerprintError {
    #[error("invalid config: target_zone_size must be >= 1 (got {target_zone_size})")]
    InvalidTargetZone { target_zone_size: usize },

    #[error("invalid config version {version}; expected >= 1")]
    InvalidConfigVersion { version: u32 },
}
