//! Configuration, result, and error types for the matching layer.

use catalog::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for a match run.
///
/// `MatchConfig` is cheap to clone and serde-friendly so it can be embedded
/// in higher-level configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Configuration schema version.
    #[serde(default = "default_version")]
    pub version: u32,
    /// Maximum spread, in milliseconds, between successive sorted
    /// `db_time − sample_time` offsets that still counts as one aligned run.
    #[serde(default = "default_tolerance_ms")]
    pub tolerance_ms: u32,
}

fn default_version() -> u32 {
    1
}
fn default_tolerance_ms() -> u32 {
    3
}

impl MatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-step offset tolerance in milliseconds.
    pub fn with_tolerance_ms(mut self, tolerance_ms: u32) -> Self {
        self.tolerance_ms = tolerance_ms;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), MatchError> {
        if self.version == 0 {
            return Err(MatchError::InvalidConfig(
                "version must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            version: 1,
            tolerance_ms: 3,
        }
    }
}

/// One scored catalog song, ready for ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMatch {
    pub song_id: u32,
    pub title: String,
    pub artist: String,
    pub external_id: String,
    /// Earliest catalog anchor time that the query hit, in milliseconds;
    /// a rough position of the query within the song.
    pub anchor_time_ms: u32,
    /// Support of the dominant query/catalog alignment offset.
    pub score: f64,
}

/// Errors produced by the matching layer.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Invalid per-run configuration.
    #[error("invalid match config: {0}")]
    InvalidConfig(String),
    /// Catalog read failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
