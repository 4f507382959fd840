//! Configuration and error types for the spectral analysis stage.
//!
//! The spectrogram builder and peak extractor are pure functions of
//! `(samples, sample_rate, config)`; every knob that can change their output
//! lives here so ingest and query runs can be held bit-identical.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for spectrogram construction.
///
/// The defaults describe the canonical analysis chain: decimate to a working
/// rate of 11 025 Hz behind a 5 kHz low-pass, then transform non-overlapping
/// Hamming-windowed frames of 1024 samples. Ingest and query must run with
/// the same values or their fingerprints will not line up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralConfig {
    /// Configuration schema version. Bump on any change that can affect the
    /// produced spectrogram.
    #[serde(default = "default_version")]
    pub version: u32,
    /// Working sample rate the input is decimated towards, in Hz.
    #[serde(default = "default_target_rate")]
    pub target_rate: u32,
    /// Low-pass cutoff applied before decimation, in Hz.
    #[serde(default = "default_cutoff_hz")]
    pub cutoff_hz: f64,
    /// Samples per analysis window. Must be a power of two.
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Samples between successive window starts. Defaults to `window_size`
    /// (non-overlapping frames).
    #[serde(default = "default_hop_size")]
    pub hop_size: usize,
}

fn default_version() -> u32 {
    1
}
fn default_target_rate() -> u32 {
    11_025
}
fn default_cutoff_hz() -> f64 {
    5_000.0
}
fn default_window_size() -> usize {
    1024
}
fn default_hop_size() -> usize {
    1024
}

impl SpectralConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the decimation target rate in Hz.
    pub fn with_target_rate(mut self, target_rate: u32) -> Self {
        self.target_rate = target_rate;
        self
    }

    /// Set the analysis window size. Must be a power of two.
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Set the hop between window starts.
    pub fn with_hop_size(mut self, hop_size: usize) -> Self {
        self.hop_size = hop_size;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), SpectralError> {
        if self.version == 0 {
            return Err(SpectralError::InvalidConfigVersion {
                version: self.version,
            });
        }
        if self.window_size == 0 || !self.window_size.is_power_of_two() {
            return Err(SpectralError::InvalidWindowSize {
                window_size: self.window_size,
            });
        }
        if self.hop_size == 0 || self.hop_size > self.window_size {
            return Err(SpectralError::InvalidHopSize {
                hop_size: self.hop_size,
            });
        }
        if self.target_rate == 0 {
            return Err(SpectralError::InvalidTargetRate {
                target_rate: self.target_rate,
            });
        }
        if !(self.cutoff_hz > 0.0) || self.cutoff_hz > self.target_rate as f64 / 2.0 {
            return Err(SpectralError::InvalidCutoff {
                cutoff_hz: self.cutoff_hz,
            });
        }
        Ok(())
    }
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            version: 1,
            target_rate: 11_025,
            cutoff_hz: 5_000.0,
            window_size: 1024,
            hop_size: 1024,
        }
    }
}

/// Errors returned by the spectral analysis stage.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpectralError {
    #[error("empty sample stream")]
    EmptyInput,

    #[error("invalid config: window_size must be a power of two (got {window_size})")]
    InvalidWindowSize { window_size: usize },

    #[error("invalid config: hop_size must be in 1..=window_size (got {hop_size})")]
    InvalidHopSize { hop_size: usize },

    #[error("invalid config: target_rate must be >= 1 (got {target_rate})")]
    InvalidTargetRate { target_rate: u32 },

    #[error("invalid config: cutoff_hz must be in (0, target_rate/2] (got {cutoff_hz})")]
    InvalidCutoff { cutoff_hz: f64 },

    #[error("invalid config version {version}; expected >= 1")]
    InvalidConfigVersion { version: u32 },
}
