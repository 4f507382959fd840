//! Spectral analysis front-end for acoustic fingerprinting.
//!
//! This crate turns a raw PCM stream into the sparse set of spectral peaks
//! that the fingerprinting layer pairs up. The chain is deterministic and
//! pure: no I/O, no randomness, no shared state, so identical samples and
//! configuration always produce identical peaks.
//!
//! ## The pipeline
//!
//! 1. **Low-pass + decimate**: drop the stream to a working rate of
//!    ~11 025 Hz behind a 5 kHz cutoff ([`low_pass`], [`decimate`]).
//! 2. **Short-time transform**: cut the stream into Hamming-windowed frames
//!    of 1024 samples and transform each with the radix-2 FFT, keeping the
//!    non-redundant magnitude half ([`build_spectrogram`]).
//! 3. **Band-wise peak picking**: one local maximum per logarithmic band
//!    per window, thresholded against the band's mean ([`extract_peaks`]).
//!
//! ## Quick example
//!
//! ```
//! use spectral::{build_spectrogram, extract_peaks, SpectralConfig};
//!
//! let rate = 44_100u32;
//! let samples: Vec<f64> = (0..rate as usize)
//!     .map(|i| (2.0 * std::f64::consts::PI * 440.0 * i as f64 / rate as f64).sin())
//!     .collect();
//! let duration = samples.len() as f64 / rate as f64;
//!
//! let cfg = SpectralConfig::default();
//! let spectrogram = build_spectrogram(&samples, rate, &cfg).unwrap();
//! let peaks = extract_peaks(&spectrogram, duration);
//! assert!(!peaks.is_empty());
//! ```

mod config;
pub mod fft;
mod filter;
mod peaks;
mod spectrogram;

pub use crate::config::{SpectralConfig, SpectralError};
pub use crate::fft::fft;
pub use crate::filter::{decimate, low_pass};
pub use crate::peaks::{extract_peaks, Peak};
pub use crate::spectrogram::{build_spectrogram, Spectrogram};
