//! Workspace umbrella crate for the Waveprint song identification engine.
//!
//! `waveprint` re-exports the spectral, fingerprint, catalog, matcher, and
//! audio layers so applications can drive the whole pipeline through a
//! single dependency. The helpers in this crate wire the stages together:
//! [`fingerprint_samples`] and [`fingerprint_wav`] run the ingest-side chain
//! (spectrogram → peaks → fingerprints), [`query_fingerprints`] runs the
//! symmetric query-side chain, and [`identify_samples`] finishes a query
//! against a [`Matcher`]. The [`ingest`] module adds a parallel facade for
//! loading whole directories into a catalog.
//!
//! ## Quick start
//!
//! ```
//! use std::sync::Arc;
//!
//! use waveprint::{
//!     fingerprint_samples, identify_samples, FingerprintConfig, FingerprintStore,
//!     MatchConfig, Matcher, MemoryStore, SpectralConfig,
//! };
//!
//! # fn demo() -> Result<(), waveprint::PipelineError> {
//! let spectral_cfg = SpectralConfig::default();
//! let fingerprint_cfg = FingerprintConfig::default();
//!
//! // Ten seconds of 440 Hz at 44.1 kHz stands in for a real track.
//! let rate = 44_100u32;
//! let samples: Vec<f64> = (0..rate as usize * 10)
//!     .map(|i| (2.0 * std::f64::consts::PI * 440.0 * i as f64 / rate as f64).sin())
//!     .collect();
//!
//! let store = Arc::new(MemoryStore::new());
//! let song_id = store.register_song("Tone", "Oscillator", "")?;
//! let set = fingerprint_samples(&samples, rate, song_id, &spectral_cfg, &fingerprint_cfg)?;
//! store.store_fingerprints(&set)?;
//!
//! let matcher = Matcher::new(store, MatchConfig::default());
//! let ranked = identify_samples(&samples, rate, &spectral_cfg, &fingerprint_cfg, &matcher)?;
//! assert_eq!(ranked[0].song_id, song_id);
//! # Ok(())
//! # }
//! ```
//!
//! ## Determinism
//!
//! The fingerprint pipeline is pure: the same samples, rate, and configs
//! always produce the same set, which is what lets a catalog built on one
//! machine serve queries from another.
//!
//! ## Errors
//!
//! Failures from any layer converge on [`PipelineError`], which preserves
//! the failing stage so callers can report "which stage, and why" in a
//! single diagnostic line.

pub mod config;
pub mod ingest;

use std::collections::HashMap;

pub use audio::{
    convert_to_wav, pcm16_to_samples, probe_tags, read_wav, write_wav, AudioError, TrackTags,
    WavAudio,
};
pub use catalog::{
    song_key, FingerprintStore, MemoryStore, Song, StoreConfig, StoreError,
};
#[cfg(feature = "backend-redb")]
pub use catalog::RedbStore;
pub use fingerprint::{
    fingerprint_peaks, pack_address, query_fingerprints as fingerprint_query_peaks,
    unpack_address, Address, Couple, FingerprintConfig, FingerprintError, FingerprintSet,
};
pub use matcher::{CandidateMatch, MatchConfig, MatchError, Matcher};
pub use spectral::{
    build_spectrogram, extract_peaks, Peak, SpectralConfig, SpectralError, Spectrogram,
};

use thiserror::Error;

/// Errors that can occur while driving the pipeline end to end.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("spectral analysis failed: {0}")]
    Spectral(#[from] SpectralError),
    #[error("fingerprint generation failed: {0}")]
    Fingerprint(#[from] FingerprintError),
    #[error("catalog store failed: {0}")]
    Store(#[from] StoreError),
    #[error("matching failed: {0}")]
    Match(#[from] MatchError),
    #[error("audio boundary failed: {0}")]
    Audio(#[from] AudioError),
    #[error("ingest facade failed: {0}")]
    Ingest(String),
}

/// Fingerprint a mono sample stream for catalog ingestion.
///
/// Runs spectrogram construction and peak extraction, then pairs the peaks
/// into a [`FingerprintSet`] tagged with `song_id`.
pub fn fingerprint_samples(
    samples: &[f64],
    sample_rate: u32,
    song_id: u32,
    spectral_cfg: &SpectralConfig,
    fingerprint_cfg: &FingerprintConfig,
) -> Result<FingerprintSet, PipelineError> {
    let duration_s = samples.len() as f64 / sample_rate as f64;
    let spectrogram = build_spectrogram(samples, sample_rate, spectral_cfg)?;
    let peaks = extract_peaks(&spectrogram, duration_s);
    Ok(fingerprint_peaks(&peaks, song_id, fingerprint_cfg)?)
}

/// Fingerprint decoded WAV audio, unioning stereo channels into one set.
///
/// Left and right channels are processed as independent mono streams whose
/// fingerprints merge under the same `song_id`; collisions across channels
/// overwrite, which is intentional.
pub fn fingerprint_wav(
    wav: &WavAudio,
    song_id: u32,
    spectral_cfg: &SpectralConfig,
    fingerprint_cfg: &FingerprintConfig,
) -> Result<FingerprintSet, PipelineError> {
    let mut set = fingerprint_samples(
        &wav.left,
        wav.sample_rate,
        song_id,
        spectral_cfg,
        fingerprint_cfg,
    )?;
    if let Some(right) = &wav.right {
        let right_set =
            fingerprint_samples(right, wav.sample_rate, song_id, spectral_cfg, fingerprint_cfg)?;
        set.extend(right_set);
    }
    Ok(set)
}

/// Build the query-side map for a recorded sample stream.
pub fn query_fingerprints(
    samples: &[f64],
    sample_rate: u32,
    spectral_cfg: &SpectralConfig,
    fingerprint_cfg: &FingerprintConfig,
) -> Result<HashMap<Address, u32>, PipelineError> {
    let duration_s = samples.len() as f64 / sample_rate as f64;
    let spectrogram = build_spectrogram(samples, sample_rate, spectral_cfg)?;
    let peaks = extract_peaks(&spectrogram, duration_s);
    Ok(fingerprint_query_peaks(&peaks, fingerprint_cfg)?)
}

/// Identify a recording: fingerprint it and rank catalog candidates.
pub fn identify_samples(
    samples: &[f64],
    sample_rate: u32,
    spectral_cfg: &SpectralConfig,
    fingerprint_cfg: &FingerprintConfig,
    matcher: &Matcher,
) -> Result<Vec<CandidateMatch>, PipelineError> {
    let query = query_fingerprints(samples, sample_rate, spectral_cfg, fingerprint_cfg)?;
    Ok(matcher.match_query(&query)?)
}
