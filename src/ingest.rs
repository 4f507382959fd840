//! Catalog ingestion facade.
//!
//! Takes media files from disk to stored fingerprints: transcode to
//! canonical WAV when needed, decode, fingerprint both channels, register
//! the song, and persist the set. Directories are ingested on a bounded
//! worker pool sized to half the logical CPUs, leaving headroom for the
//! transcoder subprocesses; each job captures its own failure so one bad
//! file never sinks a batch.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use catalog::FingerprintStore;
use fingerprint::FingerprintConfig;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use spectral::SpectralConfig;
use tracing::{info, warn};

use crate::{convert_to_wav, fingerprint_wav, probe_tags, read_wav, PipelineError};

/// Ingest facade configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Worker pool width for directory ingestion. `None` selects
    /// `max(1, logical_cpus / 2)`.
    #[serde(default)]
    pub workers: Option<usize>,
}

impl IngestConfig {
    /// Effective pool width.
    pub fn worker_count(&self) -> usize {
        self.workers
            .unwrap_or_else(|| num_cpus::get() / 2)
            .max(1)
    }
}

/// One successfully ingested file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestedSong {
    pub song_id: u32,
    pub path: PathBuf,
}

/// One failed file with its diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Per-job outcomes of a batch ingest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub ingested: Vec<IngestedSong>,
    pub failures: Vec<IngestFailure>,
}

/// Drives files and directories into a catalog.
pub struct Ingestor {
    store: Arc<dyn FingerprintStore>,
    spectral_cfg: SpectralConfig,
    fingerprint_cfg: FingerprintConfig,
    workers: usize,
}

impl Ingestor {
    /// Construct an ingestor over a shared store handle.
    pub fn new(
        store: Arc<dyn FingerprintStore>,
        spectral_cfg: SpectralConfig,
        fingerprint_cfg: FingerprintConfig,
        ingest_cfg: &IngestConfig,
    ) -> Self {
        Self {
            store,
            spectral_cfg,
            fingerprint_cfg,
            workers: ingest_cfg.worker_count(),
        }
    }

    /// Ingest a single media file; returns the allocated song id.
    ///
    /// WAV input is read directly; anything else goes through the external
    /// transcoder first. Song title and artist come from the file's tags
    /// when the prober can read them, falling back to the file stem.
    pub fn ingest_file(&self, path: &Path) -> Result<u32, PipelineError> {
        let start = Instant::now();
        let span = tracing::info_span!("ingest.file", path = %path.display());
        let _guard = span.enter();

        let (wav_path, transcoded) = if path.extension().is_some_and(|ext| ext == "wav") {
            (path.to_path_buf(), false)
        } else {
            (convert_to_wav(path, 2)?, true)
        };

        let result = self.ingest_wav_file(path, &wav_path);
        if transcoded {
            // The canonical copy is only needed for fingerprinting.
            let _ = std::fs::remove_file(&wav_path);
        }

        let elapsed_micros = start.elapsed().as_micros();
        match &result {
            Ok(song_id) => info!(song_id, elapsed_micros, "ingest_success"),
            Err(err) => warn!(error = %err, elapsed_micros, "ingest_failure"),
        }
        result
    }

    fn ingest_wav_file(&self, original: &Path, wav_path: &Path) -> Result<u32, PipelineError> {
        let wav = read_wav(wav_path)?;

        // Tag probing is best-effort; a missing prober must not fail the job.
        let tags = probe_tags(original).unwrap_or_default();
        let title = tags.title.unwrap_or_else(|| {
            original
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Unknown Title".to_string())
        });
        let artist = tags.artist.unwrap_or_else(|| "Unknown Artist".to_string());

        let song_id = self.store.register_song(&title, &artist, "")?;
        let set = fingerprint_wav(&wav, song_id, &self.spectral_cfg, &self.fingerprint_cfg)?;
        info!(song_id, fingerprints = set.len(), "fingerprinted");
        self.store.store_fingerprints(&set)?;
        Ok(song_id)
    }

    /// Ingest every regular file in a directory on the worker pool.
    pub fn ingest_dir(&self, dir: &Path) -> Result<IngestReport, PipelineError> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(|e| PipelineError::Ingest(format!("cannot read {}: {e}", dir.display())))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .map_err(|e| PipelineError::Ingest(e.to_string()))?;

        let outcomes: Vec<(PathBuf, Result<u32, String>)> = pool.install(|| {
            files
                .par_iter()
                .map(|path| {
                    let job = AssertUnwindSafe(|| self.ingest_file(path));
                    let outcome = match catch_unwind(job) {
                        Ok(Ok(song_id)) => Ok(song_id),
                        Ok(Err(err)) => Err(err.to_string()),
                        Err(_) => Err("ingest worker panicked".to_string()),
                    };
                    (path.clone(), outcome)
                })
                .collect()
        });

        let mut report = IngestReport::default();
        for (path, outcome) in outcomes {
            match outcome {
                Ok(song_id) => report.ingested.push(IngestedSong { song_id, path }),
                Err(reason) => report.failures.push(IngestFailure { path, reason }),
            }
        }
        Ok(report)
    }

    /// Ingest a file or every file in a directory.
    pub fn ingest_path(&self, path: &Path) -> Result<IngestReport, PipelineError> {
        if path.is_dir() {
            return self.ingest_dir(path);
        }
        let mut report = IngestReport::default();
        match self.ingest_file(path) {
            Ok(song_id) => report.ingested.push(IngestedSong {
                song_id,
                path: path.to_path_buf(),
            }),
            Err(err) => report.failures.push(IngestFailure {
                path: path.to_path_buf(),
                reason: err.to_string(),
            }),
        }
        Ok(report)
    }
}
