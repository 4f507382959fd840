//! # Catalog
//!
//! Backend-agnostic storage for song fingerprints and song metadata.
//!
//! The catalog answers two questions for the matching layer: "which couples
//! are stored at these addresses?" and "what song is this id?". Both are
//! exposed through the [`FingerprintStore`] trait so callers can swap the
//! storage mechanism without touching the pipeline. Out of the box:
//!
//! - [`MemoryStore`]: `RwLock`-guarded maps; ephemeral, ideal for tests.
//! - [`RedbStore`]: a redb-backed embedded database with bincode-encoded
//!   values, behind the on-by-default `backend-redb` feature.
//!
//! The backend is selected at runtime through [`StoreConfig`]:
//!
//! ```
//! use catalog::{FingerprintStore, StoreConfig};
//!
//! let store = StoreConfig::in_memory().build().unwrap();
//! let song_id = store.register_song("Title", "Artist", "yt-123").unwrap();
//! assert_eq!(store.total_songs().unwrap(), 1);
//! # let _ = song_id;
//! ```
//!
//! ## Semantics
//!
//! - `store_fingerprints` is idempotent on the `(address, anchor_time_ms,
//!   song_id)` triple; storing the same couple twice leaves one row.
//! - `get_couples` returns *every* stored couple per requested address, in a
//!   single pass over the batch.
//! - Song ids come from a store-owned counter, so they are unique for the
//!   lifetime of the catalog (and across restarts for persistent backends).
//! - Songs are also unique on the `title___artist` key; re-registering the
//!   same pair is rejected.

mod memory;
#[cfg(feature = "backend-redb")]
mod redb_store;

use std::collections::HashMap;
use std::sync::Arc;

use fingerprint::{Address, Couple, FingerprintSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::memory::MemoryStore;
#[cfg(feature = "backend-redb")]
pub use crate::redb_store::RedbStore;

/// Song metadata held by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub title: String,
    pub artist: String,
    /// Identifier in an external system (e.g. a video or streaming id).
    /// Empty when unknown.
    pub external_id: String,
}

/// Uniqueness key for a song within the catalog.
pub fn song_key(title: &str, artist: &str) -> String {
    format!("{title}___{artist}")
}

/// Errors produced by catalog backends.
#[derive(Debug, Error, Clone)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(String),
    #[error("encode error: {0}")]
    Encode(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("song already registered under key {key}")]
    DuplicateSong { key: String },
}

impl StoreError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Storage contract required by the matching layer.
///
/// Implementations provide their own concurrency safety; every method takes
/// `&self` and the trait is `Send + Sync` so one handle can be shared across
/// worker threads.
pub trait FingerprintStore: Send + Sync {
    /// Persist one song's fingerprint set. Idempotent on the
    /// `(address, anchor_time_ms, song_id)` triple.
    fn store_fingerprints(&self, fingerprints: &FingerprintSet) -> Result<(), StoreError>;

    /// Fetch every stored couple for each requested address. Addresses with
    /// no couples are absent from the result.
    fn get_couples(
        &self,
        addresses: &[Address],
    ) -> Result<HashMap<Address, Vec<Couple>>, StoreError>;

    /// Allocate a fresh song id and register the song under it.
    fn register_song(
        &self,
        title: &str,
        artist: &str,
        external_id: &str,
    ) -> Result<u32, StoreError>;

    /// Look a song up by id. `None` when the id is unknown.
    fn get_song_by_id(&self, song_id: u32) -> Result<Option<Song>, StoreError>;

    /// Remove a song from the registry. Removing an unknown id is a no-op.
    fn delete_song_by_id(&self, song_id: u32) -> Result<(), StoreError>;

    /// Number of registered songs.
    fn total_songs(&self) -> Result<usize, StoreError>;

    /// Drop all fingerprints and songs. The id counter is not rewound, so
    /// ids stay unique across a wipe.
    fn wipe(&self) -> Result<(), StoreError>;
}

/// Runtime backend selection.
#[derive(Debug, Clone, Default)]
pub enum StoreConfig {
    /// `RwLock`-guarded in-process maps; contents die with the process.
    #[default]
    InMemory,
    /// Embedded redb database at the given path. Requires the
    /// `backend-redb` feature (enabled by default).
    Redb { path: String },
}

impl StoreConfig {
    /// In-memory backend configuration.
    pub fn in_memory() -> Self {
        StoreConfig::InMemory
    }

    /// Redb backend configuration for a database file at `path`.
    pub fn redb<P: Into<String>>(path: P) -> Self {
        StoreConfig::Redb { path: path.into() }
    }

    /// Build the configured backend.
    pub fn build(&self) -> Result<Arc<dyn FingerprintStore>, StoreError> {
        match self {
            StoreConfig::InMemory => Ok(Arc::new(MemoryStore::new())),
            StoreConfig::Redb { path } => {
                #[cfg(feature = "backend-redb")]
                {
                    Ok(Arc::new(RedbStore::open(path)?))
                }
                #[cfg(not(feature = "backend-redb"))]
                {
                    let _ = path;
                    Err(StoreError::backend("redb backend disabled at compile time"))
                }
            }
        }
    }
}
