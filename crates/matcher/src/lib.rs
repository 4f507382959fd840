//! Relative-timing matcher for acoustic fingerprints.
//!
//! Given a query map of `address → query_anchor_time_ms`, the matcher looks
//! the addresses up in a [`catalog::FingerprintStore`], buckets the returned
//! couples per song, and scores every candidate by the support of its
//! dominant alignment offset: the longest tolerance-bounded run in the
//! sorted list of `db_time − sample_time` deltas. Songs come back ranked
//! best first, decorated with registry metadata.
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! use catalog::{FingerprintStore, MemoryStore};
//! use fingerprint::{Couple, FingerprintSet};
//! use matcher::{MatchConfig, Matcher};
//!
//! let store = Arc::new(MemoryStore::new());
//! let song_id = store.register_song("Title", "Artist", "").unwrap();
//! let mut set = FingerprintSet::new();
//! set.insert(1, Couple { anchor_time_ms: 900, song_id });
//! store.store_fingerprints(&set).unwrap();
//!
//! let matcher = Matcher::new(store, MatchConfig::default());
//! let query: HashMap<i64, u32> = [(1i64, 400u32)].into_iter().collect();
//! let ranked = matcher.match_query(&query).unwrap();
//! assert_eq!(ranked[0].song_id, song_id);
//! ```

mod engine;
mod types;

pub use crate::engine::Matcher;
pub use crate::types::{CandidateMatch, MatchConfig, MatchError};
