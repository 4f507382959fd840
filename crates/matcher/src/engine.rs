//! Relative-timing match engine.

use std::collections::HashMap;
use std::sync::Arc;

use catalog::FingerprintStore;
use fingerprint::Address;
use tracing::warn;

use crate::types::{CandidateMatch, MatchConfig, MatchError};

/// Scores catalog songs against a query fingerprint map.
///
/// The engine holds a shared store handle and per-run configuration; all
/// aggregation state lives on the stack of a single [`Matcher::match_query`]
/// call, so one matcher can serve concurrent queries.
pub struct Matcher {
    store: Arc<dyn FingerprintStore>,
    cfg: MatchConfig,
}

impl Matcher {
    /// Construct a matcher over a shared store handle.
    pub fn new(store: Arc<dyn FingerprintStore>, cfg: MatchConfig) -> Self {
        Self { store, cfg }
    }

    /// Rank catalog songs by timing consistency with the query.
    ///
    /// `query` maps each address generated from the recording to the
    /// recording's own anchor time in milliseconds. Returns candidates in
    /// descending score order. Songs whose metadata is missing from the
    /// registry are logged and skipped; store failures surface as errors.
    pub fn match_query(
        &self,
        query: &HashMap<Address, u32>,
    ) -> Result<Vec<CandidateMatch>, MatchError> {
        self.cfg.validate()?;

        let addresses: Vec<Address> = query.keys().copied().collect();
        let stored = self.store.get_couples(&addresses)?;

        // Bucket (sample_time, db_time) pairs per song, and remember the
        // earliest db anchor each song was hit at.
        let mut buckets: HashMap<u32, Vec<(u32, u32)>> = HashMap::new();
        let mut first_anchor: HashMap<u32, u32> = HashMap::new();

        for (address, couples) in &stored {
            let sample_time = query[address];
            for couple in couples {
                buckets
                    .entry(couple.song_id)
                    .or_default()
                    .push((sample_time, couple.anchor_time_ms));
                first_anchor
                    .entry(couple.song_id)
                    .and_modify(|earliest| *earliest = (*earliest).min(couple.anchor_time_ms))
                    .or_insert(couple.anchor_time_ms);
            }
        }

        let mut candidates = Vec::with_capacity(buckets.len());
        for (song_id, pairs) in buckets {
            let score = relative_timing_score(&pairs, self.cfg.tolerance_ms as i32);

            let Some(song) = self.store.get_song_by_id(song_id)? else {
                warn!(song_id, "scored song missing from registry, skipping");
                continue;
            };

            candidates.push(CandidateMatch {
                song_id,
                title: song.title,
                artist: song.artist,
                external_id: song.external_id,
                anchor_time_ms: first_anchor[&song_id],
                score,
            });
        }

        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(candidates)
    }
}

/// Support of the dominant alignment offset between query and catalog.
///
/// A genuine match produces many `db_time − sample_time` offsets clustered
/// around the single true alignment; random collisions scatter. Sorting the
/// offsets and taking the longest run whose successive values stay within
/// the tolerance measures that cluster in O(n log n) without committing to
/// any particular offset up front.
fn relative_timing_score(pairs: &[(u32, u32)], tolerance: i32) -> f64 {
    match pairs.len() {
        0 => 0.0,
        1 => 1.0,
        n => {
            let mut deltas: Vec<i32> = pairs
                .iter()
                .map(|&(sample_time, db_time)| db_time as i32 - sample_time as i32)
                .collect();
            deltas.sort_unstable();

            let mut longest = 1usize;
            let mut run = 1usize;
            for i in 1..n {
                if deltas[i] - deltas[i - 1] <= tolerance {
                    run += 1;
                } else {
                    longest = longest.max(run);
                    run = 1;
                }
            }
            longest.max(run) as f64
        }
    }
}
