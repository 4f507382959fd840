//! Combinatorial fingerprint generation over spectral peaks.
//!
//! Every peak acts as an *anchor* and is paired with a small window of
//! successor peaks (its *target zone*). Each pair is packed into a 32-bit
//! [`Address`] keyed to a [`Couple`] carrying the anchor's absolute time and
//! the song it came from. The catalog stores every couple per address across
//! songs; a query later looks its own addresses up and checks whether the
//! time offsets agree.
//!
//! Generation is pure and deterministic: the same peaks and configuration
//! always produce the same map.
//!
//! ```
//! use fingerprint::{fingerprint_peaks, FingerprintConfig};
//! use spectral::Peak;
//!
//! let peaks: Vec<Peak> = (0..10)
//!     .map(|i| Peak { time_s: i as f64 * 0.1, freq_hz: 100.0 * (i + 1) as f64 })
//!     .collect();
//!
//! let set = fingerprint_peaks(&peaks, 7, &FingerprintConfig::default()).unwrap();
//! assert_eq!(set.len(), 35);
//! ```

mod address;
mod config;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use spectral::Peak;

pub use crate::address::{pack_address, unpack_address, Address};
pub use crate::config::{FingerprintConfig, FingerprintError};

/// Value stored against an address: the anchor's absolute position in its
/// song, and the song itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Couple {
    pub anchor_time_ms: u32,
    pub song_id: u32,
}

/// One song's fingerprints: address → couple.
///
/// Within a single generation, a later pair that collides on an address
/// overwrites the earlier one. Cross-song collisions are preserved by the
/// catalog, which keeps every couple per address.
pub type FingerprintSet = HashMap<Address, Couple>;

/// Generate the fingerprint set for an ordered peak list.
///
/// Peaks must be in ascending time order, as produced by the spectral stage.
/// For `n` peaks the result holds at most `n · target_zone_size` entries;
/// intra-song address collisions shrink it further.
pub fn fingerprint_peaks(
    peaks: &[Peak],
    song_id: u32,
    cfg: &FingerprintConfig,
) -> Result<FingerprintSet, FingerprintError> {
    cfg.validate()?;

    if peaks.len() < 2 {
        return Ok(FingerprintSet::new());
    }

    let mut fingerprints = FingerprintSet::with_capacity(peaks.len() * cfg.target_zone_size);
    for (i, anchor) in peaks.iter().enumerate() {
        let zone_end = (i + cfg.target_zone_size).min(peaks.len() - 1);
        for target in &peaks[i + 1..=zone_end] {
            let address = pack_address(anchor, target);
            fingerprints.insert(
                address,
                Couple {
                    anchor_time_ms: (anchor.time_s * 1000.0) as u32,
                    song_id,
                },
            );
        }
    }

    Ok(fingerprints)
}

/// Generate the query-side map for an ordered peak list.
///
/// Symmetric with [`fingerprint_peaks`] but keyed to the query recording's
/// own anchor times; queries have no song identity to carry.
pub fn query_fingerprints(
    peaks: &[Peak],
    cfg: &FingerprintConfig,
) -> Result<HashMap<Address, u32>, FingerprintError> {
    let set = fingerprint_peaks(peaks, 0, cfg)?;
    Ok(set
        .into_iter()
        .map(|(address, couple)| (address, couple.anchor_time_ms))
        .collect())
}
