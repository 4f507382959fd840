//! 32-bit address packing for peak pairs.
//!
//! An address captures the *shape* of an anchor/target peak pair: both
//! frequencies quantised to 10 Hz steps and the millisecond gap between
//! them. The layout is fixed, since it is the lookup key shared by the
//! catalog and every query:
//!
//! ```text
//! bits 31..23  anchor frequency bin  (freq_hz / 10, 9 bits)
//! bits 22..14  target frequency bin  (freq_hz / 10, 9 bits)
//! bits 13..0   time delta in ms      (14 bits)
//! ```
//!
//! Addresses travel as `i64` with the upper 32 bits zero so that storage
//! backends with signed integer keys hold them without remapping.

use spectral::Peak;

/// Packed peak-pair key; upper 32 bits are always zero.
pub type Address = i64;

const FREQ_BITS: u32 = 9;
const DELTA_BITS: u32 = 14;
const FREQ_STEP_HZ: f64 = 10.0;

/// Pack an anchor/target pair into its address.
///
/// Each field is masked to its allotted width; overflow truncates silently.
/// That is acceptable under the operating assumptions: quantised frequencies
/// stay below 512 on an ~11 kHz axis and target-zone deltas stay well below
/// the 14-bit ceiling of ~16 s.
pub fn pack_address(anchor: &Peak, target: &Peak) -> Address {
    let anchor_bin = (anchor.freq_hz / FREQ_STEP_HZ) as u32 & ((1 << FREQ_BITS) - 1);
    let target_bin = (target.freq_hz / FREQ_STEP_HZ) as u32 & ((1 << FREQ_BITS) - 1);
    let delta_ms = ((target.time_s - anchor.time_s) * 1000.0) as u32 & ((1 << DELTA_BITS) - 1);

    let address = (anchor_bin << (FREQ_BITS + DELTA_BITS)) | (target_bin << DELTA_BITS) | delta_ms;
    Address::from(address)
}

/// Unpack an address into `(anchor_bin, target_bin, delta_ms)`.
pub fn unpack_address(address: Address) -> (u32, u32, u32) {
    let address = address as u32;
    let anchor_bin = address >> (FREQ_BITS + DELTA_BITS);
    let target_bin = (address >> DELTA_BITS) & ((1 << FREQ_BITS) - 1);
    let delta_ms = address & ((1 << DELTA_BITS) - 1);
    (anchor_bin, target_bin, delta_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak(time_s: f64, freq_hz: f64) -> Peak {
        Peak { time_s, freq_hz }
    }

    #[test]
    fn packs_reference_pair() {
        // 2000 Hz at 1.0 s paired with 3000 Hz at 1.5 s:
        // (200 << 23) | (300 << 14) | 500.
        let address = pack_address(&peak(1.0, 2_000.0), &peak(1.5, 3_000.0));
        assert_eq!(address, 1_682_637_300);
    }

    #[test]
    fn upper_half_is_zero() {
        let address = pack_address(&peak(0.0, 5_110.0), &peak(16.0, 5_110.0));
        assert_eq!(address >> 32, 0);
        assert!(address >= 0);
    }

    #[test]
    fn roundtrip_recovers_fields() {
        for (anchor_hz, target_hz, delta_ms) in [
            (0.0, 0.0, 0u32),
            (2_000.0, 3_000.0, 500),
            (5_110.0, 10.0, 16_000),
            (990.0, 4_320.0, 1),
        ] {
            let anchor = peak(0.0, anchor_hz);
            let target = peak(delta_ms as f64 / 1000.0, target_hz);
            let (a, t, d) = unpack_address(pack_address(&anchor, &target));
            assert_eq!(a, (anchor_hz / 10.0) as u32);
            assert_eq!(t, (target_hz / 10.0) as u32);
            assert_eq!(d, delta_ms);
        }
    }

    #[test]
    fn overflowing_fields_truncate() {
        // 10 240 Hz quantises to 1024, which masks down to 9 bits = 0.
        let address = pack_address(&peak(0.0, 10_240.0), &peak(0.1, 100.0));
        let (anchor_bin, target_bin, delta_ms) = unpack_address(address);
        assert_eq!(anchor_bin, 0);
        assert_eq!(target_bin, 10);
        assert_eq!(delta_ms, 100);

        // A delta beyond ~16.4 s wraps within its 14 bits.
        let address = pack_address(&peak(0.0, 100.0), &peak(20.0, 100.0));
        let (_, _, delta_ms) = unpack_address(address);
        assert_eq!(delta_ms, 20_000 & 0x3FFF);
    }
}
