//! Band-wise spectral peak extraction.
//!
//! Each analysis window contributes at most one peak per logarithmic
//! frequency band. Keeping the bands separate stops a handful of loud
//! low-frequency bins from crowding out the rest of the spectrum, which is
//! what makes the downstream pairing robust to playback volume and EQ.

use crate::spectrogram::Spectrogram;

/// Logarithmic band edges over the 512 transform bins.
const BANDS: [(usize, usize); 6] = [(0, 10), (10, 20), (20, 40), (40, 80), (80, 160), (160, 512)];

/// A local magnitude maximum within one band of one window.
///
/// Peaks carry real-world coordinates: seconds from the start of the track
/// and Hz on the decimated frequency axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub time_s: f64,
    pub freq_hz: f64,
}

/// Extract band-wise maxima from a spectrogram.
///
/// `duration_s` is the duration of the original (pre-decimation) audio; row
/// times are scaled uniformly onto `[0, duration_s)` so that a clip and its
/// re-recording line up regardless of how the final partial frame fell.
///
/// A window's band maximum survives only if it reaches the mean of that
/// band's maxima across all windows, which rejects noise-floor excursions.
/// Peaks are returned in ascending time order, ties broken by frequency.
/// An empty spectrogram yields an empty list.
pub fn extract_peaks(spectrogram: &Spectrogram, duration_s: f64) -> Vec<Peak> {
    let rows = spectrogram.rows();
    if rows == 0 {
        return Vec::new();
    }

    // Pass 1: the strongest bin per band per window, and each band's mean
    // maximum over the whole track.
    let mut band_maxima: Vec<[(usize, f64); BANDS.len()]> = Vec::with_capacity(rows);
    let mut band_sums = [0.0f64; BANDS.len()];

    for row in &spectrogram.magnitudes {
        let mut maxima = [(0usize, 0.0f64); BANDS.len()];
        for (band_idx, &(lo, hi)) in BANDS.iter().enumerate() {
            let hi = hi.min(row.len());
            if lo >= hi {
                continue;
            }
            let mut best_bin = lo;
            let mut best_mag = row[lo];
            for (offset, &magnitude) in row[lo..hi].iter().enumerate() {
                if magnitude > best_mag {
                    best_mag = magnitude;
                    best_bin = lo + offset;
                }
            }
            maxima[band_idx] = (best_bin, best_mag);
            band_sums[band_idx] += best_mag;
        }
        band_maxima.push(maxima);
    }

    let band_means: Vec<f64> = band_sums.iter().map(|sum| sum / rows as f64).collect();

    // Pass 2: keep the maxima that clear their band's mean, in time order.
    let bin_hz = spectrogram.bin_hz();
    let mut peaks = Vec::new();
    for (row_idx, maxima) in band_maxima.iter().enumerate() {
        let time_s = row_idx as f64 * duration_s / rows as f64;
        for (band_idx, &(bin, magnitude)) in maxima.iter().enumerate() {
            if magnitude > 0.0 && magnitude >= band_means[band_idx] {
                peaks.push(Peak {
                    time_s,
                    freq_hz: bin as f64 * bin_hz,
                });
            }
        }
    }

    peaks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpectralConfig;
    use crate::spectrogram::build_spectrogram;

    fn spectrogram_from_rows(rows: Vec<Vec<f64>>) -> Spectrogram {
        Spectrogram {
            magnitudes: rows,
            sample_rate: 11_025,
            window_size: 1024,
            hop_size: 1024,
        }
    }

    #[test]
    fn empty_spectrogram_yields_no_peaks() {
        let spectrogram = spectrogram_from_rows(Vec::new());
        assert!(extract_peaks(&spectrogram, 0.0).is_empty());
    }

    #[test]
    fn one_hot_row_produces_one_peak_per_active_band() {
        // Energy in bin 15 (second band) only.
        let mut row = vec![0.0; 512];
        row[15] = 10.0;
        let spectrogram = spectrogram_from_rows(vec![row]);

        let peaks = extract_peaks(&spectrogram, 1.0);
        assert_eq!(peaks.len(), 1);
        let expected_hz = 15.0 * 11_025.0 / 1024.0;
        assert!((peaks[0].freq_hz - expected_hz).abs() < 1e-9);
        assert_eq!(peaks[0].time_s, 0.0);
    }

    #[test]
    fn loud_low_band_does_not_suppress_other_bands() {
        let mut row = vec![0.0; 512];
        row[3] = 1_000.0; // dominant low-frequency bin
        row[300] = 1.0; // quiet high-band bin
        let spectrogram = spectrogram_from_rows(vec![row]);

        let peaks = extract_peaks(&spectrogram, 1.0);
        // Both bands report their own maximum.
        assert_eq!(peaks.len(), 2);
    }

    #[test]
    fn below_mean_maxima_are_discarded() {
        // Band 0 maxima over three windows: 10, 10, 1 → mean = 7; the third
        // window's weak maximum falls below it.
        let mut strong = vec![0.0; 512];
        strong[5] = 10.0;
        let mut weak = vec![0.0; 512];
        weak[5] = 1.0;
        let spectrogram = spectrogram_from_rows(vec![strong.clone(), strong, weak]);

        let peaks = extract_peaks(&spectrogram, 3.0);
        assert_eq!(peaks.len(), 2);
        assert!(peaks.iter().all(|p| p.time_s < 2.0));
    }

    #[test]
    fn peaks_are_ordered_by_time_then_frequency() {
        let cfg = SpectralConfig::default();
        let rate = 44_100u32;
        let samples: Vec<f64> = (0..rate as usize * 3)
            .map(|i| {
                let t = i as f64 / rate as f64;
                (2.0 * std::f64::consts::PI * 500.0 * t).sin()
                    + (2.0 * std::f64::consts::PI * 1_500.0 * t).sin()
                    + (2.0 * std::f64::consts::PI * 3_000.0 * t).sin()
            })
            .collect();
        let duration = samples.len() as f64 / rate as f64;
        let spectrogram = build_spectrogram(&samples, rate, &cfg).unwrap();
        let peaks = extract_peaks(&spectrogram, duration);
        assert!(!peaks.is_empty());

        for pair in peaks.windows(2) {
            let ordered = pair[0].time_s < pair[1].time_s
                || (pair[0].time_s == pair[1].time_s && pair[0].freq_hz <= pair[1].freq_hz);
            assert!(ordered, "peaks out of order: {:?} then {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn row_times_scale_uniformly_to_duration() {
        let mut row = vec![0.0; 512];
        row[30] = 5.0;
        let rows = vec![row.clone(), row.clone(), row.clone(), row];
        let spectrogram = spectrogram_from_rows(rows);

        let peaks = extract_peaks(&spectrogram, 8.0);
        let times: Vec<f64> = peaks.iter().map(|p| p.time_s).collect();
        assert_eq!(times, vec![0.0, 2.0, 4.0, 6.0]);
    }
}
