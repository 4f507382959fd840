//! Windowed magnitude spectrogram construction.

use crate::config::{SpectralConfig, SpectralError};
use crate::fft::fft;
use crate::filter::{decimate, low_pass};

/// Time × frequency magnitude matrix produced by the short-time transform.
///
/// Row `t` covers the window starting `t · hop_size` samples into the
/// decimated stream; column `f` corresponds to `f · sample_rate /
/// window_size` Hz. Only the non-redundant lower half of each transform is
/// kept, so every row has `window_size / 2` columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram {
    /// Per-window magnitude spectra, in time order.
    pub magnitudes: Vec<Vec<f64>>,
    /// Effective sample rate of the decimated stream the windows were cut
    /// from, in Hz.
    pub sample_rate: u32,
    /// Samples per analysis window.
    pub window_size: usize,
    /// Samples between successive window starts.
    pub hop_size: usize,
}

impl Spectrogram {
    /// Number of time windows.
    pub fn rows(&self) -> usize {
        self.magnitudes.len()
    }

    /// Width of one frequency bin in Hz.
    pub fn bin_hz(&self) -> f64 {
        self.sample_rate as f64 / self.window_size as f64
    }
}

/// Build the magnitude spectrogram of a mono sample stream.
///
/// The stream is low-pass filtered, decimated towards the configured working
/// rate, cut into Hamming-windowed frames, and transformed. Only complete
/// windows are transformed; a trailing remainder shorter than one window is
/// dropped.
///
/// Returns [`SpectralError::EmptyInput`] for a zero-length stream. Audio that
/// is shorter than one window after decimation produces an empty matrix, not
/// an error.
pub fn build_spectrogram(
    samples: &[f64],
    sample_rate: u32,
    cfg: &SpectralConfig,
) -> Result<Spectrogram, SpectralError> {
    cfg.validate()?;
    if samples.is_empty() {
        return Err(SpectralError::EmptyInput);
    }

    let filtered = low_pass(samples, cfg.cutoff_hz, sample_rate);
    let (decimated, working_rate) = decimate(&filtered, sample_rate, cfg.target_rate);

    let window = hamming_window(cfg.window_size);
    let half = cfg.window_size / 2;

    let mut magnitudes = Vec::new();
    let mut start = 0;
    while start + cfg.window_size <= decimated.len() {
        let mut frame: Vec<f64> = decimated[start..start + cfg.window_size].to_vec();
        for (sample, coefficient) in frame.iter_mut().zip(&window) {
            *sample *= coefficient;
        }

        let spectrum = fft(&frame);
        let row: Vec<f64> = spectrum[..half].iter().map(|c| c.norm()).collect();
        magnitudes.push(row);

        start += cfg.hop_size;
    }

    Ok(Spectrogram {
        magnitudes,
        sample_rate: working_rate,
        window_size: cfg.window_size,
        hop_size: cfg.hop_size,
    })
}

/// Hamming window coefficients: `0.54 − 0.46·cos(2πi/(N−1))`.
fn hamming_window(size: usize) -> Vec<f64> {
    if size == 1 {
        return vec![1.0];
    }
    (0..size)
        .map(|i| {
            0.54 - 0.46 * (2.0 * std::f64::consts::PI * i as f64 / (size - 1) as f64).cos()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq_hz: f64, rate: u32, seconds: f64) -> Vec<f64> {
        let count = (rate as f64 * seconds) as usize;
        (0..count)
            .map(|i| (2.0 * std::f64::consts::PI * freq_hz * i as f64 / rate as f64).sin())
            .collect()
    }

    #[test]
    fn empty_input_is_an_error() {
        let cfg = SpectralConfig::default();
        assert_eq!(
            build_spectrogram(&[], 44_100, &cfg),
            Err(SpectralError::EmptyInput)
        );
    }

    #[test]
    fn short_input_yields_empty_matrix() {
        let cfg = SpectralConfig::default();
        // Ten samples decimate to two or three, far below one window.
        let spectrogram = build_spectrogram(&[0.1; 10], 44_100, &cfg).unwrap();
        assert_eq!(spectrogram.rows(), 0);
    }

    #[test]
    fn row_count_and_width_match_config() {
        let cfg = SpectralConfig::default();
        let samples = tone(440.0, 44_100, 2.0);
        let spectrogram = build_spectrogram(&samples, 44_100, &cfg).unwrap();

        // 2 s at 11 025 Hz is 22 050 samples: 21 complete windows of 1024.
        assert_eq!(spectrogram.rows(), 21);
        for row in &spectrogram.magnitudes {
            assert_eq!(row.len(), 512);
        }
        assert_eq!(spectrogram.sample_rate, 11_025);
    }

    #[test]
    fn tone_energy_lands_in_expected_bin() {
        let cfg = SpectralConfig::default();
        let samples = tone(1_000.0, 44_100, 1.0);
        let spectrogram = build_spectrogram(&samples, 44_100, &cfg).unwrap();
        assert!(spectrogram.rows() > 0);

        let expected_bin = (1_000.0 / spectrogram.bin_hz()).round() as usize;
        let row = &spectrogram.magnitudes[spectrogram.rows() / 2];
        let peak_bin = row
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(idx, _)| idx)
            .unwrap();
        assert!(
            peak_bin.abs_diff(expected_bin) <= 1,
            "peak bin {peak_bin} vs expected {expected_bin}"
        );
    }

    #[test]
    fn overlapping_hop_produces_more_rows() {
        let samples = tone(440.0, 44_100, 1.0);
        let full = SpectralConfig::default();
        let half = SpectralConfig::default().with_hop_size(512);

        let rows_full = build_spectrogram(&samples, 44_100, &full).unwrap().rows();
        let rows_half = build_spectrogram(&samples, 44_100, &half).unwrap().rows();
        assert!(rows_half > rows_full);
    }

    #[test]
    fn deterministic_across_runs() {
        let cfg = SpectralConfig::default();
        let samples = tone(880.0, 44_100, 1.0);
        let a = build_spectrogram(&samples, 44_100, &cfg).unwrap();
        let b = build_spectrogram(&samples, 44_100, &cfg).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn hamming_window_shape() {
        let window = hamming_window(1024);
        assert!((window[0] - 0.08).abs() < 1e-12);
        assert!((window[1023] - 0.08).abs() < 1e-12);
        // Symmetric with its maximum in the middle.
        assert!(window[511] > 0.99);
        assert!((window[100] - window[923]).abs() < 1e-12);
    }
}
