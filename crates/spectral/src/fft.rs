//! Radix-2 decimation-in-time Fast Fourier Transform.
//!
//! The forward transform maps `N` real samples to `N` complex frequency
//! components `X[k] = Σₙ x[n]·e^(−2πikn/N)`. The recursive split into
//! even- and odd-indexed halves brings the cost down from the direct
//! DFT's O(N²) to O(N log N); the halves are recombined with twiddle
//! factors `W_N^k = e^(−2πik/N)`.
//!
//! Callers are expected to supply power-of-two lengths; the spectrogram
//! builder always does. Other lengths still terminate but do not compute
//! a meaningful DFT.

use std::f64::consts::PI;

use num_complex::Complex64;

/// Forward FFT of a real-valued signal.
///
/// Returns all `N` complex bins; for real input the upper half mirrors the
/// lower, so spectral consumers typically keep only bins `0..N/2`.
pub fn fft(input: &[f64]) -> Vec<Complex64> {
    let buffer: Vec<Complex64> = input
        .iter()
        .map(|&sample| Complex64::new(sample, 0.0))
        .collect();
    fft_complex(buffer)
}

fn fft_complex(input: Vec<Complex64>) -> Vec<Complex64> {
    let n = input.len();
    if n <= 1 {
        return input;
    }

    let even: Vec<Complex64> = input.iter().step_by(2).copied().collect();
    let odd: Vec<Complex64> = input.iter().skip(1).step_by(2).copied().collect();

    let even = fft_complex(even);
    let odd = fft_complex(odd);

    let mut output = vec![Complex64::new(0.0, 0.0); n];
    for k in 0..n / 2 {
        let angle = -2.0 * PI * k as f64 / n as f64;
        let twiddle = Complex64::new(angle.cos(), angle.sin());
        let t = twiddle * odd[k];
        output[k] = even[k] + t;
        output[k + n / 2] = even[k] - t;
    }

    output
}
