//! Pre-transform conditioning: low-pass filtering and decimation.

/// First-order RC low-pass filter.
///
/// Attenuates energy above `cutoff_hz` ahead of decimation so the decimated
/// stream does not alias. The exact frequency response is not part of the
/// identification contract; what matters is that ingest and query run the
/// same filter.
pub fn low_pass(input: &[f64], cutoff_hz: f64, sample_rate: u32) -> Vec<f64> {
    let rc = 1.0 / (2.0 * std::f64::consts::PI * cutoff_hz);
    let dt = 1.0 / sample_rate as f64;
    let alpha = dt / (rc + dt);

    let mut output = Vec::with_capacity(input.len());
    let mut previous = 0.0;
    for (i, &x) in input.iter().enumerate() {
        let y = if i == 0 {
            x * alpha
        } else {
            alpha * x + (1.0 - alpha) * previous
        };
        output.push(y);
        previous = y;
    }
    output
}

/// Decimate `input` towards `target_rate` by averaging fixed-size blocks.
///
/// The decimation factor is `round(sample_rate / target_rate)`, clamped to at
/// least 1, so a source rate that is not an exact multiple of the target
/// yields a slightly different effective rate. Returns the decimated samples
/// together with that effective rate.
pub fn decimate(input: &[f64], sample_rate: u32, target_rate: u32) -> (Vec<f64>, u32) {
    let factor = ((sample_rate as f64 / target_rate as f64).round() as usize).max(1);
    if factor == 1 {
        return (input.to_vec(), sample_rate);
    }

    let mut output = Vec::with_capacity(input.len() / factor + 1);
    for block in input.chunks(factor) {
        let sum: f64 = block.iter().sum();
        output.push(sum / block.len() as f64);
    }

    (output, sample_rate / factor as u32)
}
