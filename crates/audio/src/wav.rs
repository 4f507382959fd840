//! Canonical WAV (RIFF / PCM-16) reading and writing.
//!
//! Only the 44-byte canonical header is understood; that is exactly what the
//! transcoder emits. Fields are little-endian throughout.

use std::fs;
use std::path::Path;

use crate::AudioError;

const HEADER_LEN: usize = 44;
const SAMPLE_SCALE: f64 = 1.0 / 32768.0;

/// Decoded WAV contents: normalised per-channel samples plus stream facts.
#[derive(Debug, Clone, PartialEq)]
pub struct WavAudio {
    pub channels: u16,
    pub sample_rate: u32,
    /// Total duration in seconds.
    pub duration_s: f64,
    /// Mono samples, or the left channel of a stereo stream.
    pub left: Vec<f64>,
    /// Right channel for stereo streams.
    pub right: Option<Vec<f64>>,
}

/// Read and decode a canonical WAV file.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<WavAudio, AudioError> {
    let bytes = fs::read(path)?;
    parse_wav(&bytes)
}

/// Decode a canonical WAV byte stream.
pub fn parse_wav(bytes: &[u8]) -> Result<WavAudio, AudioError> {
    if bytes.len() < HEADER_LEN {
        return Err(AudioError::InvalidHeader(format!(
            "file too short for a wav header ({} bytes)",
            bytes.len()
        )));
    }

    if &bytes[0..4] != b"RIFF" {
        return Err(AudioError::InvalidHeader("missing RIFF chunk id".into()));
    }
    if &bytes[8..12] != b"WAVE" {
        return Err(AudioError::InvalidHeader("missing WAVE format id".into()));
    }
    if &bytes[12..16] != b"fmt " {
        return Err(AudioError::InvalidHeader("missing fmt subchunk".into()));
    }
    if &bytes[36..40] != b"data" {
        return Err(AudioError::InvalidHeader("missing data subchunk".into()));
    }

    let audio_format = u16::from_le_bytes([bytes[20], bytes[21]]);
    if audio_format != 1 {
        return Err(AudioError::InvalidHeader(format!(
            "audio format {audio_format} is not PCM"
        )));
    }

    let bits_per_sample = u16::from_le_bytes([bytes[34], bytes[35]]);
    if bits_per_sample != 16 {
        return Err(AudioError::UnsupportedBitDepth {
            bits: bits_per_sample,
        });
    }

    let channels = u16::from_le_bytes([bytes[22], bytes[23]]);
    if channels == 0 || channels > 2 {
        return Err(AudioError::UnsupportedChannels { channels });
    }

    let sample_rate = u32::from_le_bytes([bytes[24], bytes[25], bytes[26], bytes[27]]);
    let data_size = u32::from_le_bytes([bytes[40], bytes[41], bytes[42], bytes[43]]) as usize;
    let available = bytes.len() - HEADER_LEN;
    if data_size > available {
        return Err(AudioError::InvalidHeader(format!(
            "declared data size {data_size} exceeds available {available} bytes"
        )));
    }

    let data = &bytes[HEADER_LEN..HEADER_LEN + data_size];
    let samples = pcm16_to_samples(data)?;
    let sample_count = samples.len();

    let (left, right) = match channels {
        1 => (samples, None),
        _ => {
            let frame_count = sample_count / 2;
            let mut left = Vec::with_capacity(frame_count);
            let mut right = Vec::with_capacity(frame_count);
            for frame in samples.chunks_exact(2) {
                left.push(frame[0]);
                right.push(frame[1]);
            }
            (left, Some(right))
        }
    };

    Ok(WavAudio {
        channels,
        sample_rate,
        duration_s: sample_count as f64 / (channels as f64 * sample_rate as f64),
        left,
        right,
    })
}

/// Convert raw 16-bit little-endian PCM bytes into normalised samples.
pub fn pcm16_to_samples(data: &[u8]) -> Result<Vec<f64>, AudioError> {
    if data.len() % 2 != 0 {
        return Err(AudioError::InvalidHeader(
            "pcm data has a trailing half-sample".into(),
        ));
    }
    Ok(data
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f64 * SAMPLE_SCALE)
        .collect())
}

/// Write raw PCM bytes as a canonical WAV file.
pub fn write_wav<P: AsRef<Path>>(
    path: P,
    data: &[u8],
    sample_rate: u32,
    channels: u16,
    bits_per_sample: u16,
) -> Result<(), AudioError> {
    if sample_rate == 0 || channels == 0 || bits_per_sample == 0 {
        return Err(AudioError::InvalidHeader(format!(
            "rate, channels, and bit depth must be positive \
             (sample_rate: {sample_rate}, channels: {channels}, bits: {bits_per_sample})"
        )));
    }
    let bytes_per_sample = u32::from(bits_per_sample) / 8;
    let block_align = bytes_per_sample * u32::from(channels);
    if block_align == 0 || data.len() % block_align as usize != 0 {
        return Err(AudioError::InvalidHeader(
            "data length does not divide into whole frames".into(),
        ));
    }

    let mut out = Vec::with_capacity(HEADER_LEN + data.len());
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data.len() as u32).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * block_align).to_le_bytes());
    out.extend_from_slice(&(block_align as u16).to_le_bytes());
    out.extend_from_slice(&bits_per_sample.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(data);

    fs::write(path, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pcm_bytes(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn mono_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono.wav");
        let data = pcm_bytes(&[0, 16384, -16384, 32767, -32768]);

        write_wav(&path, &data, 44_100, 1, 16).unwrap();
        let audio = read_wav(&path).unwrap();

        assert_eq!(audio.channels, 1);
        assert_eq!(audio.sample_rate, 44_100);
        assert!(audio.right.is_none());
        assert_eq!(audio.left.len(), 5);
        assert_eq!(audio.left[0], 0.0);
        assert!((audio.left[1] - 0.5).abs() < 1e-12);
        assert!((audio.left[2] + 0.5).abs() < 1e-12);
        assert!((audio.left[3] - 32767.0 / 32768.0).abs() < 1e-12);
        assert_eq!(audio.left[4], -1.0);
        assert!((audio.duration_s - 5.0 / 44_100.0).abs() < 1e-12);
    }

    #[test]
    fn stereo_deinterleaves_channels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        // Interleaved L/R frames.
        let data = pcm_bytes(&[100, -100, 200, -200, 300, -300]);

        write_wav(&path, &data, 22_050, 2, 16).unwrap();
        let audio = read_wav(&path).unwrap();

        assert_eq!(audio.channels, 2);
        let right = audio.right.unwrap();
        assert_eq!(audio.left.len(), 3);
        assert_eq!(right.len(), 3);
        assert!(audio.left.iter().all(|&s| s > 0.0));
        assert!(right.iter().all(|&s| s < 0.0));
        // Duration counts frames, not interleaved samples.
        assert!((audio.duration_s - 3.0 / 22_050.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_wrong_chunk_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.wav");
        write_wav(&path, &pcm_bytes(&[1, 2]), 44_100, 1, 16).unwrap();

        let mut bytes = fs::read(&path).unwrap();
        bytes[0..4].copy_from_slice(b"RIFX");
        assert!(matches!(
            parse_wav(&bytes),
            Err(AudioError::InvalidHeader(_))
        ));
    }

    #[test]
    fn rejects_non_pcm_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("float.wav");
        write_wav(&path, &pcm_bytes(&[1, 2]), 44_100, 1, 16).unwrap();

        let mut bytes = fs::read(&path).unwrap();
        bytes[20..22].copy_from_slice(&3u16.to_le_bytes()); // IEEE float
        assert!(matches!(
            parse_wav(&bytes),
            Err(AudioError::InvalidHeader(_))
        ));
    }

    #[test]
    fn rejects_unsupported_channel_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quad.wav");
        write_wav(&path, &pcm_bytes(&[1, 2, 3, 4]), 44_100, 2, 16).unwrap();

        let mut bytes = fs::read(&path).unwrap();
        bytes[22..24].copy_from_slice(&4u16.to_le_bytes());
        assert!(matches!(
            parse_wav(&bytes),
            Err(AudioError::UnsupportedChannels { channels: 4 })
        ));
    }

    #[test]
    fn rejects_truncated_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.wav");
        write_wav(&path, &pcm_bytes(&[1, 2, 3, 4]), 44_100, 1, 16).unwrap();

        let bytes = fs::read(&path).unwrap();
        // Drop the last sample's bytes without fixing the declared size.
        assert!(matches!(
            parse_wav(&bytes[..bytes.len() - 2]),
            Err(AudioError::InvalidHeader(_))
        ));
    }

    #[test]
    fn rejects_header_only_fragment() {
        assert!(matches!(
            parse_wav(&[0u8; 20]),
            Err(AudioError::InvalidHeader(_))
        ));
    }

    #[test]
    fn writer_rejects_ragged_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ragged.wav");
        // Three bytes cannot form whole 16-bit mono frames.
        assert!(matches!(
            write_wav(&path, &[1, 2, 3], 44_100, 1, 16),
            Err(AudioError::InvalidHeader(_))
        ));
    }

    #[test]
    fn odd_pcm_byte_count_is_an_error() {
        assert!(pcm16_to_samples(&[0x01]).is_err());
    }
}
