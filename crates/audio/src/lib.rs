//! Audio collaborator boundary: canonical WAV I/O and the external
//! transcoder.
//!
//! The identification core consumes `f64` PCM in `[-1.0, 1.0]`; everything
//! upstream of that lives here. Compressed formats are never decoded in
//! process: [`convert_to_wav`] shells out to `ffmpeg` to produce a
//! canonical 16-bit little-endian PCM WAV, and [`read_wav`] parses that
//! canonical layout (44-byte RIFF header, mono or stereo).

mod transcode;
mod wav;

use thiserror::Error;

pub use crate::transcode::{convert_to_wav, probe_tags, TrackTags};
pub use crate::wav::{pcm16_to_samples, read_wav, write_wav, WavAudio};

/// Errors produced at the audio boundary.
#[derive(Debug, Error)]
pub enum AudioError {
    /// RIFF/PCM header did not match the canonical layout, or the file was
    /// truncated relative to its declared data size.
    #[error("invalid wav header: {0}")]
    InvalidHeader(String),

    /// Channel layouts other than mono and stereo are not processed.
    #[error("unsupported channel count {channels} (only mono/stereo)")]
    UnsupportedChannels { channels: u16 },

    /// Only 16-bit PCM is accepted from the transcoder.
    #[error("unsupported bits per sample {bits} (expected 16-bit PCM)")]
    UnsupportedBitDepth { bits: u16 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The external transcoder exited unsuccessfully; carries its stderr.
    #[error("transcoder failure: {0}")]
    Transcode(String),
}
