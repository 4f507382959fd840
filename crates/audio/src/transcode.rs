//! External transcoder collaborator (ffmpeg / ffprobe).

use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;

use crate::AudioError;

/// Canonical rate every transcoded file is resampled to.
const CANONICAL_RATE: u32 = 44_100;

/// Convert any input media to a canonical PCM-16 WAV next to the original.
///
/// The converted file keeps the input's stem with an `.rfm.wav` suffix.
/// `channels` outside 1..=2 falls back to mono. Requires `ffmpeg` on the
/// `PATH`; a failed run surfaces the tool's stderr.
pub fn convert_to_wav(input: &Path, channels: u16) -> Result<PathBuf, AudioError> {
    // Surfaces a clean NotFound instead of an opaque ffmpeg complaint.
    std::fs::metadata(input)?;

    let channels = if (1..=2).contains(&channels) { channels } else { 1 };
    let output = input.with_extension("rfm.wav");

    let result = Command::new("ffmpeg")
        .arg("-y")
        .arg("-i")
        .arg(input)
        .args(["-c", "pcm_s16le", "-ar", &CANONICAL_RATE.to_string(), "-ac"])
        .arg(channels.to_string())
        .arg(&output)
        .output()?;

    if !result.status.success() {
        return Err(AudioError::Transcode(
            String::from_utf8_lossy(&result.stderr).trim().to_string(),
        ));
    }

    Ok(output)
}

/// Title/artist tags extracted from a media file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackTags {
    pub title: Option<String>,
    pub artist: Option<String>,
}

/// Probe a media file's tags with `ffprobe`.
pub fn probe_tags(input: &Path) -> Result<TrackTags, AudioError> {
    let result = Command::new("ffprobe")
        .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
        .arg(input)
        .output()?;

    if !result.status.success() {
        return Err(AudioError::Transcode(
            String::from_utf8_lossy(&result.stderr).trim().to_string(),
        ));
    }

    let metadata: Value = serde_json::from_slice(&result.stdout)
        .map_err(|e| AudioError::Transcode(format!("unparseable ffprobe output: {e}")))?;
    Ok(tags_from_metadata(&metadata))
}

/// Pull title/artist out of ffprobe JSON, preferring container-level tags
/// over per-stream ones. Tag keys are matched case-insensitively.
fn tags_from_metadata(metadata: &Value) -> TrackTags {
    let mut tags = TrackTags::default();

    let mut sources = Vec::new();
    if let Some(format_tags) = metadata.pointer("/format/tags") {
        sources.push(format_tags);
    }
    if let Some(stream_tags) = metadata.pointer("/streams/0/tags") {
        sources.push(stream_tags);
    }

    for source in sources {
        let Some(map) = source.as_object() else {
            continue;
        };
        for (key, value) in map {
            let Some(value) = value.as_str() else {
                continue;
            };
            match key.to_ascii_lowercase().as_str() {
                "title" if tags.title.is_none() => tags.title = Some(value.to_string()),
                "artist" if tags.artist.is_none() => tags.artist = Some(value.to_string()),
                _ => {}
            }
        }
    }

    tags
}
