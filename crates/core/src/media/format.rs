//! Supported audio formats.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::AudioError;

use super::artifact::ArtifactMetadata;

/// Audio format, always derived from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioFormat {
    /// Free Lossless Audio Codec
    Flac,
    /// MPEG Audio Layer III
    Mp3,
    /// Apple Lossless in an MPEG-4 container (.m4a)
    Alac,
    /// WAVE (PCM)
    Wav,
    /// Ogg Vorbis
    Ogg,
}

impl AudioFormat {
    /// All supported formats.
    pub const ALL: [AudioFormat; 5] = [Self::Flac, Self::Mp3, Self::Alac, Self::Wav, Self::Ogg];

    /// Maps a file extension (case-insensitive) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "flac" => Some(Self::Flac),
            "mp3" => Some(Self::Mp3),
            "m4a" => Some(Self::Alac),
            "wav" => Some(Self::Wav),
            "ogg" => Some(Self::Ogg),
            _ => None,
        }
    }

    /// Infers the format from a path's extension.
    ///
    /// The file content is never sniffed; callers must supply correctly
    /// extensioned paths.
    pub fn from_path(path: &Path) -> Result<Self, AudioError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            AudioError::invalid_argument(format!(
                "cannot infer audio format of {}: missing file extension",
                path.display()
            ))
        })?;

        Self::from_extension(ext).ok_or_else(|| {
            AudioError::invalid_argument(format!(
                "unsupported audio format \"{}\" for {}",
                ext,
                path.display()
            ))
        })
    }

    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Flac => "flac",
            Self::Mp3 => "mp3",
            Self::Alac => "m4a",
            Self::Wav => "wav",
            Self::Ogg => "ogg",
        }
    }

    /// Whether embedded tags can be edited for this format.
    pub fn supports_tagging(&self) -> bool {
        matches!(self, Self::Flac | Self::Mp3 | Self::Alac)
    }

    /// Whether repeated tag fields read back as separate values.
    ///
    /// Every other format stores a multi-valued field as one `;`-joined value.
    pub fn keeps_repeated_fields(&self) -> bool {
        matches!(self, Self::Flac)
    }

    /// Whether the probed container and codec are what this format promises.
    pub fn matches(&self, metadata: &ArtifactMetadata) -> bool {
        let container = metadata.container.to_ascii_lowercase();
        let codec = metadata
            .codec
            .as_deref()
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let in_family = |names: &[&str]| container.split(',').any(|c| names.contains(&c));

        match self {
            Self::Flac => in_family(&["flac"]) && codec == "flac",
            Self::Mp3 => in_family(&["mp3"]) && codec == "mp3",
            Self::Alac => in_family(&["mov", "mp4", "m4a", "ipod"]) && codec == "alac",
            Self::Wav => in_family(&["wav"]) && codec.starts_with("pcm_"),
            Self::Ogg => in_family(&["ogg"]) && matches!(codec.as_str(), "vorbis" | "opus" | "flac"),
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Flac => "FLAC",
            Self::Mp3 => "MP3",
            Self::Alac => "ALAC",
            Self::Wav => "WAV",
            Self::Ogg => "OGG",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::TagSet;

    fn metadata(container: &str, codec: &str) -> ArtifactMetadata {
        ArtifactMetadata {
            container: container.to_string(),
            codec: Some(codec.to_string()),
            duration_secs: 10.0,
            sample_rate: None,
            channels: None,
            bitrate_kbps: None,
            tags: TagSet::new(),
            artwork: None,
        }
    }

    #[test]
    fn test_from_path() {
        assert_eq!(
            AudioFormat::from_path(Path::new("/music/a.FLAC")).unwrap(),
            AudioFormat::Flac
        );
        assert_eq!(
            AudioFormat::from_path(Path::new("b.m4a")).unwrap(),
            AudioFormat::Alac
        );
        assert!(matches!(
            AudioFormat::from_path(Path::new("c.aiff")),
            Err(AudioError::InvalidArgument { .. })
        ));
        assert!(AudioFormat::from_path(Path::new("no_extension")).is_err());
    }

    #[test]
    fn test_extension_round_trips() {
        for format in AudioFormat::ALL {
            assert_eq!(AudioFormat::from_extension(format.extension()), Some(format));
        }
    }

    #[test]
    fn test_matches_probe_results() {
        assert!(AudioFormat::Flac.matches(&metadata("flac", "flac")));
        assert!(AudioFormat::Mp3.matches(&metadata("mp3", "mp3")));
        assert!(AudioFormat::Alac.matches(&metadata("mov,mp4,m4a,3gp,3g2,mj2", "alac")));
        assert!(AudioFormat::Wav.matches(&metadata("wav", "pcm_s16le")));
        assert!(AudioFormat::Ogg.matches(&metadata("ogg", "vorbis")));

        assert!(!AudioFormat::Alac.matches(&metadata("mov,mp4,m4a,3gp,3g2,mj2", "aac")));
        assert!(!AudioFormat::Mp3.matches(&metadata("flac", "flac")));
        assert!(!AudioFormat::Wav.matches(&metadata("wav", "mp3")));
    }

    #[test]
    fn test_supports_tagging() {
        assert!(AudioFormat::Flac.supports_tagging());
        assert!(AudioFormat::Alac.supports_tagging());
        assert!(!AudioFormat::Wav.supports_tagging());
        assert!(!AudioFormat::Ogg.supports_tagging());
    }

    #[test]
    fn test_keeps_repeated_fields() {
        assert!(AudioFormat::Flac.keeps_repeated_fields());
        assert!(!AudioFormat::Mp3.keeps_repeated_fields());
        assert!(!AudioFormat::Alac.keeps_repeated_fields());
    }
}
