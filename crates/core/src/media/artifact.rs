//! Audio files before and after verification.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::AudioError;

use super::format::AudioFormat;
use super::tags::TagSet;

/// Embedded cover artwork.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtworkInfo {
    /// Image codec (e.g., "mjpeg", "png").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl ArtworkInfo {
    /// Whether both dimensions are known and even.
    ///
    /// Some encoders reject pictures with an odd width or height.
    pub fn has_even_dimensions(&self) -> bool {
        matches!((self.width, self.height), (Some(w), Some(h)) if w % 2 == 0 && h % 2 == 0)
    }
}

/// What the metadata reader observed in a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Container name as reported by the reader (e.g., "flac", "mov,mp4,m4a").
    pub container: String,
    /// Audio codec of the first audio stream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    /// Play time in seconds.
    pub duration_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate_kbps: Option<u32>,
    /// Embedded tags.
    pub tags: TagSet,
    /// Embedded cover artwork, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artwork: Option<ArtworkInfo>,
}

/// A file path with a declared format, not yet verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFile {
    path: PathBuf,
    format: AudioFormat,
}

impl AudioFile {
    /// Declares a file's format from its extension.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, AudioError> {
        let path = path.into();
        let format = AudioFormat::from_path(&path)?;
        Ok(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }
}

/// A file that was re-parsed and accepted by the verifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaArtifact {
    path: PathBuf,
    format: AudioFormat,
    metadata: ArtifactMetadata,
}

impl MediaArtifact {
    pub(crate) fn new(path: PathBuf, format: AudioFormat, metadata: ArtifactMetadata) -> Self {
        Self {
            path,
            format,
            metadata,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn metadata(&self) -> &ArtifactMetadata {
        &self.metadata
    }

    pub fn duration_secs(&self) -> f64 {
        self.metadata.duration_secs
    }

    pub fn tags(&self) -> &TagSet {
        &self.metadata.tags
    }

    pub(crate) fn tags_mut(&mut self) -> &mut TagSet {
        &mut self.metadata.tags
    }

    pub fn artwork(&self) -> Option<&ArtworkInfo> {
        self.metadata.artwork.as_ref()
    }
}
