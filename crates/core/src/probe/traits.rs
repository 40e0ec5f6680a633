//! Trait definitions for the probe module.

use async_trait::async_trait;
use std::path::Path;

use crate::error::AudioError;
use crate::media::ArtifactMetadata;

/// Parses an audio file independently of the tool that produced it.
#[async_trait]
pub trait MetadataReader: Send + Sync {
    /// Returns the name of this reader implementation.
    fn name(&self) -> &str;

    /// Reads container, stream, tag and artwork facts from `path`.
    ///
    /// Fails with `ProbeFailed` when the file cannot be parsed.
    async fn read(&self, path: &Path) -> Result<ArtifactMetadata, AudioError>;
}
