//! Trait definitions for the converter module.

use async_trait::async_trait;
use std::path::Path;

use crate::error::AudioError;
use crate::media::{AudioFormat, MediaArtifact};

/// Converts files of one source format.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Format every input must have.
    fn source_format(&self) -> AudioFormat;

    /// Formats this converter can write.
    fn supported_outputs(&self) -> &'static [AudioFormat];

    /// Whether `target` can be produced.
    fn supports(&self, target: AudioFormat) -> bool {
        self.supported_outputs().contains(&target)
    }

    /// Converts `input` into `output`, choosing the target format from the
    /// output extension and using default options.
    ///
    /// Returns the verified output.
    async fn convert(&self, input: &Path, output: &Path) -> Result<MediaArtifact, AudioError>;
}
