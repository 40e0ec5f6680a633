//! Trait definitions for the tagger module.

use async_trait::async_trait;
use std::path::Path;
use tracing::info;

use crate::context::ToolContext;
use crate::error::AudioError;
use crate::media::{AudioFormat, MediaArtifact, TagSet};
use crate::metrics;

use super::ensure_exists;

/// Edits embedded tags and cover artwork of one format.
#[async_trait]
pub trait Tagger: Send + Sync {
    /// Format this tagger edits.
    fn format(&self) -> AudioFormat;

    fn context(&self) -> &ToolContext;

    /// Removes every tag and embedded picture.
    async fn remove_all_tags(&self, file: &Path) -> Result<(), AudioError>;

    /// Removes the named fields.
    async fn remove_tags(&self, file: &Path, fields: &[String]) -> Result<(), AudioError>;

    /// Adds the values in `tags` to whatever the file already carries.
    async fn append_tags(&self, file: &Path, tags: &TagSet) -> Result<(), AudioError>;

    /// Embeds `image` as the cover.
    async fn write_artwork(&self, file: &Path, image: &Path) -> Result<(), AudioError>;

    /// Removes all embedded pictures.
    async fn remove_artwork(&self, file: &Path) -> Result<(), AudioError>;

    /// Replaces the file's tags with `tags` and verifies the result.
    ///
    /// Existing tags are removed first. The file is then re-read and every
    /// requested field must hold exactly the requested values.
    async fn write_tags(&self, file: &Path, tags: &TagSet) -> Result<MediaArtifact, AudioError> {
        let result = async {
            ensure_exists(file).await?;
            self.remove_all_tags(file).await?;
            self.append_tags(file, tags).await?;
            self.context()
                .verifier()
                .verify_tags(file, self.format(), tags)
                .await
        }
        .await;

        metrics::TAG_WRITES
            .with_label_values(&[
                self.format().extension(),
                "write_tags",
                metrics::status_label(&result),
            ])
            .inc();
        if result.is_ok() {
            info!(file = %file.display(), fields = tags.len(), "Tags written and verified");
        }
        result
    }
}
