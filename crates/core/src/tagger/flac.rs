//! FLAC tagging with metaflac.

use async_trait::async_trait;
use std::path::Path;

use crate::command::{CommandBuilder, Tool};
use crate::context::ToolContext;
use crate::error::AudioError;
use crate::media::{AudioFormat, TagSet};

use super::traits::Tagger;
use super::{ensure_exists, record};

/// Edits Vorbis comments and picture blocks in place.
///
/// Repeated fields are written as repeated comments, so multi-valued tags
/// survive exactly.
#[derive(Debug, Clone)]
pub struct FlacTagger {
    ctx: ToolContext,
}

impl FlacTagger {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }

    async fn edit<F>(&self, operation: &str, file: &Path, configure: F) -> Result<(), AudioError>
    where
        F: FnOnce(&mut CommandBuilder) + Send,
    {
        let result = async {
            ensure_exists(file).await?;
            let mut metaflac = self.ctx.command(Tool::Metaflac);
            metaflac.input(file);
            configure(&mut metaflac);
            self.ctx.execute(&metaflac.compose()?).await?;
            Ok(())
        }
        .await;
        record(AudioFormat::Flac, operation, &result);
        result
    }
}

#[async_trait]
impl Tagger for FlacTagger {
    fn format(&self) -> AudioFormat {
        AudioFormat::Flac
    }

    fn context(&self) -> &ToolContext {
        &self.ctx
    }

    /// `--remove-all` also drops picture blocks.
    async fn remove_all_tags(&self, file: &Path) -> Result<(), AudioError> {
        self.edit("remove_all_tags", file, |metaflac| {
            metaflac.remove_all();
        })
        .await
    }

    async fn remove_tags(&self, file: &Path, fields: &[String]) -> Result<(), AudioError> {
        if fields.is_empty() {
            return ensure_exists(file).await;
        }
        self.edit("remove_tags", file, |metaflac| {
            metaflac.remove_fields(fields);
        })
        .await
    }

    async fn append_tags(&self, file: &Path, tags: &TagSet) -> Result<(), AudioError> {
        if tags.is_empty() {
            return ensure_exists(file).await;
        }
        self.edit("append_tags", file, |metaflac| {
            metaflac.add_tags(tags);
        })
        .await
    }

    async fn write_artwork(&self, file: &Path, image: &Path) -> Result<(), AudioError> {
        ensure_exists(image).await?;
        self.edit("write_artwork", file, |metaflac| {
            metaflac.import_picture(image);
        })
        .await
    }

    async fn remove_artwork(&self, file: &Path) -> Result<(), AudioError> {
        self.edit("remove_artwork", file, |metaflac| {
            metaflac.remove_pictures();
        })
        .await
    }
}
