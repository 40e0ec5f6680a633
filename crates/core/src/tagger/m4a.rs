//! ALAC (`.m4a`) tagging with AtomicParsley.

use async_trait::async_trait;
use std::path::Path;

use crate::command::{CommandBuilder, Tool};
use crate::context::ToolContext;
use crate::error::AudioError;
use crate::media::{AudioFormat, TagSet};

use super::traits::Tagger;
use super::{ensure_exists, record};

/// Edits iTunes atoms with `AtomicParsley FILE ... --overWrite`.
///
/// Only fields with an iTunes atom can be written; anything else fails with
/// `InvalidArgument` before the tool runs.
#[derive(Debug, Clone)]
pub struct M4aTagger {
    ctx: ToolContext,
}

impl M4aTagger {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }

    async fn edit<F>(&self, operation: &str, file: &Path, configure: F) -> Result<(), AudioError>
    where
        F: FnOnce(&mut CommandBuilder) + Send,
    {
        let result = async {
            ensure_exists(file).await?;
            let mut parsley = self.ctx.command(Tool::AtomicParsley);
            parsley.input(file);
            configure(&mut parsley);
            parsley.flag("--overWrite");
            self.ctx.execute(&parsley.compose()?).await?;
            Ok(())
        }
        .await;
        record(AudioFormat::Alac, operation, &result);
        result
    }
}

#[async_trait]
impl Tagger for M4aTagger {
    fn format(&self) -> AudioFormat {
        AudioFormat::Alac
    }

    fn context(&self) -> &ToolContext {
        &self.ctx
    }

    /// `--metaEnema` drops every metadata atom, `covr` included.
    async fn remove_all_tags(&self, file: &Path) -> Result<(), AudioError> {
        self.edit("remove_all_tags", file, |parsley| {
            parsley.remove_all();
        })
        .await
    }

    async fn remove_tags(&self, file: &Path, fields: &[String]) -> Result<(), AudioError> {
        if fields.is_empty() {
            return ensure_exists(file).await;
        }
        self.edit("remove_tags", file, |parsley| {
            parsley.remove_fields(fields);
        })
        .await
    }

    async fn append_tags(&self, file: &Path, tags: &TagSet) -> Result<(), AudioError> {
        if tags.is_empty() {
            return ensure_exists(file).await;
        }
        self.edit("append_tags", file, |parsley| {
            parsley.add_tags(tags);
        })
        .await
    }

    async fn write_artwork(&self, file: &Path, image: &Path) -> Result<(), AudioError> {
        ensure_exists(image).await?;
        self.edit("write_artwork", file, |parsley| {
            parsley.import_picture(image);
        })
        .await
    }

    async fn remove_artwork(&self, file: &Path) -> Result<(), AudioError> {
        self.edit("remove_artwork", file, |parsley| {
            parsley.remove_pictures();
        })
        .await
    }
}
