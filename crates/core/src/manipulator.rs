//! Per-file dispatch to the tagger and converters of its format.
//!
//! ```text
//! match AudioFormat::from_path(path) {
//!     Flac => FlacTagger, FlacConverter, PreviewClipper
//!     Mp3  => Mp3Tagger, PreviewClipper
//!     Alac => M4aTagger
//!     Wav  => WavConverter, PreviewClipper
//!     Ogg  => PreviewClipper
//! }
//! ```

use std::path::Path;

use crate::context::ToolContext;
use crate::converter::{PreviewOptions, Transcoder};
use crate::error::AudioError;
use crate::media::{AudioFile, AudioFormat, MediaArtifact, TagSet};
use crate::tagger::{tagger_for, Tagger};

/// One audio file and everything that can be done to it.
///
/// Opening never touches the file; the format is taken from the extension.
pub struct Manipulator {
    file: AudioFile,
    ctx: ToolContext,
    tagger: Option<Box<dyn Tagger>>,
    transcoder: Transcoder,
}

impl Manipulator {
    /// Fails with `InvalidArgument` when the extension is missing or unknown.
    pub fn open(path: impl AsRef<Path>, ctx: ToolContext) -> Result<Self, AudioError> {
        let file = AudioFile::new(path.as_ref())?;
        Ok(Self {
            tagger: tagger_for(file.format(), ctx.clone()),
            transcoder: Transcoder::new(ctx.clone()),
            file,
            ctx,
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn format(&self) -> AudioFormat {
        self.file.format()
    }

    pub fn can_tag(&self) -> bool {
        self.tagger.is_some()
    }

    /// Formats this file can be converted to.
    pub fn conversion_targets(&self) -> Vec<AudioFormat> {
        AudioFormat::ALL
            .into_iter()
            .filter(|target| self.transcoder.supports(self.format(), *target))
            .collect()
    }

    /// Reads and checks the file as its declared format.
    pub async fn probe(&self) -> Result<MediaArtifact, AudioError> {
        self.ctx
            .verifier()
            .validate_input(self.path(), self.format())
            .await
    }

    /// Converts into `output`, whose extension picks the target format.
    pub async fn convert_to(&self, output: &Path) -> Result<MediaArtifact, AudioError> {
        self.transcoder.convert(self.path(), output).await
    }

    pub async fn preview(
        &self,
        output: &Path,
        options: &PreviewOptions,
    ) -> Result<MediaArtifact, AudioError> {
        self.transcoder.preview(self.path(), output, options).await
    }

    pub async fn write_tags(&self, tags: &TagSet) -> Result<MediaArtifact, AudioError> {
        self.tagger()?.write_tags(self.path(), tags).await
    }

    pub async fn remove_tags(&self, fields: &[String]) -> Result<(), AudioError> {
        self.tagger()?.remove_tags(self.path(), fields).await
    }

    pub async fn remove_all_tags(&self) -> Result<(), AudioError> {
        self.tagger()?.remove_all_tags(self.path()).await
    }

    pub async fn write_artwork(&self, image: &Path) -> Result<(), AudioError> {
        self.tagger()?.write_artwork(self.path(), image).await
    }

    pub async fn remove_artwork(&self) -> Result<(), AudioError> {
        self.tagger()?.remove_artwork(self.path()).await
    }

    fn tagger(&self) -> Result<&dyn Tagger, AudioError> {
        self.tagger.as_deref().ok_or_else(|| {
            AudioError::invalid_argument(format!("{} files cannot be tagged", self.format()))
        })
    }
}

impl std::fmt::Debug for Manipulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manipulator")
            .field("file", &self.file)
            .field("can_tag", &self.can_tag())
            .finish()
    }
}
