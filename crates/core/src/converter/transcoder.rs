//! Conversion dispatch on the (source, target) format pair.

use std::path::Path;

use crate::context::ToolContext;
use crate::error::AudioError;
use crate::media::{AudioFormat, MediaArtifact};

use super::flac::FlacConverter;
use super::preview::PreviewClipper;
use super::traits::Converter;
use super::types::PreviewOptions;
use super::wav::WavConverter;

/// Picks the converter for a pair of paths by their extensions.
#[derive(Debug, Clone)]
pub struct Transcoder {
    flac: FlacConverter,
    wav: WavConverter,
    clipper: PreviewClipper,
}

impl Transcoder {
    pub fn new(ctx: ToolContext) -> Self {
        Self {
            flac: FlacConverter::new(ctx.clone()),
            wav: WavConverter::new(ctx.clone()),
            clipper: PreviewClipper::new(ctx),
        }
    }

    /// The converter reading `source`, if there is one.
    pub fn converter_for(&self, source: AudioFormat) -> Option<&dyn Converter> {
        match source {
            AudioFormat::Flac => Some(&self.flac),
            AudioFormat::Wav => Some(&self.wav),
            _ => None,
        }
    }

    /// Whether `source` can be converted to `target`.
    pub fn supports(&self, source: AudioFormat, target: AudioFormat) -> bool {
        self.converter_for(source)
            .is_some_and(|converter| converter.supports(target))
    }

    /// Converts `input` to the format implied by `output`.
    pub async fn convert(&self, input: &Path, output: &Path) -> Result<MediaArtifact, AudioError> {
        let source = AudioFormat::from_path(input)?;
        let target = AudioFormat::from_path(output)?;

        match self.converter_for(source) {
            Some(converter) if converter.supports(target) => converter.convert(input, output).await,
            _ => Err(AudioError::invalid_argument(format!(
                "no conversion from {} to {}",
                source, target
            ))),
        }
    }

    /// Cuts a preview clip of `input` into `output`.
    pub async fn preview(
        &self,
        input: &Path,
        output: &Path,
        options: &PreviewOptions,
    ) -> Result<MediaArtifact, AudioError> {
        self.clipper.preview(input, output, options).await
    }

    pub fn flac(&self) -> &FlacConverter {
        &self.flac
    }

    pub fn wav(&self) -> &WavConverter {
        &self.wav
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Tool;
    use crate::testing::fixtures;
    use tempfile::TempDir;

    #[test]
    fn test_supported_pairs() {
        let (ctx, _, _) = fixtures::mock_context();
        let transcoder = Transcoder::new(ctx);

        assert!(transcoder.supports(AudioFormat::Flac, AudioFormat::Mp3));
        assert!(transcoder.supports(AudioFormat::Flac, AudioFormat::Alac));
        assert!(transcoder.supports(AudioFormat::Wav, AudioFormat::Flac));
        assert!(!transcoder.supports(AudioFormat::Wav, AudioFormat::Alac));
        assert!(!transcoder.supports(AudioFormat::Mp3, AudioFormat::Flac));
    }

    #[tokio::test]
    async fn test_convert_dispatches() {
        let dir = TempDir::new().unwrap();
        let (ctx, runner, _) = fixtures::mock_context();
        let transcoder = Transcoder::new(ctx);

        let input = fixtures::touch(dir.path(), "in.wav");
        transcoder
            .convert(&input, &dir.path().join("out.mp3"))
            .await
            .unwrap();
        let input = fixtures::touch(dir.path(), "in.flac");
        transcoder
            .convert(&input, &dir.path().join("out.m4a"))
            .await
            .unwrap();

        let tools: Vec<Tool> = runner
            .recorded_commands()
            .await
            .iter()
            .map(|c| c.tool())
            .collect();
        assert_eq!(tools, [Tool::Lame, Tool::Ffmpeg]);
    }

    #[tokio::test]
    async fn test_unsupported_pair() {
        let dir = TempDir::new().unwrap();
        let (ctx, runner, _) = fixtures::mock_context();
        let input = fixtures::touch(dir.path(), "in.mp3");

        let err = Transcoder::new(ctx)
            .convert(&input, &dir.path().join("out.flac"))
            .await
            .unwrap_err();
        assert!(matches!(err, AudioError::InvalidArgument { .. }));
        assert_eq!(runner.command_count().await, 0);
    }
}
