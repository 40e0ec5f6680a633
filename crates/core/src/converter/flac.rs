//! Conversions from FLAC.

use async_trait::async_trait;
use std::path::Path;
use tracing::warn;

use crate::command::{Command, Tool};
use crate::context::ToolContext;
use crate::error::AudioError;
use crate::media::{AudioFormat, MediaArtifact};

use super::pipeline::{run_conversion, sox_transcode};
use super::traits::Converter;
use super::types::AlacOptions;

const OUTPUTS: &[AudioFormat] = &[
    AudioFormat::Mp3,
    AudioFormat::Alac,
    AudioFormat::Wav,
    AudioFormat::Ogg,
];

/// Converts FLAC to MP3, WAV and Ogg Vorbis with sox and to ALAC with ffmpeg.
#[derive(Debug, Clone)]
pub struct FlacConverter {
    ctx: ToolContext,
}

impl FlacConverter {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }

    async fn with_sox(
        &self,
        input: &Path,
        output: &Path,
        target: AudioFormat,
    ) -> Result<MediaArtifact, AudioError> {
        run_conversion(&self.ctx, input, output, AudioFormat::Flac, &[target], |_, _| {
            Ok(vec![sox_transcode(&self.ctx, input, output)?])
        })
        .await
    }

    pub async fn to_mp3(&self, input: &Path, output: &Path) -> Result<MediaArtifact, AudioError> {
        self.with_sox(input, output, AudioFormat::Mp3).await
    }

    pub async fn to_wav(&self, input: &Path, output: &Path) -> Result<MediaArtifact, AudioError> {
        self.with_sox(input, output, AudioFormat::Wav).await
    }

    pub async fn to_ogg(&self, input: &Path, output: &Path) -> Result<MediaArtifact, AudioError> {
        self.with_sox(input, output, AudioFormat::Ogg).await
    }

    /// Converts to ALAC in an `.m4a` container.
    ///
    /// Tags are carried over by ffmpeg. Source artwork with an odd width or
    /// height is dropped, since the encoder rejects it. A cover given in
    /// `options` replaces the source artwork and is embedded afterwards with
    /// AtomicParsley. The source file is never modified.
    pub async fn to_alac(
        &self,
        input: &Path,
        output: &Path,
        options: &AlacOptions,
    ) -> Result<MediaArtifact, AudioError> {
        run_conversion(
            &self.ctx,
            input,
            output,
            AudioFormat::Flac,
            &[AudioFormat::Alac],
            |source, _| self.alac_commands(source, input, output, options),
        )
        .await
    }

    fn alac_commands(
        &self,
        source: &MediaArtifact,
        input: &Path,
        output: &Path,
        options: &AlacOptions,
    ) -> Result<Vec<Command>, AudioError> {
        let mut ffmpeg = self.ctx.command(Tool::Ffmpeg);
        ffmpeg.flag("-y").input(input);

        match source.artwork() {
            Some(_) if options.cover.is_some() => {
                ffmpeg.flag("-vn");
            }
            Some(artwork) if !artwork.has_even_dimensions() => {
                warn!(
                    input = %input.display(),
                    width = ?artwork.width,
                    height = ?artwork.height,
                    "Dropping embedded artwork with odd dimensions"
                );
                ffmpeg.flag("-vn");
            }
            Some(_) => {
                ffmpeg.option("-c:v", "copy");
            }
            None => {}
        }
        ffmpeg.option("-acodec", "alac").output(output);

        let mut commands = vec![ffmpeg.compose()?];

        if let Some(cover) = &options.cover {
            if !cover.is_file() {
                return Err(AudioError::invalid_input(cover, "cover image does not exist"));
            }
            let mut atomic_parsley = self.ctx.command(Tool::AtomicParsley);
            atomic_parsley
                .input(output)
                .import_picture(cover)
                .flag("--overWrite");
            commands.push(atomic_parsley.compose()?);
        }

        Ok(commands)
    }
}

#[async_trait]
impl Converter for FlacConverter {
    fn source_format(&self) -> AudioFormat {
        AudioFormat::Flac
    }

    fn supported_outputs(&self) -> &'static [AudioFormat] {
        OUTPUTS
    }

    async fn convert(&self, input: &Path, output: &Path) -> Result<MediaArtifact, AudioError> {
        match AudioFormat::from_path(output)? {
            AudioFormat::Mp3 => self.to_mp3(input, output).await,
            AudioFormat::Wav => self.to_wav(input, output).await,
            AudioFormat::Ogg => self.to_ogg(input, output).await,
            AudioFormat::Alac => self.to_alac(input, output, &AlacOptions::default()).await,
            AudioFormat::Flac => Err(AudioError::invalid_argument(
                "FLAC to FLAC is not a conversion",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::ArtworkInfo;
    use crate::testing::{fixtures, MockOutcome, MockRunner, MockMetadataReader};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Harness {
        dir: TempDir,
        runner: Arc<MockRunner>,
        reader: Arc<MockMetadataReader>,
        converter: FlacConverter,
    }

    fn harness() -> Harness {
        let dir = TempDir::new().unwrap();
        let (ctx, runner, reader) = fixtures::mock_context();
        Harness {
            dir,
            runner,
            reader,
            converter: FlacConverter::new(ctx),
        }
    }

    #[tokio::test]
    async fn test_to_mp3_runs_sox_and_verifies() {
        let h = harness();
        let input = fixtures::touch(h.dir.path(), "in.flac");
        let output = h.dir.path().join("out").join("track.mp3");

        let artifact = h.converter.to_mp3(&input, &output).await.unwrap();
        assert_eq!(artifact.format(), AudioFormat::Mp3);
        assert_eq!(artifact.path(), output);

        let commands = h.runner.recorded_commands().await;
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].tool(), Tool::Sox);
        assert_eq!(
            commands[0].argv(),
            [
                "--single-threaded".into(),
                input.clone().into_os_string(),
                output.clone().into_os_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_input_runs_nothing() {
        let h = harness();
        let input = h.dir.path().join("missing.flac");
        let output = h.dir.path().join("out.wav");

        let err = h.converter.to_wav(&input, &output).await.unwrap_err();
        assert!(matches!(err, AudioError::InvalidInput { .. }));
        assert_eq!(h.runner.command_count().await, 0);
    }

    #[tokio::test]
    async fn test_input_with_wrong_codec_is_invalid() {
        let h = harness();
        let input = fixtures::touch(h.dir.path(), "fake.flac");
        h.reader
            .set_metadata(&input, fixtures::metadata_for(AudioFormat::Mp3))
            .await;

        let err = h
            .converter
            .to_ogg(&input, &h.dir.path().join("out.ogg"))
            .await
            .unwrap_err();
        assert!(matches!(err, AudioError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_output_extension_must_match_method() {
        let h = harness();
        let input = fixtures::touch(h.dir.path(), "in.flac");

        let err = h
            .converter
            .to_mp3(&input, &h.dir.path().join("out.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, AudioError::InvalidArgument { .. }));

        let err = h
            .converter
            .convert(&input, &h.dir.path().join("out.aiff"))
            .await
            .unwrap_err();
        assert!(matches!(err, AudioError::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn test_exit_zero_with_garbage_output_fails_validation() {
        let h = harness();
        let input = fixtures::touch(h.dir.path(), "in.flac");
        let output = h.dir.path().join("out.mp3");
        h.reader.set_failure(&output, "Invalid data found").await;

        let err = h.converter.to_mp3(&input, &output).await.unwrap_err();
        assert!(matches!(err, AudioError::ValidationFailed { .. }));
    }

    #[tokio::test]
    async fn test_process_failure_surfaces() {
        let h = harness();
        let input = fixtures::touch(h.dir.path(), "in.flac");
        h.runner
            .push_outcome(MockOutcome::Exit {
                code: 2,
                stderr: "sox FAIL formats".to_string(),
            })
            .await;

        let err = h
            .converter
            .to_wav(&input, &h.dir.path().join("out.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, AudioError::ProcessFailed { .. }));
        assert!(err.to_string().contains("sox FAIL formats"));
    }

    #[tokio::test]
    async fn test_alac_drops_odd_artwork() {
        let h = harness();
        let input = fixtures::touch(h.dir.path(), "in.flac");
        let mut metadata = fixtures::metadata_for(AudioFormat::Flac);
        metadata.artwork = Some(ArtworkInfo {
            codec: Some("mjpeg".to_string()),
            width: Some(1419),
            height: Some(1419),
        });
        h.reader.set_metadata(&input, metadata).await;

        let output = h.dir.path().join("out.m4a");
        h.converter
            .to_alac(&input, &output, &AlacOptions::default())
            .await
            .unwrap();

        let commands = h.runner.recorded_commands().await;
        let argv = commands[0].argv();
        assert!(argv.contains(&"-vn".into()));
        assert!(!argv.contains(&"copy".into()));
        assert_eq!(
            argv[argv.len() - 3..],
            ["-acodec".into(), "alac".into(), output.into_os_string()]
        );
    }

    #[tokio::test]
    async fn test_alac_keeps_even_artwork() {
        let h = harness();
        let input = fixtures::touch(h.dir.path(), "in.flac");
        let mut metadata = fixtures::metadata_for(AudioFormat::Flac);
        metadata.artwork = Some(ArtworkInfo {
            codec: Some("png".to_string()),
            width: Some(1000),
            height: Some(1000),
        });
        h.reader.set_metadata(&input, metadata).await;

        h.converter
            .to_alac(&input, &h.dir.path().join("out.m4a"), &AlacOptions::default())
            .await
            .unwrap();

        let argv = h.runner.recorded_commands().await[0].argv();
        assert!(!argv.contains(&"-vn".into()));
        assert!(argv.windows(2).any(|w| w == ["-c:v", "copy"]));
    }

    #[tokio::test]
    async fn test_alac_embeds_cover_with_atomic_parsley() {
        let h = harness();
        let input = fixtures::touch(h.dir.path(), "in.flac");
        let cover = fixtures::touch(h.dir.path(), "cover.jpg");
        let output = h.dir.path().join("out.m4a");

        let options = AlacOptions {
            cover: Some(cover.clone()),
        };
        h.converter.to_alac(&input, &output, &options).await.unwrap();

        let commands = h.runner.recorded_commands().await;
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[1].tool(), Tool::AtomicParsley);
        assert_eq!(
            commands[1].argv(),
            [
                output.into_os_string(),
                "--artwork".into(),
                cover.into_os_string(),
                "--overWrite".into()
            ]
        );
    }

    #[tokio::test]
    async fn test_alac_missing_cover_is_invalid_input() {
        let h = harness();
        let input = fixtures::touch(h.dir.path(), "in.flac");
        let options = AlacOptions {
            cover: Some(h.dir.path().join("nope.jpg")),
        };

        let err = h
            .converter
            .to_alac(&input, &h.dir.path().join("out.m4a"), &options)
            .await
            .unwrap_err();
        assert!(matches!(err, AudioError::InvalidInput { .. }));
        assert_eq!(h.runner.command_count().await, 0);
    }

    #[tokio::test]
    async fn test_cover_failure_is_not_swallowed() {
        let h = harness();
        let input = fixtures::touch(h.dir.path(), "in.flac");
        let cover = fixtures::touch(h.dir.path(), "cover.jpg");
        h.runner
            .set_tool_outcome(
                Tool::AtomicParsley,
                MockOutcome::Exit {
                    code: 1,
                    stderr: "AtomicParsley error: bad image".to_string(),
                },
            )
            .await;

        let result = h
            .converter
            .to_alac(&input, &h.dir.path().join("out.m4a"), &AlacOptions { cover: Some(cover) })
            .await;
        assert!(matches!(result, Err(AudioError::ProcessFailed { .. })));
    }

    #[tokio::test]
    async fn test_convert_dispatches_on_extension() {
        let h = harness();
        let input = fixtures::touch(h.dir.path(), "in.flac");

        let artifact = h
            .converter
            .convert(&input, &h.dir.path().join("out.ogg"))
            .await
            .unwrap();
        assert_eq!(artifact.format(), AudioFormat::Ogg);
        assert!(h.converter.supports(AudioFormat::Alac));
        assert!(!h.converter.supports(AudioFormat::Flac));
    }
}
