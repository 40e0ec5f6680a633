//! Conversions from WAV.

use async_trait::async_trait;
use std::path::Path;

use crate::command::{Command, Tool};
use crate::context::ToolContext;
use crate::error::AudioError;
use crate::media::{AudioFormat, MediaArtifact};

use super::pipeline::{run_conversion, sox_transcode};
use super::traits::Converter;
use super::types::{LameOptions, Mp3Encoding};

const OUTPUTS: &[AudioFormat] = &[AudioFormat::Mp3, AudioFormat::Flac];

/// Encodes WAV to MP3 with lame and to FLAC with sox.
#[derive(Debug, Clone)]
pub struct WavConverter {
    ctx: ToolContext,
}

impl WavConverter {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }

    /// Encoding options from the `[encoding]` config section.
    pub fn default_options(&self) -> Result<LameOptions, AudioError> {
        let encoding = &self.ctx.config().encoding;
        Ok(LameOptions::new(Mp3Encoding::from_parts(
            &encoding.method,
            encoding.quality,
        )?))
    }

    pub async fn to_mp3(
        &self,
        input: &Path,
        output: &Path,
        options: &LameOptions,
    ) -> Result<MediaArtifact, AudioError> {
        options.validate()?;
        run_conversion(
            &self.ctx,
            input,
            output,
            AudioFormat::Wav,
            &[AudioFormat::Mp3],
            |_, _| Ok(vec![self.lame_command(input, output, options)?]),
        )
        .await
    }

    pub async fn to_flac(&self, input: &Path, output: &Path) -> Result<MediaArtifact, AudioError> {
        run_conversion(
            &self.ctx,
            input,
            output,
            AudioFormat::Wav,
            &[AudioFormat::Flac],
            |_, _| Ok(vec![sox_transcode(&self.ctx, input, output)?]),
        )
        .await
    }

    fn lame_command(
        &self,
        input: &Path,
        output: &Path,
        options: &LameOptions,
    ) -> Result<Command, AudioError> {
        let mut lame = self.ctx.command(Tool::Lame);
        lame.flag("--quiet")
            .flag("-T")
            .flag("--noreplaygain")
            .option("-q", "0");

        if let Some(khz) = options.resample_khz {
            lame.option("--resample", khz.to_string());
        }
        if let Some(bits) = options.bitwidth {
            lame.option("--bitwidth", bits.to_string());
        }

        match options.encoding {
            Mp3Encoding::Cbr(kbps) => {
                lame.flag("--cbr").option("-b", kbps.to_string());
            }
            Mp3Encoding::Abr(kbps) => {
                lame.option("--abr", kbps.to_string());
            }
            Mp3Encoding::Vbr(level) => {
                lame.flag("--vbr-new").option("-V", level.to_string());
            }
        }

        lame.input(input).output(output);
        lame.compose()
    }
}

#[async_trait]
impl Converter for WavConverter {
    fn source_format(&self) -> AudioFormat {
        AudioFormat::Wav
    }

    fn supported_outputs(&self) -> &'static [AudioFormat] {
        OUTPUTS
    }

    async fn convert(&self, input: &Path, output: &Path) -> Result<MediaArtifact, AudioError> {
        match AudioFormat::from_path(output)? {
            AudioFormat::Mp3 => self.to_mp3(input, output, &self.default_options()?).await,
            AudioFormat::Flac => self.to_flac(input, output).await,
            other => Err(AudioError::invalid_argument(format!(
                "cannot convert WAV to {}",
                other
            ))),
        }
    }
}
