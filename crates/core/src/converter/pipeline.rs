//! The validate, compose, execute, verify sequence shared by all converters.

use std::path::Path;
use tracing::{debug, info, warn};

use crate::command::{Command, CommandBuilder, Tool};
use crate::context::ToolContext;
use crate::error::AudioError;
use crate::media::{AudioFormat, MediaArtifact};
use crate::metrics;

use super::types::ConversionStage;

/// A sox builder with the configured global flags.
pub(crate) fn sox(ctx: &ToolContext) -> CommandBuilder {
    let mut sox = ctx.command(Tool::Sox);
    if ctx.config().process.sox_single_threaded {
        sox.flag("--single-threaded");
    }
    sox
}

/// `sox IN OUT`, letting sox pick the encoder from the output extension.
pub(crate) fn sox_transcode(ctx: &ToolContext, input: &Path, output: &Path) -> Result<Command, AudioError> {
    let mut sox = sox(ctx);
    sox.input(input).output(output);
    sox.compose()
}

fn stage(stage: ConversionStage, input: &Path, output: &Path) {
    debug!(
        stage = %stage,
        input = %input.display(),
        output = %output.display(),
        "Conversion stage"
    );
}

/// Runs one conversion.
///
/// `compose` receives the validated input and the target format and returns
/// the commands to run in order. The output is verified once all of them
/// succeed. Partial outputs of a failed run are left in place.
pub(crate) async fn run_conversion<F>(
    ctx: &ToolContext,
    input: &Path,
    output: &Path,
    source: AudioFormat,
    supported: &[AudioFormat],
    compose: F,
) -> Result<MediaArtifact, AudioError>
where
    F: FnOnce(&MediaArtifact, AudioFormat) -> Result<Vec<Command>, AudioError> + Send,
{
    let target_label = output
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("none")
        .to_ascii_lowercase();

    let result = convert(ctx, input, output, source, supported, compose).await;

    metrics::CONVERSIONS
        .with_label_values(&[source.extension(), &target_label, metrics::status_label(&result)])
        .inc();

    match &result {
        Ok(artifact) => {
            stage(ConversionStage::Done, input, output);
            info!(
                input = %input.display(),
                output = %output.display(),
                format = %artifact.format(),
                duration_secs = artifact.duration_secs(),
                "Conversion complete"
            );
        }
        Err(e) => {
            stage(ConversionStage::Failed, input, output);
            warn!(
                input = %input.display(),
                output = %output.display(),
                error = %e,
                "Conversion failed"
            );
        }
    }
    result
}

async fn convert<F>(
    ctx: &ToolContext,
    input: &Path,
    output: &Path,
    source: AudioFormat,
    supported: &[AudioFormat],
    compose: F,
) -> Result<MediaArtifact, AudioError>
where
    F: FnOnce(&MediaArtifact, AudioFormat) -> Result<Vec<Command>, AudioError> + Send,
{
    stage(ConversionStage::Validating, input, output);
    let target = AudioFormat::from_path(output)?;
    if !supported.contains(&target) {
        return Err(AudioError::invalid_argument(format!(
            "cannot convert {} to {}",
            source, target
        )));
    }
    let verifier = ctx.verifier();
    let source_artifact = verifier.validate_input(input, source).await?;

    stage(ConversionStage::Composing, input, output);
    let commands = compose(&source_artifact, target)?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    stage(ConversionStage::Executing, input, output);
    for command in &commands {
        ctx.execute(command).await?;
    }

    stage(ConversionStage::Verifying, input, output);
    verifier.verify(output, target).await
}
