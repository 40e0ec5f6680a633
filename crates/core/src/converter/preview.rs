//! Preview clips cut with sox.

use std::path::Path;

use crate::command::Command;
use crate::context::ToolContext;
use crate::error::AudioError;
use crate::media::{AudioFormat, MediaArtifact};

use super::pipeline::{run_conversion, sox};
use super::types::PreviewOptions;

/// Minimum distance between the clip start and the end of the track.
pub const PREVIEW_TAIL_SECS: f64 = 90.0;

const SOURCES: &[AudioFormat] = &[
    AudioFormat::Flac,
    AudioFormat::Wav,
    AudioFormat::Mp3,
    AudioFormat::Ogg,
];

const OUTPUTS: &[AudioFormat] = &[
    AudioFormat::Mp3,
    AudioFormat::Ogg,
    AudioFormat::Wav,
    AudioFormat::Flac,
];

/// sox `trim` parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimPlan {
    pub start_secs: f64,
    pub length_secs: u64,
}

/// sox `fade q` parameters. A zero fade-in means no fade-in.
#[derive(Debug, Clone, PartialEq)]
pub struct FadePlan {
    pub in_secs: f64,
    /// Stop position and fade-out length.
    pub out: Option<(u64, f64)>,
}

/// Effects to apply for one preview.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PreviewPlan {
    pub trim: Option<TrimPlan>,
    pub fade: Option<FadePlan>,
}

impl PreviewPlan {
    /// The plan as sox effect arguments.
    pub fn effects(&self) -> Vec<(&'static str, Vec<String>)> {
        let mut effects = Vec::new();
        if let Some(trim) = &self.trim {
            effects.push((
                "trim",
                vec![trim.start_secs.to_string(), format_hms(trim.length_secs)],
            ));
        }
        if let Some(fade) = &self.fade {
            let mut args = vec!["q".to_string(), fade.in_secs.to_string()];
            if let Some((stop, length)) = fade.out {
                args.push(format_hms(stop));
                args.push(length.to_string());
            }
            effects.push(("fade", args));
        }
        effects
    }
}

/// Formats whole seconds as `HH:MM:SS`.
pub fn format_hms(secs: u64) -> String {
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Decides trim and fades for a source of `duration_secs`.
///
/// A source shorter than the clip is neither trimmed nor faded, so the clip is
/// never padded with silence. A start closer than [`PREVIEW_TAIL_SECS`] to
/// the end is pulled back so the clip ends with the track.
pub fn plan_preview(duration_secs: f64, options: &PreviewOptions) -> PreviewPlan {
    if duration_secs < options.clip_secs as f64 {
        return PreviewPlan::default();
    }

    let mut start = options.start_secs;
    if duration_secs - start < PREVIEW_TAIL_SECS {
        start = (duration_secs - PREVIEW_TAIL_SECS).max(0.0);
    }

    let trim = options.trim.then(|| TrimPlan {
        start_secs: start,
        length_secs: options.clip_secs,
    });

    let fade = match (options.fade_in_secs, options.fade_out_secs) {
        (None, None) => None,
        (fade_in, fade_out) => Some(FadePlan {
            in_secs: fade_in.unwrap_or(0.0),
            out: fade_out.map(|length| (options.clip_secs, length)),
        }),
    };

    PreviewPlan { trim, fade }
}

/// Cuts stereo preview clips.
#[derive(Debug, Clone)]
pub struct PreviewClipper {
    ctx: ToolContext,
}

impl PreviewClipper {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }

    /// Source formats sox can read.
    pub fn supported_sources(&self) -> &'static [AudioFormat] {
        SOURCES
    }

    /// Writes a preview of `input` to `output`.
    ///
    /// The source format comes from the input extension and the clip format
    /// from the output extension.
    pub async fn preview(
        &self,
        input: &Path,
        output: &Path,
        options: &PreviewOptions,
    ) -> Result<MediaArtifact, AudioError> {
        options.validate()?;
        let source = AudioFormat::from_path(input)?;
        if !SOURCES.contains(&source) {
            return Err(AudioError::invalid_argument(format!(
                "cannot cut previews from {}",
                source
            )));
        }

        run_conversion(&self.ctx, input, output, source, OUTPUTS, |artifact, _| {
            let plan = plan_preview(artifact.duration_secs(), options);
            Ok(vec![self.command(input, output, &plan)?])
        })
        .await
    }

    fn command(&self, input: &Path, output: &Path, plan: &PreviewPlan) -> Result<Command, AudioError> {
        let mut sox = sox(&self.ctx);
        sox.option("-V", "4")
            .input(input)
            .option("--channels", "2")
            .output(output);
        for (name, args) in plan.effects() {
            sox.effect(name, args);
        }
        sox.compose()
    }
}
