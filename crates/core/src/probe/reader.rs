//! Metadata reader backed by ffprobe and metaflac.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::command::{Command, CommandBuilder, Tool};
use crate::error::AudioError;
use crate::media::{ArtifactMetadata, ArtworkInfo, AudioFormat, TagSet};
use crate::process::{ExecutionResult, Executor};

use super::traits::MetadataReader;

/// Reads metadata with `ffprobe -print_format json`.
///
/// ffprobe flattens Vorbis comments, so for FLAC files the tag set is taken
/// from `metaflac --export-tags-to=-` instead, which keeps every value of a
/// repeated field.
#[derive(Debug, Clone)]
pub struct ToolMetadataReader {
    executor: Executor,
    ffprobe: PathBuf,
    metaflac: PathBuf,
}

impl ToolMetadataReader {
    pub fn new(executor: Executor, ffprobe: impl Into<PathBuf>, metaflac: impl Into<PathBuf>) -> Self {
        Self {
            executor,
            ffprobe: ffprobe.into(),
            metaflac: metaflac.into(),
        }
    }

    fn probe_command(&self, path: &Path) -> Result<Command, AudioError> {
        let mut ffprobe = CommandBuilder::new(Tool::Ffprobe, &self.ffprobe);
        ffprobe
            .option("-v", "quiet")
            .option("-print_format", "json")
            .flag("-show_format")
            .flag("-show_streams")
            .input(path);
        ffprobe.compose()
    }

    fn export_tags_command(&self, path: &Path) -> Result<Command, AudioError> {
        let mut metaflac = CommandBuilder::new(Tool::Metaflac, &self.metaflac);
        metaflac
            .flag("--no-utf8-convert")
            .option("--export-tags-to", "-")
            .input(path);
        metaflac.compose()
    }

    async fn run(&self, path: &Path, command: &Command) -> Result<ExecutionResult, AudioError> {
        self.executor.execute(command).await.map_err(|e| match e {
            AudioError::ProcessFailed { result, .. } => AudioError::probe_failed(
                path,
                format!(
                    "{} exited with code {:?}: {}",
                    command.tool(),
                    result.exit_code(),
                    result.stderr().trim()
                ),
            ),
            other => other,
        })
    }
}

#[async_trait]
impl MetadataReader for ToolMetadataReader {
    fn name(&self) -> &str {
        "ffprobe"
    }

    async fn read(&self, path: &Path) -> Result<ArtifactMetadata, AudioError> {
        if tokio::fs::metadata(path).await.is_err() {
            return Err(AudioError::probe_failed(path, "file does not exist"));
        }

        let probed = self.run(path, &self.probe_command(path)?).await?;
        let mut metadata = parse_probe_output(path, probed.stdout())?;

        if AudioFormat::Flac.matches(&metadata) {
            let exported = self.run(path, &self.export_tags_command(path)?).await?;
            metadata.tags = parse_exported_tags(exported.stdout());
        }

        debug!(
            path = %path.display(),
            container = %metadata.container,
            codec = ?metadata.codec,
            tags = metadata.tags.len(),
            "Read metadata"
        );
        Ok(metadata)
    }
}

#[derive(Deserialize)]
struct ProbeOutput {
    format: ProbeFormat,
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Deserialize)]
struct ProbeFormat {
    format_name: String,
    duration: Option<String>,
    bit_rate: Option<String>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u8>,
    bit_rate: Option<String>,
    duration: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    #[serde(default)]
    disposition: ProbeDisposition,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

#[derive(Deserialize, Default)]
struct ProbeDisposition {
    #[serde(default)]
    attached_pic: u8,
}

/// Parses ffprobe JSON output into ArtifactMetadata.
pub(crate) fn parse_probe_output(path: &Path, output: &str) -> Result<ArtifactMetadata, AudioError> {
    let probe: ProbeOutput = serde_json::from_str(output).map_err(|e| {
        AudioError::probe_failed(path, format!("Failed to parse ffprobe output: {}", e))
    })?;

    let audio = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"));

    // Cover art shows up as a video stream, normally flagged as attached picture.
    let videos = || {
        probe
            .streams
            .iter()
            .filter(|s| s.codec_type.as_deref() == Some("video"))
    };
    let picture = videos()
        .find(|s| s.disposition.attached_pic == 1)
        .or_else(|| videos().next());

    let duration_secs = probe
        .format
        .duration
        .as_deref()
        .or_else(|| audio.and_then(|s| s.duration.as_deref()))
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    let bitrate_kbps = audio
        .and_then(|s| s.bit_rate.as_deref())
        .or(probe.format.bit_rate.as_deref())
        .and_then(|b| b.parse::<u32>().ok())
        .map(|b| b / 1000);

    // Format-level tags win; Ogg keeps its comments on the audio stream.
    let mut tags = TagSet::new();
    for (key, value) in &probe.format.tags {
        tags.add_joined(key, value);
    }
    if let Some(stream) = audio {
        for (key, value) in &stream.tags {
            if !tags.contains(key) {
                tags.add_joined(key, value);
            }
        }
    }

    Ok(ArtifactMetadata {
        container: probe.format.format_name,
        codec: audio.and_then(|s| s.codec_name.clone()),
        duration_secs,
        sample_rate: audio
            .and_then(|s| s.sample_rate.as_deref())
            .and_then(|r| r.parse::<u32>().ok()),
        channels: audio.and_then(|s| s.channels),
        bitrate_kbps,
        tags,
        artwork: picture.map(|s| ArtworkInfo {
            codec: s.codec_name.clone(),
            width: s.width,
            height: s.height,
        }),
    })
}

/// Parses `metaflac --export-tags-to=-` output (`NAME=value` per line).
///
/// Lines without `=` continue the previous value, which is how multi-line
/// comments are exported.
pub(crate) fn parse_exported_tags(output: &str) -> TagSet {
    let mut entries: Vec<(String, String)> = Vec::new();
    for line in output.lines() {
        match line.split_once('=') {
            Some((name, value)) if !name.is_empty() => {
                entries.push((name.to_string(), value.to_string()));
            }
            _ => {
                if let Some((_, value)) = entries.last_mut() {
                    value.push('\n');
                    value.push_str(line);
                }
            }
        }
    }
    entries.into_iter().collect()
}
