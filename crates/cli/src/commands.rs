//! Subcommand handlers. Each returns the JSON document printed on success.

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};
use std::path::Path;

use soundsmith_core::converter::{AlacOptions, LameOptions, Mp3Encoding, Transcoder, WavConverter};
use soundsmith_core::{AudioFormat, Manipulator, MediaArtifact, TagSet, ToolContext};

use crate::args::{ArtworkCommand, Command, TagsCommand, WavToMp3Args};

pub async fn execute(command: Command, ctx: ToolContext) -> Result<Value> {
    match command {
        Command::Probe { file } => {
            let artifact = open(&file, &ctx)?.probe().await?;
            artifact_json(&artifact)
        }
        Command::Convert {
            input,
            output,
            cover: Some(cover),
        } => {
            if AudioFormat::from_path(&input)? != AudioFormat::Flac
                || AudioFormat::from_path(&output)? != AudioFormat::Alac
            {
                bail!("--cover is only supported for FLAC to ALAC (.m4a) conversion");
            }
            let options = AlacOptions { cover: Some(cover) };
            let artifact = Transcoder::new(ctx)
                .flac()
                .to_alac(&input, &output, &options)
                .await
                .with_context(|| format!("Failed to convert {}", input.display()))?;
            artifact_json(&artifact)
        }
        Command::Convert {
            input,
            output,
            cover: None,
        } => {
            let artifact = open(&input, &ctx)?
                .convert_to(&output)
                .await
                .with_context(|| format!("Failed to convert {}", input.display()))?;
            artifact_json(&artifact)
        }
        Command::Preview(args) => {
            let artifact = open(&args.input, &ctx)?
                .preview(&args.output, &args.options())
                .await
                .with_context(|| format!("Failed to cut a preview of {}", args.input.display()))?;
            artifact_json(&artifact)
        }
        Command::WavToMp3(args) => wav_to_mp3(args, ctx).await,
        Command::Tags(command) => tags(command, ctx).await,
        Command::Artwork(command) => artwork(command, ctx).await,
    }
}

fn open(path: &Path, ctx: &ToolContext) -> Result<Manipulator> {
    Manipulator::open(path, ctx.clone()).with_context(|| format!("Cannot open {}", path.display()))
}

fn artifact_json(artifact: &MediaArtifact) -> Result<Value> {
    Ok(serde_json::to_value(artifact)?)
}

fn done(file: &Path, operation: &str) -> Value {
    json!({ "file": file, "operation": operation, "status": "ok" })
}

async fn wav_to_mp3(args: WavToMp3Args, ctx: ToolContext) -> Result<Value> {
    let converter = WavConverter::new(ctx);
    let mut options = match (&args.method, args.quality) {
        (Some(method), Some(quality)) => LameOptions::new(Mp3Encoding::from_parts(method, quality)?),
        _ => converter.default_options()?,
    };
    options.resample_khz = args.resample;
    options.bitwidth = args.bitwidth;

    let artifact = converter
        .to_mp3(&args.input, &args.output, &options)
        .await
        .with_context(|| format!("Failed to encode {}", args.input.display()))?;
    artifact_json(&artifact)
}

async fn tags(command: TagsCommand, ctx: ToolContext) -> Result<Value> {
    match command {
        TagsCommand::Write { file, tags } => {
            let tags: TagSet = tags.into_iter().collect();
            let artifact = open(&file, &ctx)?
                .write_tags(&tags)
                .await
                .with_context(|| format!("Failed to write tags to {}", file.display()))?;
            artifact_json(&artifact)
        }
        TagsCommand::Remove { file, fields } => {
            open(&file, &ctx)?
                .remove_tags(&fields)
                .await
                .with_context(|| format!("Failed to remove tags from {}", file.display()))?;
            Ok(done(&file, "remove_tags"))
        }
        TagsCommand::Clear { file } => {
            open(&file, &ctx)?
                .remove_all_tags()
                .await
                .with_context(|| format!("Failed to clear tags of {}", file.display()))?;
            Ok(done(&file, "remove_all_tags"))
        }
    }
}

async fn artwork(command: ArtworkCommand, ctx: ToolContext) -> Result<Value> {
    match command {
        ArtworkCommand::Set { file, image } => {
            open(&file, &ctx)?
                .write_artwork(&image)
                .await
                .with_context(|| format!("Failed to embed {}", image.display()))?;
            Ok(done(&file, "write_artwork"))
        }
        ArtworkCommand::Remove { file } => {
            open(&file, &ctx)?
                .remove_artwork()
                .await
                .with_context(|| format!("Failed to remove artwork from {}", file.display()))?;
            Ok(done(&file, "remove_artwork"))
        }
    }
}
