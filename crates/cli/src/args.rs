//! Command-line arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use soundsmith_core::converter::PreviewOptions;

#[derive(Debug, Parser)]
#[command(name = "soundsmith", version, about = "Convert, clip and tag audio files with verified results")]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, short, global = true, env = "SOUNDSMITH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print metrics in Prometheus text format to stderr before exiting
    #[arg(long, global = true)]
    pub print_metrics: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Read and check a file's metadata
    Probe { file: PathBuf },

    /// Convert a file; the output extension picks the format
    Convert {
        input: PathBuf,
        output: PathBuf,
        /// Cover image to embed (FLAC to ALAC only)
        #[arg(long)]
        cover: Option<PathBuf>,
    },

    /// Cut a preview clip
    Preview(PreviewArgs),

    /// Encode WAV to MP3 with lame
    WavToMp3(WavToMp3Args),

    /// Edit tags
    #[command(subcommand)]
    Tags(TagsCommand),

    /// Edit cover artwork
    #[command(subcommand)]
    Artwork(ArtworkCommand),
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Clip start in seconds
    #[arg(long, default_value_t = 0.0)]
    pub start: f64,
    /// Clip length in seconds
    #[arg(long, default_value_t = PreviewOptions::DEFAULT_CLIP_SECS)]
    pub length: u64,
    /// Cut the source down to the clip
    #[arg(long)]
    pub trim: bool,
    /// Fade in, optionally for SECS seconds
    #[arg(long, value_name = "SECS", num_args = 0..=1, default_missing_value = "6")]
    pub fade_in: Option<f64>,
    /// Fade out, optionally for SECS seconds
    #[arg(long, value_name = "SECS", num_args = 0..=1, default_missing_value = "6")]
    pub fade_out: Option<f64>,
}

impl PreviewArgs {
    pub fn options(&self) -> PreviewOptions {
        PreviewOptions {
            start_secs: self.start,
            trim: self.trim,
            clip_secs: self.length,
            fade_in_secs: self.fade_in,
            fade_out_secs: self.fade_out,
        }
    }
}

#[derive(Debug, Args)]
pub struct WavToMp3Args {
    pub input: PathBuf,
    pub output: PathBuf,
    /// cbr, abr or vbr (default from configuration)
    #[arg(long, requires = "quality")]
    pub method: Option<String>,
    /// Bitrate in kbps for cbr/abr, 0-9 for vbr
    #[arg(long, requires = "method")]
    pub quality: Option<u32>,
    /// Output sample rate in kHz
    #[arg(long)]
    pub resample: Option<f64>,
    /// Input bit width
    #[arg(long)]
    pub bitwidth: Option<u8>,
}

#[derive(Debug, Subcommand)]
pub enum TagsCommand {
    /// Replace all tags; repeat a field to give it several values
    Write {
        file: PathBuf,
        #[arg(required = true, value_name = "FIELD=VALUE", value_parser = parse_tag)]
        tags: Vec<(String, String)>,
    },
    /// Remove the named fields
    Remove {
        file: PathBuf,
        #[arg(required = true)]
        fields: Vec<String>,
    },
    /// Remove every tag
    Clear { file: PathBuf },
}

#[derive(Debug, Subcommand)]
pub enum ArtworkCommand {
    /// Embed an image as the cover
    Set { file: PathBuf, image: PathBuf },
    /// Remove embedded pictures
    Remove { file: PathBuf },
}

fn parse_tag(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.to_string(), value.to_string()))
        }
        _ => Err(format!("expected FIELD=VALUE, got \"{}\"", s)),
    }
}
