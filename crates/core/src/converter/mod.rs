//! Converter module for transcoding audio files.
//!
//! Every conversion follows the same stages: the input is validated as its
//! declared format, the tool command is composed, executed, and the output is
//! re-read and verified before a [`MediaArtifact`](crate::media::MediaArtifact)
//! is returned.
//!
//! # Features
//!
//! - FLAC to MP3, WAV and Ogg Vorbis (sox) and to ALAC (ffmpeg, with optional
//!   cover embedding through AtomicParsley)
//! - WAV to MP3 (lame, CBR/ABR/VBR) and to FLAC (sox)
//! - Preview clips with trim and fades (sox)
//!
//! # Example
//!
//! ```ignore
//! use soundsmith_core::config::Config;
//! use soundsmith_core::context::ToolContext;
//! use soundsmith_core::converter::{PreviewOptions, Transcoder};
//!
//! let transcoder = Transcoder::new(ToolContext::system(Config::default())?);
//!
//! let artifact = transcoder
//!     .convert(Path::new("/music/track.flac"), Path::new("/out/track.mp3"))
//!     .await?;
//! println!("{} seconds", artifact.duration_secs());
//!
//! let options = PreviewOptions {
//!     trim: true,
//!     start_secs: 30.0,
//!     fade_in_secs: Some(6.0),
//!     fade_out_secs: Some(6.0),
//!     ..Default::default()
//! };
//! transcoder
//!     .preview(Path::new("/music/track.flac"), Path::new("/out/preview.mp3"), &options)
//!     .await?;
//! ```

mod flac;
mod pipeline;
mod preview;
mod traits;
mod transcoder;
mod types;
mod wav;

pub use flac::FlacConverter;
pub use preview::{format_hms, plan_preview, FadePlan, PreviewClipper, PreviewPlan, TrimPlan, PREVIEW_TAIL_SECS};
pub use traits::Converter;
pub use transcoder::Transcoder;
pub use types::{AlacOptions, ConversionStage, LameOptions, Mp3Encoding, Mp3Method, PreviewOptions};
pub use wav::WavConverter;
