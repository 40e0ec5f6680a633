use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::command::Tool;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub process: ProcessConfig,
    #[serde(default)]
    pub encoding: EncodingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Paths of the external binaries. Bare names are resolved through `PATH`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default = "default_sox")]
    pub sox: PathBuf,
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: PathBuf,
    #[serde(default = "default_ffprobe")]
    pub ffprobe: PathBuf,
    #[serde(default = "default_lame")]
    pub lame: PathBuf,
    #[serde(default = "default_metaflac")]
    pub metaflac: PathBuf,
    #[serde(default = "default_atomic_parsley")]
    pub atomic_parsley: PathBuf,
}

impl ToolsConfig {
    /// Configured executable for a tool.
    pub fn program(&self, tool: Tool) -> &Path {
        match tool {
            Tool::Sox => &self.sox,
            Tool::Ffmpeg => &self.ffmpeg,
            Tool::Ffprobe => &self.ffprobe,
            Tool::Lame => &self.lame,
            Tool::Metaflac => &self.metaflac,
            Tool::AtomicParsley => &self.atomic_parsley,
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            sox: default_sox(),
            ffmpeg: default_ffmpeg(),
            ffprobe: default_ffprobe(),
            lame: default_lame(),
            metaflac: default_metaflac(),
            atomic_parsley: default_atomic_parsley(),
        }
    }
}

fn default_sox() -> PathBuf {
    PathBuf::from(Tool::Sox.default_program())
}

fn default_ffmpeg() -> PathBuf {
    PathBuf::from(Tool::Ffmpeg.default_program())
}

fn default_ffprobe() -> PathBuf {
    PathBuf::from(Tool::Ffprobe.default_program())
}

fn default_lame() -> PathBuf {
    PathBuf::from(Tool::Lame.default_program())
}

fn default_metaflac() -> PathBuf {
    PathBuf::from(Tool::Metaflac.default_program())
}

fn default_atomic_parsley() -> PathBuf {
    PathBuf::from(Tool::AtomicParsley.default_program())
}

/// Child process settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProcessConfig {
    /// Seconds before a tool is killed.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Value forced into `LC_ALL` and `LANG`. Must be a UTF-8 locale.
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Pass `--single-threaded` to sox.
    #[serde(default = "default_true")]
    pub sox_single_threaded: bool,
}

impl ProcessConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            locale: default_locale(),
            sox_single_threaded: true,
        }
    }
}

fn default_timeout_secs() -> u64 {
    600
}

fn default_locale() -> String {
    "C.UTF-8".to_string()
}

fn default_true() -> bool {
    true
}

/// Defaults for WAV to MP3 encoding
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EncodingConfig {
    /// "cbr", "abr" or "vbr".
    #[serde(default = "default_method")]
    pub method: String,
    /// Bitrate in kbps for cbr/abr, quality 0-9 for vbr.
    #[serde(default = "default_quality")]
    pub quality: u32,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            method: default_method(),
            quality: default_quality(),
        }
    }
}

fn default_method() -> String {
    "vbr".to_string()
}

fn default_quality() -> u32 {
    2
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

fn default_filter() -> String {
    "info".to_string()
}
