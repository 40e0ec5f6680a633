//! Argument grammars of the wrapped tools.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;

use crate::error::AudioError;
use crate::media::VALUE_SEPARATOR;

use super::types::{ArgGroup, TagOperation};

/// External tools this crate knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    Sox,
    Ffmpeg,
    Ffprobe,
    Lame,
    Metaflac,
    AtomicParsley,
}

/// How an option's value is attached to its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// No value (`--quiet`).
    Flag,
    /// Value in the next token (`-b 320`).
    Separate,
    /// Value glued to the name (`-V4`).
    Attached,
    /// Value after an equals sign (`--export-tags-to=-`).
    Equals,
}

/// Declared option of a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    pub name: &'static str,
    pub arity: Arity,
    pub group: ArgGroup,
}

const fn opt(name: &'static str, arity: Arity, group: ArgGroup) -> OptionSpec {
    OptionSpec { name, arity, group }
}

use ArgGroup::{Global, OutputOptions};
use Arity::{Attached, Equals, Flag, Separate};

const SOX_OPTIONS: &[OptionSpec] = &[
    opt("--single-threaded", Flag, Global),
    opt("--multi-threaded", Flag, Global),
    opt("--no-clobber", Flag, Global),
    opt("--buffer", Separate, Global),
    opt("-q", Flag, Global),
    opt("-V", Attached, Global),
    opt("--channels", Separate, OutputOptions),
    opt("--rate", Separate, OutputOptions),
    opt("--bits", Separate, OutputOptions),
    opt("--compression", Separate, OutputOptions),
    opt("--type", Separate, OutputOptions),
];

const SOX_EFFECTS: &[&str] = &["trim", "fade", "channels", "rate", "gain", "norm", "reverse"];

const FFMPEG_OPTIONS: &[OptionSpec] = &[
    opt("-y", Flag, Global),
    opt("-n", Flag, Global),
    opt("-nostdin", Flag, Global),
    opt("-hide_banner", Flag, Global),
    opt("-loglevel", Separate, Global),
    opt("-acodec", Separate, OutputOptions),
    opt("-c", Separate, OutputOptions),
    opt("-c:a", Separate, OutputOptions),
    opt("-c:v", Separate, OutputOptions),
    opt("-vn", Flag, OutputOptions),
    opt("-map", Separate, OutputOptions),
    opt("-map_metadata", Separate, OutputOptions),
    opt("-id3v2_version", Separate, OutputOptions),
    opt("-disposition:v", Separate, OutputOptions),
    opt("-metadata:s:v", Separate, OutputOptions),
    opt("-b:a", Separate, OutputOptions),
    opt("-ar", Separate, OutputOptions),
    opt("-ac", Separate, OutputOptions),
    opt("-compression_level", Separate, OutputOptions),
    opt("-f", Separate, OutputOptions),
    opt("-fflags", Separate, OutputOptions),
];

const FFPROBE_OPTIONS: &[OptionSpec] = &[
    opt("-v", Separate, Global),
    opt("-print_format", Separate, Global),
    opt("-show_format", Flag, Global),
    opt("-show_streams", Flag, Global),
];

const LAME_OPTIONS: &[OptionSpec] = &[
    opt("--quiet", Flag, Global),
    opt("--silent", Flag, Global),
    opt("-T", Flag, Global),
    opt("--noreplaygain", Flag, Global),
    opt("-q", Separate, Global),
    opt("--resample", Separate, Global),
    opt("--bitwidth", Separate, Global),
    opt("--cbr", Flag, Global),
    opt("-b", Separate, Global),
    opt("--abr", Separate, Global),
    opt("--vbr-new", Flag, Global),
    opt("-V", Separate, Global),
];

const METAFLAC_OPTIONS: &[OptionSpec] = &[
    opt("--no-utf8-convert", Flag, Global),
    opt("--preserve-modtime", Flag, Global),
    opt("--dont-use-padding", Flag, Global),
    opt("--export-tags-to", Equals, Global),
];

const ATOMIC_PARSLEY_OPTIONS: &[OptionSpec] = &[opt("--overWrite", Flag, Global)];

/// AtomicParsley only accepts a fixed set of iTunes atoms.
const ATOMIC_PARSLEY_FIELDS: &[(&str, &str)] = &[
    ("title", "--title"),
    ("artist", "--artist"),
    ("album", "--album"),
    ("album_artist", "--albumArtist"),
    ("albumartist", "--albumArtist"),
    ("genre", "--genre"),
    ("date", "--year"),
    ("year", "--year"),
    ("comment", "--comment"),
    ("track", "--tracknum"),
    ("tracknumber", "--tracknum"),
    ("disc", "--disk"),
    ("discnumber", "--disk"),
    ("composer", "--composer"),
    ("lyrics", "--lyrics"),
    ("encoder", "--encodingTool"),
    ("grouping", "--grouping"),
    ("description", "--description"),
    ("copyright", "--copyright"),
    ("bpm", "--bpm"),
    ("compilation", "--compilation"),
];

impl Tool {
    /// Every wrapped tool.
    pub const ALL: [Tool; 6] = [
        Self::Sox,
        Self::Ffmpeg,
        Self::Ffprobe,
        Self::Lame,
        Self::Metaflac,
        Self::AtomicParsley,
    ];

    /// Default executable name, resolved through `PATH`.
    pub fn default_program(&self) -> &'static str {
        match self {
            Self::Sox => "sox",
            Self::Ffmpeg => "ffmpeg",
            Self::Ffprobe => "ffprobe",
            Self::Lame => "lame",
            Self::Metaflac => "metaflac",
            Self::AtomicParsley => "AtomicParsley",
        }
    }

    /// Order in which argument groups are serialized.
    pub fn layout(&self) -> &'static [ArgGroup] {
        use ArgGroup::*;
        match self {
            Self::Sox => &[Global, Input, OutputOptions, Output, Effects],
            Self::Ffmpeg => &[Global, Input, OutputOptions, Operations, Output],
            Self::Ffprobe => &[Global, Input],
            Self::Lame => &[Global, Input, Output],
            Self::Metaflac => &[Global, Operations, Input],
            Self::AtomicParsley => &[Input, Operations, Global],
        }
    }

    /// Whether the tool writes a separate output file (as opposed to
    /// editing or reading its input in place).
    pub fn writes_output(&self) -> bool {
        matches!(self, Self::Sox | Self::Ffmpeg | Self::Lame)
    }

    /// Whether the tool accepts more than one input file.
    pub fn accepts_extra_inputs(&self) -> bool {
        matches!(self, Self::Ffmpeg)
    }

    /// Token placed before every input path.
    pub(crate) fn input_prefix(&self) -> Option<&'static str> {
        match self {
            Self::Ffmpeg => Some("-i"),
            _ => None,
        }
    }

    fn options(&self) -> &'static [OptionSpec] {
        match self {
            Self::Sox => SOX_OPTIONS,
            Self::Ffmpeg => FFMPEG_OPTIONS,
            Self::Ffprobe => FFPROBE_OPTIONS,
            Self::Lame => LAME_OPTIONS,
            Self::Metaflac => METAFLAC_OPTIONS,
            Self::AtomicParsley => ATOMIC_PARSLEY_OPTIONS,
        }
    }

    /// Looks up a declared option.
    pub fn option(&self, name: &str) -> Option<&'static OptionSpec> {
        self.options().iter().find(|spec| spec.name == name)
    }

    /// Whether `name` is a sox effect this crate composes.
    pub fn has_effect(&self, name: &str) -> bool {
        matches!(self, Self::Sox) && SOX_EFFECTS.contains(&name)
    }

    /// Renders tag operations into tokens for the operations group.
    pub(crate) fn render_tag_operations(
        &self,
        ops: &[TagOperation],
    ) -> Result<Vec<OsString>, AudioError> {
        match self {
            Self::Metaflac => Ok(render_metaflac(ops)),
            Self::Ffmpeg => render_ffmpeg(ops),
            Self::AtomicParsley => render_atomic_parsley(ops),
            _ if ops.is_empty() => Ok(Vec::new()),
            _ => Err(AudioError::invalid_argument(format!(
                "{} does not edit tags",
                self
            ))),
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_program())
    }
}

fn atomic_parsley_flag(field: &str) -> Result<&'static str, AudioError> {
    let field = field.to_lowercase();
    ATOMIC_PARSLEY_FIELDS
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, flag)| *flag)
        .ok_or_else(|| {
            AudioError::invalid_argument(format!(
                "AtomicParsley cannot write the \"{}\" field",
                field
            ))
        })
}

/// Groups `Set` operations per field, keeping first-seen field order.
fn grouped_values(ops: &[TagOperation]) -> Vec<(&str, Vec<&str>)> {
    let mut grouped: Vec<(&str, Vec<&str>)> = Vec::new();
    for op in ops {
        if let TagOperation::Set { field, value } = op {
            let (field, value) = (field.as_str(), value.as_str());
            match grouped.iter().position(|(name, _)| *name == field) {
                Some(index) => grouped[index].1.push(value),
                None => grouped.push((field, vec![value])),
            }
        }
    }
    grouped
}

fn joined(values: &[&str]) -> String {
    values.join(&VALUE_SEPARATOR.to_string())
}

fn concat(prefix: &str, rest: impl Into<OsString>) -> OsString {
    let mut token = OsString::from(prefix);
    token.push(rest.into());
    token
}

fn render_metaflac(ops: &[TagOperation]) -> Vec<OsString> {
    let mut tokens = Vec::new();
    for op in ops {
        match op {
            TagOperation::Set { field, value } => {
                tokens.push(OsString::from(format!(
                    "--set-tag={}={}",
                    field.to_uppercase(),
                    value
                )));
            }
            TagOperation::RemoveAll => tokens.push("--remove-all".into()),
            TagOperation::RemoveFields(fields) => {
                for field in fields {
                    tokens.push(format!("--remove-tag={}", field.to_uppercase()).into());
                }
            }
            TagOperation::ImportPicture(path) => {
                tokens.push(concat("--import-picture-from=", path.clone()));
            }
            TagOperation::RemovePictures => {
                tokens.push("--remove".into());
                tokens.push("--block-type=PICTURE".into());
            }
        }
    }
    tokens
}

fn render_ffmpeg(ops: &[TagOperation]) -> Result<Vec<OsString>, AudioError> {
    let mut tokens: Vec<OsString> = Vec::new();
    for op in ops {
        match op {
            TagOperation::Set { .. } => {}
            TagOperation::RemoveAll => {
                tokens.extend(["-map_metadata".into(), "-1".into()]);
            }
            TagOperation::RemoveFields(fields) => {
                for field in fields {
                    tokens.extend(["-metadata".into(), format!("{}=", field.to_lowercase()).into()]);
                }
            }
            TagOperation::ImportPicture(_) | TagOperation::RemovePictures => {
                return Err(AudioError::invalid_argument(
                    "ffmpeg artwork edits are expressed with stream mapping options",
                ));
            }
        }
    }
    for (field, values) in grouped_values(ops) {
        tokens.extend([
            "-metadata".into(),
            format!("{}={}", field.to_lowercase(), joined(&values)).into(),
        ]);
    }
    Ok(tokens)
}

fn render_atomic_parsley(ops: &[TagOperation]) -> Result<Vec<OsString>, AudioError> {
    let mut tokens: Vec<OsString> = Vec::new();
    for op in ops {
        match op {
            TagOperation::Set { .. } => {}
            TagOperation::RemoveAll => tokens.push("--metaEnema".into()),
            TagOperation::RemoveFields(fields) => {
                for field in fields {
                    tokens.extend([atomic_parsley_flag(field)?.into(), OsString::new()]);
                }
            }
            TagOperation::ImportPicture(path) => {
                tokens.extend(["--artwork".into(), path.clone().into_os_string()]);
            }
            TagOperation::RemovePictures => {
                tokens.extend(["--artwork".into(), "REMOVE_ALL".into()]);
            }
        }
    }
    for (field, values) in grouped_values(ops) {
        tokens.extend([atomic_parsley_flag(field)?.into(), joined(&values).into()]);
    }
    Ok(tokens)
}
