//! Types for the command module.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};

use super::tool::Tool;

/// Named slot of an argument vector. Each tool serializes its groups in a
/// fixed order (see [`Tool::layout`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgGroup {
    /// Options that precede everything else.
    Global,
    /// Input path(s), with their per-input prefix where the tool needs one.
    Input,
    /// Options applying to the output file.
    OutputOptions,
    /// Tag and artwork edits.
    Operations,
    /// Output path.
    Output,
    /// Effects chain following the output (sox).
    Effects,
}

/// A tag or artwork edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagOperation {
    /// Append one value to a field.
    Set { field: String, value: String },
    /// Remove every tag (and, where the tool does so, every picture).
    RemoveAll,
    /// Remove the named fields.
    RemoveFields(Vec<String>),
    /// Embed an image file as cover artwork.
    ImportPicture(PathBuf),
    /// Remove all embedded pictures.
    RemovePictures,
}

/// A fully composed, ready-to-spawn tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    tool: Tool,
    program: PathBuf,
    parts: Vec<(ArgGroup, Vec<OsString>)>,
}

impl Command {
    pub(crate) fn new(tool: Tool, program: PathBuf, parts: Vec<(ArgGroup, Vec<OsString>)>) -> Self {
        Self {
            tool,
            program,
            parts,
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Tokens of one group.
    pub fn group(&self, group: ArgGroup) -> &[OsString] {
        self.parts
            .iter()
            .find(|(g, _)| *g == group)
            .map(|(_, tokens)| tokens.as_slice())
            .unwrap_or(&[])
    }

    /// Argument vector (without the program), in layout order.
    pub fn argv(&self) -> Vec<OsString> {
        self.parts
            .iter()
            .flat_map(|(_, tokens)| tokens.iter().cloned())
            .collect()
    }

    /// Output path, for tools that write one.
    pub fn output_path(&self) -> Option<&Path> {
        self.group(ArgGroup::Output).last().map(Path::new)
    }

    /// Shell-quoted rendering, for logs and error messages only.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.parts.iter().flat_map(|(_, t)| t.iter().map(OsString::as_os_str)))
            .map(quote)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

fn quote(token: &OsStr) -> String {
    let text = token.to_string_lossy();
    let plain = !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_=./:,+%@".contains(c));
    if plain {
        text.into_owned()
    } else {
        format!("'{}'", text.replace('\'', r"'\''"))
    }
}
