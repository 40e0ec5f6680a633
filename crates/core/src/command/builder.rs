//! Accumulates arguments for one tool invocation.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::error::AudioError;
use crate::media::{normalize_field, TagSet};

use super::tool::{Arity, Tool};
use super::types::{ArgGroup, Command, TagOperation};

static OPTION_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^--?[A-Za-z0-9][A-Za-z0-9_:\-]*$").unwrap());

/// Builder for a single [`Command`].
///
/// Setters never fail; everything is checked by [`CommandBuilder::compose`],
/// which is pure and may be called repeatedly.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    tool: Tool,
    program: PathBuf,
    input: Option<PathBuf>,
    extra_inputs: Vec<PathBuf>,
    output: Option<PathBuf>,
    options: Vec<(String, Option<OsString>)>,
    effects: Vec<(String, Vec<String>)>,
    operations: Vec<TagOperation>,
}

impl CommandBuilder {
    /// Creates a builder for `tool` running the given executable.
    pub fn new(tool: Tool, program: impl Into<PathBuf>) -> Self {
        Self {
            tool,
            program: program.into(),
            input: None,
            extra_inputs: Vec::new(),
            output: None,
            options: Vec::new(),
            effects: Vec::new(),
            operations: Vec::new(),
        }
    }

    /// Creates a builder using the tool's default executable name.
    pub fn for_tool(tool: Tool) -> Self {
        Self::new(tool, tool.default_program())
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Sets the (primary) input path.
    pub fn input(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.input = Some(path.into());
        self
    }

    /// Adds a secondary input, e.g. an image stream for ffmpeg.
    pub fn extra_input(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.extra_inputs.push(path.into());
        self
    }

    pub fn output(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.output = Some(path.into());
        self
    }

    /// Adds an option with a value. Repeating an option keeps every occurrence.
    pub fn option(&mut self, name: &str, value: impl Into<OsString>) -> &mut Self {
        self.options.push((name.to_string(), Some(value.into())));
        self
    }

    /// Adds a value-less option.
    pub fn flag(&mut self, name: &str) -> &mut Self {
        self.options.push((name.to_string(), None));
        self
    }

    /// Appends an effect to the effects chain.
    pub fn effect<I, S>(&mut self, name: &str, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.effects
            .push((name.to_string(), args.into_iter().map(Into::into).collect()));
        self
    }

    /// Appends a tag value. Repeated fields accumulate values.
    pub fn add_tag(&mut self, field: &str, value: impl Into<String>) -> &mut Self {
        self.operations.push(TagOperation::Set {
            field: normalize_field(field),
            value: value.into(),
        });
        self
    }

    /// Appends every value of a tag set.
    pub fn add_tags(&mut self, tags: &TagSet) -> &mut Self {
        for (field, values) in tags.iter() {
            for value in values {
                self.add_tag(field, value.as_str());
            }
        }
        self
    }

    pub fn remove_all(&mut self) -> &mut Self {
        self.operations.push(TagOperation::RemoveAll);
        self
    }

    pub fn remove_fields<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields = fields.into_iter().map(|f| normalize_field(f.as_ref())).collect();
        self.operations.push(TagOperation::RemoveFields(fields));
        self
    }

    pub fn import_picture(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.operations.push(TagOperation::ImportPicture(path.into()));
        self
    }

    pub fn remove_pictures(&mut self) -> &mut Self {
        self.operations.push(TagOperation::RemovePictures);
        self
    }

    /// Clears accumulated arguments, keeping the tool and program.
    pub fn reset(&mut self) -> &mut Self {
        self.input = None;
        self.extra_inputs.clear();
        self.output = None;
        self.options.clear();
        self.effects.clear();
        self.operations.clear();
        self
    }

    /// Validates the accumulated state and serializes it into a [`Command`].
    pub fn compose(&self) -> Result<Command, AudioError> {
        let tool = self.tool;

        let input = match &self.input {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => {
                return Err(AudioError::invalid_argument(format!(
                    "{} requires a non-empty input path",
                    tool
                )))
            }
        };

        let output = match (&self.output, tool.writes_output()) {
            (Some(path), true) if !path.as_os_str().is_empty() => Some(path),
            (_, true) => {
                return Err(AudioError::invalid_argument(format!(
                    "{} requires a non-empty output path",
                    tool
                )))
            }
            (Some(_), false) => {
                return Err(AudioError::invalid_argument(format!(
                    "{} edits its input in place and takes no output path",
                    tool
                )))
            }
            (None, false) => None,
        };

        if !self.extra_inputs.is_empty() && !tool.accepts_extra_inputs() {
            return Err(AudioError::invalid_argument(format!(
                "{} accepts a single input",
                tool
            )));
        }
        if self.extra_inputs.iter().any(|p| p.as_os_str().is_empty()) {
            return Err(AudioError::invalid_argument("input paths must not be empty"));
        }

        self.check_operations()?;
        let operations = tool.render_tag_operations(&self.operations)?;

        let mut global = Vec::new();
        let mut output_options = Vec::new();
        for (name, value) in &self.options {
            let (group, tokens) = self.render_option(name, value.as_ref())?;
            match group {
                ArgGroup::OutputOptions => output_options.extend(tokens),
                _ => global.extend(tokens),
            }
        }

        let mut effects = Vec::new();
        for (name, args) in &self.effects {
            if !tool.has_effect(name) {
                return Err(AudioError::invalid_argument(format!(
                    "unknown effect \"{}\" for {}",
                    name, tool
                )));
            }
            effects.push(OsString::from(name));
            effects.extend(args.iter().map(OsString::from));
        }

        let mut inputs = Vec::new();
        for path in std::iter::once(input).chain(&self.extra_inputs) {
            if let Some(prefix) = tool.input_prefix() {
                inputs.push(OsString::from(prefix));
            }
            inputs.push(path.clone().into_os_string());
        }

        let mut parts = Vec::with_capacity(tool.layout().len());
        for group in tool.layout() {
            let tokens = match group {
                ArgGroup::Global => std::mem::take(&mut global),
                ArgGroup::Input => std::mem::take(&mut inputs),
                ArgGroup::OutputOptions => std::mem::take(&mut output_options),
                ArgGroup::Operations => operations.clone(),
                ArgGroup::Output => output.map(|p| vec![p.clone().into_os_string()]).unwrap_or_default(),
                ArgGroup::Effects => std::mem::take(&mut effects),
            };
            parts.push((*group, tokens));
        }

        Ok(Command::new(tool, self.program.clone(), parts))
    }

    fn check_operations(&self) -> Result<(), AudioError> {
        let sets = self
            .operations
            .iter()
            .any(|op| matches!(op, TagOperation::Set { .. }));
        let removes = self
            .operations
            .iter()
            .any(|op| matches!(op, TagOperation::RemoveAll | TagOperation::RemoveFields(_)));
        if sets && removes {
            return Err(AudioError::invalid_argument(
                "adding and removing tags cannot be combined in one command",
            ));
        }

        for op in &self.operations {
            let fields: Vec<&str> = match op {
                TagOperation::Set { field, .. } => vec![field.as_str()],
                TagOperation::RemoveFields(fields) => fields.iter().map(String::as_str).collect(),
                TagOperation::ImportPicture(path) if path.as_os_str().is_empty() => {
                    return Err(AudioError::invalid_argument("picture path must not be empty"));
                }
                _ => Vec::new(),
            };
            for field in fields {
                if field.is_empty() || field.contains('=') || field.chars().any(char::is_control) {
                    return Err(AudioError::invalid_argument(format!(
                        "malformed tag field name \"{}\"",
                        field
                    )));
                }
            }
        }
        Ok(())
    }

    fn render_option(
        &self,
        name: &str,
        value: Option<&OsString>,
    ) -> Result<(ArgGroup, Vec<OsString>), AudioError> {
        if !OPTION_NAME.is_match(name) {
            return Err(AudioError::invalid_argument(format!(
                "malformed option name \"{}\"",
                name
            )));
        }
        let spec = self.tool.option(name).ok_or_else(|| {
            AudioError::invalid_argument(format!("unknown option \"{}\" for {}", name, self.tool))
        })?;

        let tokens = match (spec.arity, value) {
            (Arity::Flag, None) => vec![OsString::from(name)],
            (Arity::Separate, Some(value)) => vec![OsString::from(name), value.clone()],
            (Arity::Attached, Some(value)) => {
                let mut token = OsString::from(name);
                token.push(value);
                vec![token]
            }
            (Arity::Equals, Some(value)) => {
                let mut token = OsString::from(format!("{}=", name));
                token.push(value);
                vec![token]
            }
            (Arity::Flag, Some(_)) => {
                return Err(AudioError::invalid_argument(format!(
                    "option \"{}\" does not take a value",
                    name
                )))
            }
            (_, None) => {
                return Err(AudioError::invalid_argument(format!(
                    "option \"{}\" requires a value",
                    name
                )))
            }
        };
        Ok((spec.group, tokens))
    }
}
