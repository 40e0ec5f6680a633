//! Error types shared by the builder, runner, verifier, converters and taggers.

use std::path::PathBuf;
use thiserror::Error;

use crate::command::Tool;
use crate::process::ExecutionResult;

/// Errors that can occur while composing, running or verifying a tool
/// invocation.
#[derive(Debug, Error)]
pub enum AudioError {
    /// Source file missing or not parseable as its declared format.
    #[error("Invalid input {path}: {reason}")]
    InvalidInput { path: PathBuf, reason: String },

    /// Malformed builder input or unsupported request.
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// The tool exited with a non-zero status (or was killed by a signal).
    #[error(
        "Command `{command}` failed with exit code {}\nstderr: {}\nstdout: {}",
        describe_exit(result),
        result.stderr().trim_end(),
        result.stdout().trim_end()
    )]
    ProcessFailed {
        command: String,
        result: ExecutionResult,
    },

    /// The tool ran past its time limit and was killed.
    #[error(
        "Command `{command}` timed out after {timeout_secs} seconds\nstderr: {}",
        result.stderr().trim_end()
    )]
    ProcessTimeout {
        command: String,
        timeout_secs: u64,
        result: ExecutionResult,
    },

    /// The produced artifact is missing, has the wrong format, or carries
    /// different tags than requested.
    #[error("Validation failed for {path}: {reason}{}", describe_fields(mismatched_fields))]
    ValidationFailed {
        path: PathBuf,
        reason: String,
        mismatched_fields: Vec<String>,
    },

    /// The tool binary could not be spawned.
    #[error("{tool} not found at path: {path}")]
    ToolNotFound { tool: Tool, path: PathBuf },

    /// The metadata reader could not parse a file.
    #[error("Failed to read metadata from {path}: {reason}")]
    ProbeFailed { path: PathBuf, reason: String },

    /// I/O error around a tool invocation.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_exit(result: &ExecutionResult) -> String {
    result
        .exit_code()
        .map(|code| code.to_string())
        .unwrap_or_else(|| "none (terminated by signal)".to_string())
}

fn describe_fields(fields: &[String]) -> String {
    if fields.is_empty() {
        String::new()
    } else {
        format!(" (fields: {})", fields.join(", "))
    }
}

impl AudioError {
    /// Creates a new invalid input error.
    pub fn invalid_input(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new invalid argument error.
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Creates a new validation error without field mismatches.
    pub fn validation_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ValidationFailed {
            path: path.into(),
            reason: reason.into(),
            mismatched_fields: Vec::new(),
        }
    }

    /// Creates a new probe error.
    pub fn probe_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ProbeFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether the caller can fix this by changing its request or its files,
    /// as opposed to a fault in the environment running the tools.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. } | Self::InvalidArgument { .. } | Self::ValidationFailed { .. }
        )
    }

    /// The captured result of the failing process, if any.
    pub fn execution_result(&self) -> Option<&ExecutionResult> {
        match self {
            Self::ProcessFailed { result, .. } | Self::ProcessTimeout { result, .. } => {
                Some(result)
            }
            _ => None,
        }
    }

    /// Field names whose observed tag values differed from the requested ones.
    pub fn mismatched_fields(&self) -> &[String] {
        match self {
            Self::ValidationFailed {
                mismatched_fields, ..
            } => mismatched_fields,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_process_failed_message_includes_command_and_stderr() {
        let err = AudioError::ProcessFailed {
            command: "sox in.flac out.mp3".to_string(),
            result: ExecutionResult::new(
                Some(2),
                String::new(),
                "sox FAIL formats: can't open input file".to_string(),
                Duration::from_millis(12),
                false,
            ),
        };
        let message = err.to_string();
        assert!(message.contains("sox in.flac out.mp3"));
        assert!(message.contains("exit code 2"));
        assert!(message.contains("can't open input file"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_validation_message_lists_fields() {
        let err = AudioError::ValidationFailed {
            path: PathBuf::from("/tmp/a.flac"),
            reason: "tag values differ from the requested values".to_string(),
            mismatched_fields: vec!["artist".to_string(), "year".to_string()],
        };
        assert!(err.to_string().contains("(fields: artist, year)"));
        assert_eq!(err.mismatched_fields(), ["artist", "year"]);
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_recoverable_kinds() {
        assert!(AudioError::invalid_input("/x.flac", "missing").is_recoverable());
        assert!(AudioError::invalid_argument("bad").is_recoverable());
        assert!(!AudioError::probe_failed("/x.flac", "garbage").is_recoverable());
        assert!(!AudioError::ToolNotFound {
            tool: Tool::Sox,
            path: PathBuf::from("sox")
        }
        .is_recoverable());
    }
}
