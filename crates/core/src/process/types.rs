//! Types for the process module.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::AudioError;

/// Locale variables that decide how tools encode non-ASCII text.
const LOCALE_VARS: &[&str] = &["LC_ALL", "LANG", "LC_CTYPE"];

/// Whether a locale name selects UTF-8 (e.g., `C.UTF-8`, `en_US.utf8`).
pub fn is_utf8_locale(locale: &str) -> bool {
    let codeset = locale
        .split('.')
        .nth(1)
        .map(|rest| rest.split('@').next().unwrap_or(rest).to_ascii_lowercase());
    matches!(codeset.as_deref(), Some("utf8") | Some("utf-8"))
}

/// Environment variables applied to every child process.
///
/// Always carries a UTF-8 `LC_ALL` and `LANG`: without them the tools mangle
/// non-ASCII tag values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentOverrides {
    vars: BTreeMap<String, String>,
}

impl EnvironmentOverrides {
    /// Locale used when none is configured.
    pub const DEFAULT_LOCALE: &'static str = "C.UTF-8";

    /// Creates overrides forcing the given UTF-8 locale.
    pub fn utf8(locale: &str) -> Result<Self, AudioError> {
        if !is_utf8_locale(locale) {
            return Err(AudioError::invalid_argument(format!(
                "locale \"{}\" is not UTF-8 capable",
                locale
            )));
        }
        let vars = [("LC_ALL", locale), ("LANG", locale)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Ok(Self { vars })
    }

    /// Adds a variable. Locale variables must stay UTF-8.
    pub fn with_var(mut self, key: &str, value: &str) -> Result<Self, AudioError> {
        if LOCALE_VARS.contains(&key) && !is_utf8_locale(value) {
            return Err(AudioError::invalid_argument(format!(
                "{}={} would disable UTF-8 for child processes",
                key, value
            )));
        }
        self.vars.insert(key.to_string(), value.to_string());
        Ok(self)
    }

    /// The forced locale.
    pub fn locale(&self) -> &str {
        self.vars.get("LC_ALL").map(String::as_str).unwrap_or(Self::DEFAULT_LOCALE)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Default for EnvironmentOverrides {
    fn default() -> Self {
        let vars = [("LC_ALL", Self::DEFAULT_LOCALE), ("LANG", Self::DEFAULT_LOCALE)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { vars }
    }
}

/// Outcome of one child process. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    exit_code: Option<i32>,
    stdout: String,
    stderr: String,
    duration: Duration,
    timed_out: bool,
}

impl ExecutionResult {
    pub fn new(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
        timed_out: bool,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            timed_out,
        }
    }

    /// Exit code; `None` when the process was killed by a signal.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    /// Wall-clock time from spawn to exit.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Exited on its own with status 0.
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}
