//! Trait definitions for the process module.

use async_trait::async_trait;
use std::time::Duration;

use crate::command::Command;
use crate::error::AudioError;

use super::types::{EnvironmentOverrides, ExecutionResult};

/// Runs composed commands.
///
/// Implementations judge success by exit status only and never look at what
/// the tool printed. Deciding whether the output is usable is the verifier's
/// job.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Returns the name of this runner implementation.
    fn name(&self) -> &str;

    /// Runs `command` to completion, killing it after `timeout`.
    ///
    /// Fails with `ProcessTimeout` when the limit is hit, `ProcessFailed` on a
    /// non-zero exit and `ToolNotFound` when the program cannot be spawned.
    async fn run(
        &self,
        command: &Command,
        timeout: Duration,
        env: &EnvironmentOverrides,
    ) -> Result<ExecutionResult, AudioError>;
}
