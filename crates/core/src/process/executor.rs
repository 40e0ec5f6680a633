//! Logged, metered execution through a [`ProcessRunner`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::command::Command;
use crate::error::AudioError;
use crate::metrics;

use super::traits::ProcessRunner;
use super::types::{EnvironmentOverrides, ExecutionResult};

/// A runner paired with the time limit and environment every command gets.
#[derive(Clone)]
pub struct Executor {
    runner: Arc<dyn ProcessRunner>,
    timeout: Duration,
    env: EnvironmentOverrides,
}

impl Executor {
    pub fn new(runner: Arc<dyn ProcessRunner>, timeout: Duration, env: EnvironmentOverrides) -> Self {
        Self {
            runner,
            timeout,
            env,
        }
    }

    pub fn runner(&self) -> &Arc<dyn ProcessRunner> {
        &self.runner
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn env(&self) -> &EnvironmentOverrides {
        &self.env
    }

    /// Runs a command, logging its command line and output.
    pub async fn execute(&self, command: &Command) -> Result<ExecutionResult, AudioError> {
        let tool = command.tool().to_string();
        info!(tool = %tool, command = %command, "Executing");

        let outcome = self.runner.run(command, self.timeout, &self.env).await;

        let status = match &outcome {
            Ok(_) => "success",
            Err(AudioError::ProcessFailed { .. }) => "failed",
            Err(AudioError::ProcessTimeout { .. }) => "timeout",
            Err(AudioError::ToolNotFound { .. }) => "not_found",
            Err(_) => "error",
        };
        metrics::TOOL_INVOCATIONS
            .with_label_values(&[&tool, status])
            .inc();

        match &outcome {
            Ok(result) => {
                metrics::TOOL_DURATION
                    .with_label_values(&[&tool])
                    .observe(result.duration().as_secs_f64());
                info!(
                    tool = %tool,
                    duration_ms = result.duration().as_millis() as u64,
                    "Command finished"
                );
                debug!(
                    tool = %tool,
                    stdout = %result.stdout().trim_end(),
                    stderr = %result.stderr().trim_end(),
                    "Command output"
                );
            }
            Err(e) => {
                if let Some(result) = e.execution_result() {
                    metrics::TOOL_DURATION
                        .with_label_values(&[&tool])
                        .observe(result.duration().as_secs_f64());
                }
                warn!(tool = %tool, error = %e, "Command failed");
            }
        }

        outcome
    }
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("runner", &self.runner.name())
            .field("timeout", &self.timeout)
            .field("env", &self.env)
            .finish()
    }
}
