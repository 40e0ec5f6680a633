//! Mock process runner for testing.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::command::{Command, Tool};
use crate::error::AudioError;
use crate::process::{EnvironmentOverrides, ExecutionResult, ProcessRunner};

/// Scripted result of one mock invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOutcome {
    /// Exit status 0 with the given stdout.
    Success { stdout: String },
    /// Non-zero exit with the given stderr.
    Exit { code: i32, stderr: String },
    /// The time limit is hit.
    Timeout,
    /// The program cannot be spawned.
    NotFound,
}

impl Default for MockOutcome {
    fn default() -> Self {
        Self::Success {
            stdout: String::new(),
        }
    }
}

/// Mock implementation of the ProcessRunner trait.
///
/// Provides controllable behavior for testing:
/// - Record every command for assertions
/// - Script outcomes in order, or per tool
/// - Create the declared output file on success, like a real tool would
///
/// # Example
///
/// ```rust,ignore
/// use soundsmith_core::testing::{MockOutcome, MockRunner};
///
/// let runner = MockRunner::new();
/// runner.push_outcome(MockOutcome::Exit { code: 2, stderr: "sox FAIL".into() }).await;
///
/// // Run something through a ToolContext built on the runner...
///
/// let commands = runner.recorded_commands().await;
/// assert_eq!(commands.len(), 1);
/// ```
#[derive(Debug)]
pub struct MockRunner {
    /// Recorded commands, in execution order.
    commands: Arc<RwLock<Vec<Command>>>,
    /// Outcomes consumed one per run, before per-tool outcomes.
    outcomes: Arc<RwLock<VecDeque<MockOutcome>>>,
    /// Outcome for every run of a tool once the queue is empty.
    tool_outcomes: Arc<RwLock<HashMap<Tool, MockOutcome>>>,
    /// Whether successful runs create their output file.
    create_outputs: Arc<RwLock<bool>>,
    /// Whether failed runs leave a (partial) output file behind.
    create_outputs_on_failure: Arc<RwLock<bool>>,
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRunner {
    /// Create a new mock runner where every command succeeds.
    pub fn new() -> Self {
        Self {
            commands: Arc::new(RwLock::new(Vec::new())),
            outcomes: Arc::new(RwLock::new(VecDeque::new())),
            tool_outcomes: Arc::new(RwLock::new(HashMap::new())),
            create_outputs: Arc::new(RwLock::new(true)),
            create_outputs_on_failure: Arc::new(RwLock::new(false)),
        }
    }

    /// Get all recorded commands.
    pub async fn recorded_commands(&self) -> Vec<Command> {
        self.commands.read().await.clone()
    }

    /// Get the number of commands run so far.
    pub async fn command_count(&self) -> usize {
        self.commands.read().await.len()
    }

    /// Clear recorded commands.
    pub async fn clear_recorded(&self) {
        self.commands.write().await.clear();
    }

    /// Queue an outcome for the next run.
    pub async fn push_outcome(&self, outcome: MockOutcome) {
        self.outcomes.write().await.push_back(outcome);
    }

    /// Set the outcome of every later run of `tool`.
    pub async fn set_tool_outcome(&self, tool: Tool, outcome: MockOutcome) {
        self.tool_outcomes.write().await.insert(tool, outcome);
    }

    /// Set whether successful runs create their output file.
    pub async fn set_create_outputs(&self, create: bool) {
        *self.create_outputs.write().await = create;
    }

    /// Set whether failed runs still create their output file.
    pub async fn set_create_outputs_on_failure(&self, create: bool) {
        *self.create_outputs_on_failure.write().await = create;
    }

    async fn next_outcome(&self, tool: Tool) -> MockOutcome {
        if let Some(outcome) = self.outcomes.write().await.pop_front() {
            return outcome;
        }
        self.tool_outcomes
            .read()
            .await
            .get(&tool)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl ProcessRunner for MockRunner {
    fn name(&self) -> &str {
        "mock"
    }

    async fn run(
        &self,
        command: &Command,
        timeout: Duration,
        _env: &EnvironmentOverrides,
    ) -> Result<ExecutionResult, AudioError> {
        self.commands.write().await.push(command.clone());
        let outcome = self.next_outcome(command.tool()).await;

        let succeeded = matches!(outcome, MockOutcome::Success { .. });
        let create = if succeeded {
            *self.create_outputs.read().await
        } else {
            *self.create_outputs_on_failure.read().await
        };
        if create {
            if let Some(output) = command.output_path() {
                tokio::fs::write(output, b"").await?;
            }
        }

        match outcome {
            MockOutcome::Success { stdout } => Ok(ExecutionResult::new(
                Some(0),
                stdout,
                String::new(),
                Duration::ZERO,
                false,
            )),
            MockOutcome::Exit { code, stderr } => Err(AudioError::ProcessFailed {
                command: command.command_line(),
                result: ExecutionResult::new(Some(code), String::new(), stderr, Duration::ZERO, false),
            }),
            MockOutcome::Timeout => Err(AudioError::ProcessTimeout {
                command: command.command_line(),
                timeout_secs: timeout.as_secs(),
                result: ExecutionResult::new(None, String::new(), String::new(), timeout, true),
            }),
            MockOutcome::NotFound => Err(AudioError::ToolNotFound {
                tool: command.tool(),
                path: command.program().to_path_buf(),
            }),
        }
    }
}
