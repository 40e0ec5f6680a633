//! Shared collaborators for converters and taggers.

use std::fmt;
use std::sync::Arc;

use crate::command::{Command, CommandBuilder, Tool};
use crate::config::Config;
use crate::error::AudioError;
use crate::probe::{MetadataReader, ToolMetadataReader};
use crate::process::{EnvironmentOverrides, ExecutionResult, Executor, ProcessRunner, SystemRunner};
use crate::verifier::Verifier;

/// Configuration, runner and metadata reader, bundled.
///
/// Cheap to clone; every converter and tagger owns one.
#[derive(Clone)]
pub struct ToolContext {
    config: Arc<Config>,
    executor: Executor,
    reader: Arc<dyn MetadataReader>,
}

impl ToolContext {
    /// Creates a context from explicit collaborators.
    ///
    /// Fails when the configured locale is not UTF-8.
    pub fn new(
        config: Config,
        runner: Arc<dyn ProcessRunner>,
        reader: Arc<dyn MetadataReader>,
    ) -> Result<Self, AudioError> {
        let executor = Self::executor_for(&config, runner)?;
        Ok(Self {
            config: Arc::new(config),
            executor,
            reader,
        })
    }

    /// Creates a context that spawns the configured binaries and reads
    /// metadata with ffprobe and metaflac.
    pub fn system(config: Config) -> Result<Self, AudioError> {
        let executor = Self::executor_for(&config, Arc::new(SystemRunner::new()))?;
        let reader = Arc::new(ToolMetadataReader::new(
            executor.clone(),
            &config.tools.ffprobe,
            &config.tools.metaflac,
        ));
        Ok(Self {
            config: Arc::new(config),
            executor,
            reader,
        })
    }

    fn executor_for(config: &Config, runner: Arc<dyn ProcessRunner>) -> Result<Executor, AudioError> {
        let env = EnvironmentOverrides::utf8(&config.process.locale)?;
        Ok(Executor::new(runner, config.process.timeout(), env))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    pub fn reader(&self) -> &Arc<dyn MetadataReader> {
        &self.reader
    }

    pub fn verifier(&self) -> Verifier {
        Verifier::new(self.reader.clone())
    }

    /// A fresh builder for `tool` using its configured executable.
    pub fn command(&self, tool: Tool) -> CommandBuilder {
        CommandBuilder::new(tool, self.config.tools.program(tool))
    }

    /// Runs a command with the configured timeout and locale.
    pub async fn execute(&self, command: &Command) -> Result<ExecutionResult, AudioError> {
        self.executor.execute(command).await
    }
}

impl fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolContext")
            .field("config", &self.config)
            .field("executor", &self.executor)
            .field("reader", &self.reader.name())
            .finish()
    }
}
