//! Execution of composed commands.
//!
//! The [`ProcessRunner`] trait runs a [`Command`](crate::command::Command)
//! under a time limit with a forced UTF-8 locale and captures its output.
//! [`SystemRunner`] is the production implementation; tests use
//! [`MockRunner`](crate::testing::MockRunner). An [`Executor`] pairs a runner
//! with the configured timeout and environment and logs every run.

mod executor;
mod runner;
mod traits;
mod types;

pub use executor::Executor;
pub use runner::SystemRunner;
pub use traits::ProcessRunner;
pub use types::{is_utf8_locale, EnvironmentOverrides, ExecutionResult};
