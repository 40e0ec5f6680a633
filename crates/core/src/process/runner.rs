//! Process runner backed by `tokio::process`.

use async_trait::async_trait;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command as ChildCommand;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::command::Command;
use crate::error::AudioError;

use super::traits::ProcessRunner;
use super::types::{EnvironmentOverrides, ExecutionResult};

/// How long output pipes may stay open once the process group is gone.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Spawns tools as real child processes.
///
/// On unix every child leads its own process group. The group is killed when
/// the child exits or times out, so helpers it started cannot outlive it.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

/// Output of one pipe, read on its own task so a chatty tool never blocks on
/// a full pipe and partial output survives a timeout.
struct Drain {
    buf: Arc<Mutex<Vec<u8>>>,
    task: JoinHandle<()>,
}

impl Drain {
    fn spawn<R>(stream: Option<R>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let sink = buf.clone();
        let task = tokio::spawn(async move {
            let Some(mut stream) = stream else { return };
            let mut chunk = [0u8; 8192];
            loop {
                match stream.read(&mut chunk).await {
                    Ok(0) => break,
                    Ok(n) => {
                        if let Ok(mut buf) = sink.lock() {
                            buf.extend_from_slice(&chunk[..n]);
                        }
                    }
                    Err(e) => {
                        debug!(error = %e, "Stopped reading child output");
                        break;
                    }
                }
            }
        });
        Self { buf, task }
    }

    /// Waits up to `grace` for the pipe to close and returns what was read.
    async fn finish(mut self, grace: Duration) -> String {
        if timeout(grace, &mut self.task).await.is_err() {
            warn!("Child output still open, keeping what was read");
            self.task.abort();
        }
        let output = self
            .buf
            .lock()
            .map(|buf| String::from_utf8_lossy(&buf).into_owned())
            .unwrap_or_default();
        output
    }
}

/// Sends SIGKILL to the process group led by `pid`.
#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Some(pid) = pid else { return };
    match killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(e) => warn!(pid, error = %e, "Failed to kill process group"),
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}

#[async_trait]
impl ProcessRunner for SystemRunner {
    fn name(&self) -> &str {
        "system"
    }

    async fn run(
        &self,
        command: &Command,
        limit: Duration,
        env: &EnvironmentOverrides,
    ) -> Result<ExecutionResult, AudioError> {
        let start = Instant::now();

        let mut child_command = ChildCommand::new(command.program());
        child_command
            .args(command.argv())
            .envs(env.vars())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        child_command.process_group(0);

        let mut child = child_command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AudioError::ToolNotFound {
                    tool: command.tool(),
                    path: command.program().to_path_buf(),
                }
            } else {
                AudioError::Io(e)
            }
        })?;

        let pid = child.id();
        debug!(tool = %command.tool(), pid = ?pid, "Spawned child process");

        let stdout = Drain::spawn(child.stdout.take());
        let stderr = Drain::spawn(child.stderr.take());

        let status = match timeout(limit, child.wait()).await {
            Ok(status) => Some(status?),
            Err(_) => {
                warn!(
                    tool = %command.tool(),
                    timeout_secs = limit.as_secs(),
                    "Child process timed out, killing it"
                );
                kill_process_group(pid);
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "Failed to kill timed-out child process");
                }
                None
            }
        };
        // Whatever the child left running in its group would hold the pipes.
        kill_process_group(pid);

        let stdout = stdout.finish(DRAIN_GRACE).await;
        let stderr = stderr.finish(DRAIN_GRACE).await;

        let result = ExecutionResult::new(
            status.and_then(|s| s.code()),
            stdout,
            stderr,
            start.elapsed(),
            status.is_none(),
        );

        match status {
            None => Err(AudioError::ProcessTimeout {
                command: command.command_line(),
                timeout_secs: limit.as_secs(),
                result,
            }),
            Some(status) if status.success() => Ok(result),
            Some(_) => Err(AudioError::ProcessFailed {
                command: command.command_line(),
                result,
            }),
        }
    }
}
