// Shell command runner
// reason: tokio::process for async children, nix for process-group signals
use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, warn};

use dashpanel_core::application::constants::KILL_GRACE_PERIOD;
use dashpanel_core::port::{
    CommandOutput, CommandRequest, CommandRunner, ExecutionError, TimeProvider,
};

/// Header prepended to strict requests
const STRICT_MODE_PREFIX: &str = "set -euo pipefail";

/// Runs requests as `<shell> -c <script>`
///
/// Each child leads its own process group, so a timeout or a cancelled run
/// takes down everything the script started, not only the shell.
pub struct ShellCommandRunner {
    shell: String,
    time_provider: Arc<dyn TimeProvider>,
    kill_grace: Duration,
}

impl ShellCommandRunner {
    /// Create a runner
    ///
    /// # Arguments
    /// * `shell` - Interpreter accepting `-c` (strict mode needs bash-compatible `pipefail`)
    /// * `time_provider` - Time provider for duration tracking
    pub fn new(shell: impl Into<String>, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            shell: shell.into(),
            time_provider,
            kill_grace: KILL_GRACE_PERIOD,
        }
    }

    /// Override the SIGTERM -> SIGKILL grace period
    pub fn with_kill_grace(mut self, grace: Duration) -> Self {
        self.kill_grace = grace;
        self
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }

    fn build_command(&self, request: &CommandRequest) -> Command {
        let script = if request.strict {
            format!("{}\n{}", STRICT_MODE_PREFIX, request.script)
        } else {
            request.script.clone()
        };

        let mut command = Command::new(&self.shell);
        command
            .arg("-c")
            .arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        command.process_group(0);

        command
    }

    /// Kill a timed-out child: SIGTERM to the group, SIGKILL after the grace period
    async fn terminate(&self, child: &mut Child, pid: Option<u32>) {
        #[cfg(unix)]
        if let Some(pid) = pid {
            use nix::sys::signal::{killpg, Signal};
            use nix::unistd::Pid;

            let group = Pid::from_raw(pid as i32);

            debug!(pid = %pid, "Sending SIGTERM to process group");
            if let Err(e) = killpg(group, Signal::SIGTERM) {
                debug!(pid = %pid, error = %e, "SIGTERM failed");
            }

            if timeout(self.kill_grace, child.wait()).await.is_err() {
                warn!(pid = %pid, "Process did not exit after SIGTERM, sending SIGKILL");
            }
            // Sweep stragglers even when the leader exited
            let _ = killpg(group, Signal::SIGKILL);
        }

        #[cfg(not(unix))]
        let _ = pid;

        if let Err(e) = child.kill().await {
            debug!(error = %e, "Child already reaped");
        }
    }
}

#[async_trait]
impl CommandRunner for ShellCommandRunner {
    async fn run(&self, request: &CommandRequest) -> Result<CommandOutput, ExecutionError> {
        let start_time = self.time_provider.now_millis();

        let mut child = self
            .build_command(request)
            .spawn()
            .map_err(|e| ExecutionError::SpawnFailed(format!("{}: {}", self.shell, e)))?;
        let pid = child.id();
        // Armed until the child is reaped; fires if this future is dropped mid-run
        let mut group = GroupGuard::new(pid);

        debug!(pid = ?pid, strict = request.strict, "Spawned shell");

        let collected = match request.timeout {
            Some(limit) => {
                let waited = timeout(limit, collect(&mut child)).await;
                match waited {
                    Ok(result) => result,
                    Err(_) => {
                        self.terminate(&mut child, pid).await;
                        group.disarm();
                        let limit_ms = limit.as_millis() as u64;
                        debug!(pid = ?pid, timeout_ms = limit_ms, "Shell timed out");
                        return Err(ExecutionError::Timeout(limit_ms));
                    }
                }
            }
            None => collect(&mut child).await,
        };
        group.disarm();
        let (status, stdout, stderr) = collected?;

        let duration_ms = self.time_provider.now_millis() - start_time;
        debug!(
            pid = ?pid,
            exit_code = ?status.code(),
            duration_ms = %duration_ms,
            "Shell completed"
        );

        Ok(CommandOutput {
            exit_code: status.code(),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            duration_ms,
        })
    }
}

/// SIGKILLs the child's process group on drop unless disarmed.
///
/// `kill_on_drop` only reaches the shell itself; this covers the commands it
/// started when a poller is stopped during a run.
struct GroupGuard {
    pid: Option<u32>,
}

impl GroupGuard {
    fn new(pid: Option<u32>) -> Self {
        Self { pid }
    }

    fn disarm(&mut self) {
        self.pid = None;
    }
}

impl Drop for GroupGuard {
    fn drop(&mut self) {
        #[cfg(unix)]
        if let Some(pid) = self.pid.take() {
            use nix::sys::signal::{killpg, Signal};
            use nix::unistd::Pid;

            debug!(pid = %pid, "Run cancelled, killing process group");
            let _ = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL);
        }
    }
}

/// Wait for exit while draining both pipes, so a chatty child never blocks on a full pipe
async fn collect(child: &mut Child) -> Result<(ExitStatus, Vec<u8>, Vec<u8>), ExecutionError> {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (status, stdout, stderr) = tokio::join!(child.wait(), drain(stdout), drain(stderr));

    let status = status.map_err(|e| ExecutionError::IoError(e.to_string()))?;
    let stdout = stdout.map_err(|e| ExecutionError::IoError(e.to_string()))?;
    let stderr = stderr.map_err(|e| ExecutionError::IoError(e.to_string()))?;
    Ok((status, stdout, stderr))
}

async fn drain<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}
