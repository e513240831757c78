//! Dispatcher - fire-and-forget command execution for button actions
//!
//! `dispatch` spawns the command on the runtime and returns immediately.
//! Failures go to the `error` log only: they are never retried, never
//! returned to the caller and never touch poll state. The next poll tick is
//! what makes the effect of a command visible.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::application::constants::{DEFAULT_DISPATCH_TIMEOUT, MAX_LOGGED_STDERR_CHARS};
use crate::port::{CommandRequest, CommandRunner, IdProvider};

/// How a dispatched command ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Succeeded,
    /// Ran to completion with a non-zero (or signal) exit
    Failed { exit_code: Option<i32> },
    /// Could not be run to completion (spawn failure, timeout)
    Errored(String),
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DispatchOutcome::Succeeded)
    }
}

/// Dispatch counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchStats {
    pub dispatched: u64,
    pub succeeded: u64,
    pub failed: u64,
}

#[derive(Default)]
struct Counters {
    dispatched: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
}

/// Command dispatcher (cheap to clone)
#[derive(Clone)]
pub struct Dispatcher {
    runner: Arc<dyn CommandRunner>,
    id_provider: Arc<dyn IdProvider>,
    timeout: Duration,
    counters: Arc<Counters>,
}

impl Dispatcher {
    pub fn new(runner: Arc<dyn CommandRunner>, id_provider: Arc<dyn IdProvider>) -> Self {
        Self {
            runner,
            id_provider,
            timeout: DEFAULT_DISPATCH_TIMEOUT,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Execute `command` in the background and return its dispatch ID at once
    ///
    /// Never fails. Outside a Tokio runtime the command is dropped with an
    /// error log.
    pub fn dispatch(&self, command: impl Into<String>) -> String {
        let command = command.into();
        let dispatch_id = self.id_provider.generate_id();

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let this = self.clone();
                let id = dispatch_id.clone();
                runtime.spawn(async move {
                    this.execute(&id, &command).await;
                });
            }
            Err(e) => {
                error!(
                    dispatch_id = %dispatch_id,
                    command = %command,
                    error = %e,
                    "Cannot dispatch command outside of a Tokio runtime"
                );
            }
        }

        dispatch_id
    }

    /// Execute `command` and wait for it (the awaited form of `dispatch`)
    pub async fn run(&self, command: &str) -> DispatchOutcome {
        let dispatch_id = self.id_provider.generate_id();
        self.execute(&dispatch_id, command).await
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            dispatched: self.counters.dispatched.load(Ordering::Relaxed),
            succeeded: self.counters.succeeded.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    async fn execute(&self, dispatch_id: &str, command: &str) -> DispatchOutcome {
        self.counters.dispatched.fetch_add(1, Ordering::Relaxed);
        info!(dispatch_id = %dispatch_id, command = %command, "Dispatching command");

        let request = CommandRequest::dispatch(command, self.timeout);
        let outcome = match self.runner.run(&request).await {
            Ok(output) if output.success() => {
                info!(
                    dispatch_id = %dispatch_id,
                    duration_ms = output.duration_ms,
                    "Command completed"
                );
                DispatchOutcome::Succeeded
            }
            Ok(output) => {
                error!(
                    dispatch_id = %dispatch_id,
                    command = %command,
                    exit_code = ?output.exit_code,
                    stderr = %truncate(output.stderr.trim(), MAX_LOGGED_STDERR_CHARS),
                    "Command failed"
                );
                DispatchOutcome::Failed {
                    exit_code: output.exit_code,
                }
            }
            Err(e) => {
                error!(
                    dispatch_id = %dispatch_id,
                    command = %command,
                    error = %e,
                    "Command could not be executed"
                );
                DispatchOutcome::Errored(e.to_string())
            }
        };

        if outcome.is_success() {
            self.counters.succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.counters.failed.fetch_add(1, Ordering::Relaxed);
        }
        outcome
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => {
            warn!(len = s.len(), "Truncating command stderr in log");
            &s[..idx]
        }
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::command_runner::mocks::{MockBehavior, MockCommandRunner};
    use crate::port::id_provider::mocks::SequentialIdProvider;
    use crate::port::ExecutionError;

    fn dispatcher(runner: Arc<MockCommandRunner>) -> Dispatcher {
        Dispatcher::new(runner, Arc::new(SequentialIdProvider::default()))
    }

    async fn wait_for_dispatched(dispatcher: &Dispatcher, finished: u64) {
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                let stats = dispatcher.stats();
                if stats.succeeded + stats.failed >= finished {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("dispatched commands never finished");
    }

    #[tokio::test]
    async fn test_run_reports_success() {
        let runner = Arc::new(MockCommandRunner::new_success(""));
        let outcome = dispatcher(runner.clone()).run("playerctl play-pause").await;

        assert_eq!(outcome, DispatchOutcome::Succeeded);
        let calls = runner.calls();
        assert_eq!(calls[0].script, "playerctl play-pause");
        assert!(!calls[0].strict);
    }

    #[tokio::test]
    async fn test_failing_command_is_absorbed() {
        let runner = Arc::new(MockCommandRunner::new_exit(1));
        let dispatcher = dispatcher(runner);

        let outcome = dispatcher.run("false").await;
        assert_eq!(outcome, DispatchOutcome::Failed { exit_code: Some(1) });
        assert_eq!(dispatcher.stats().failed, 1);
    }

    #[tokio::test]
    async fn test_spawn_error_is_absorbed() {
        let runner = Arc::new(MockCommandRunner::new(MockBehavior::Error(
            ExecutionError::SpawnFailed("no such shell".to_string()),
        )));
        let outcome = dispatcher(runner).run("anything").await;
        assert!(matches!(outcome, DispatchOutcome::Errored(msg) if msg.contains("no such shell")));
    }

    #[tokio::test]
    async fn test_dispatch_returns_immediately_and_keeps_working_after_failure() {
        let runner = Arc::new(
            MockCommandRunner::new_success("")
                .route("false", MockBehavior::exit(1))
                .with_delay(Duration::from_millis(20)),
        );
        let dispatcher = dispatcher(runner.clone());

        let first = dispatcher.dispatch("false");
        let second = dispatcher.dispatch("pactl set-sink-volume @DEFAULT_SINK@ +5%");
        assert_eq!(first, "dispatch-1");
        assert_eq!(second, "dispatch-2");

        wait_for_dispatched(&dispatcher, 2).await;
        let stats = dispatcher.stats();
        assert_eq!(stats.dispatched, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.succeeded, 1);
    }

    #[test]
    fn test_dispatch_outside_runtime_does_not_panic() {
        let runner = Arc::new(MockCommandRunner::new_success(""));
        let dispatcher = dispatcher(runner.clone());

        let id = dispatcher.dispatch("true");
        assert_eq!(id, "dispatch-1");
        assert_eq!(runner.call_count(), 0);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("ééé", 2), "éé");
        assert_eq!(truncate("short", 10), "short");
    }
}
