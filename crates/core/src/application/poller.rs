//! Poller - re-executes a shell snippet on a fixed interval
//!
//! The latest result is published through a `tokio::sync::watch` channel, so
//! the observable always holds a display-ready string:
//! - before the first run completes: the fallback
//! - after a successful run: that run's stdout (trailing newlines trimmed)
//! - after a failed run (spawn error, timeout, non-zero exit): the fallback
//!
//! Runs are sequential. A run that outlives the interval delays the next
//! tick instead of overlapping it, and each run is bounded by a timeout
//! enforced by the `CommandRunner`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use crate::application::constants::DEFAULT_POLL_TIMEOUT;
use crate::application::shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
use crate::domain::{PollSpec, PollState};
use crate::error::Result;
use crate::port::{CommandRequest, CommandRunner, TimeProvider};

/// A configured, not yet running poller
pub struct Poller {
    key: String,
    spec: PollSpec,
    runner: Arc<dyn CommandRunner>,
    time_provider: Arc<dyn TimeProvider>,
    timeout: Duration,
}

impl Poller {
    /// Create a poller
    ///
    /// # Arguments
    /// * `key` - Identifier used in logs (e.g. `volume.level`)
    /// * `spec` - Fallback, interval and snippet
    /// * `runner` - Executes the snippet
    /// * `time_provider` - Stamps `last_update_ms`
    pub fn new(
        key: impl Into<String>,
        spec: PollSpec,
        runner: Arc<dyn CommandRunner>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            key: key.into(),
            spec,
            runner,
            time_provider,
            timeout: DEFAULT_POLL_TIMEOUT,
        }
    }

    /// Override the per-run timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Start polling; the first run begins immediately
    ///
    /// Fails on a zero interval or a blank script.
    pub fn start(self) -> Result<PollHandle> {
        self.spawn(None)
    }

    /// Start polling, additionally stopping when `parent` is signalled
    pub fn start_linked(self, parent: ShutdownToken) -> Result<PollHandle> {
        self.spawn(Some(parent))
    }

    fn spawn(self, parent: Option<ShutdownToken>) -> Result<PollHandle> {
        self.spec.check_schedule(&self.key)?;

        let (tx, rx) = watch::channel(PollState::initial(self.spec.fallback.clone()));
        let (stop_tx, stop_rx) = shutdown_channel();
        let key = self.key.clone();

        let task = tokio::spawn(self.run(tx, stop_rx, parent));

        Ok(PollHandle {
            key,
            rx,
            stop_tx,
            task: Some(task),
        })
    }

    async fn run(
        self,
        tx: watch::Sender<PollState>,
        mut stop: ShutdownToken,
        mut parent: Option<ShutdownToken>,
    ) {
        debug!(
            poll = %self.key,
            interval_ms = self.spec.interval_ms,
            timeout_ms = self.timeout.as_millis() as u64,
            "Poller started"
        );

        let mut ticker = interval(self.spec.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = stop_requested(&mut stop, &mut parent) => break,
            }

            // Cancelling an in-flight run drops the runner future, which kills its process group
            let stdout = tokio::select! {
                stdout = self.execute_once() => stdout,
                _ = stop_requested(&mut stop, &mut parent) => break,
            };

            let now = self.time_provider.now_millis();
            tx.send_if_modified(|state| match &stdout {
                Some(out) => state.record_success(out, now),
                None => state.record_fallback(now),
            });
        }

        debug!(poll = %self.key, "Poller stopped");
    }

    /// Run the snippet once. `None` means "show the fallback".
    async fn execute_once(&self) -> Option<String> {
        let request = CommandRequest::poll(&self.spec.script, self.timeout);

        match self.runner.run(&request).await {
            Ok(output) if output.success() => Some(output.stdout),
            Ok(output) => {
                debug!(
                    poll = %self.key,
                    exit_code = ?output.exit_code,
                    stderr = %output.stderr.trim(),
                    "Poll snippet exited non-zero, showing fallback"
                );
                None
            }
            Err(e) => {
                debug!(poll = %self.key, error = %e, "Poll snippet failed, showing fallback");
                None
            }
        }
    }
}

async fn stop_requested(stop: &mut ShutdownToken, parent: &mut Option<ShutdownToken>) {
    match parent {
        Some(parent) => {
            tokio::select! {
                _ = stop.wait() => {}
                _ = parent.wait() => {}
            }
        }
        None => stop.wait().await,
    }
}

/// Read side of a poller: the observable string value
#[derive(Clone)]
pub struct PollObserver {
    rx: watch::Receiver<PollState>,
}

impl PollObserver {
    pub fn value(&self) -> String {
        self.rx.borrow().value.clone()
    }

    pub fn state(&self) -> PollState {
        self.rx.borrow().clone()
    }

    /// Wait for the displayed value (or outcome) to change.
    /// Returns `None` once the poller has stopped.
    pub async fn changed(&mut self) -> Option<PollState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Wait until the poller task has exited
    pub async fn closed(&mut self) {
        while self.rx.changed().await.is_ok() {}
    }
}

/// Owned handle to a running poller
///
/// `stop()` ends polling explicitly; dropping the handle aborts the task.
pub struct PollHandle {
    key: String,
    rx: watch::Receiver<PollState>,
    stop_tx: ShutdownSender,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn subscribe(&self) -> PollObserver {
        PollObserver {
            rx: self.rx.clone(),
        }
    }

    pub fn value(&self) -> String {
        self.rx.borrow().value.clone()
    }

    pub fn state(&self) -> PollState {
        self.rx.borrow().clone()
    }

    /// Request the poller to stop (does not wait)
    pub fn stop(&self) {
        self.stop_tx.shutdown();
    }

    /// Stop and wait for the task to exit
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        debug!(poll = %self.key, "Poller shut down");
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
