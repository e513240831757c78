//! Dashboard - mounts a widget composition onto running pollers
//!
//! Mounting validates the dashboard definition and starts one Poller per declared poll. The
//! mounted dashboard resolves widget rows against live poll values, routes
//! button presses to the Dispatcher and fans poll changes out to listeners.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::application::constants::{
    CHANGE_CHANNEL_CAPACITY, DEFAULT_DISPATCH_TIMEOUT, DEFAULT_POLL_TIMEOUT,
};
use crate::application::dispatcher::{DispatchStats, Dispatcher};
use crate::application::poller::{PollHandle, PollObserver, Poller};
use crate::application::shutdown::{shutdown_channel, ShutdownSender};
use crate::domain::{
    DashboardSnapshot, DashboardSpec, RowSnapshot, WidgetRow, WidgetSnapshot, WidgetSpec,
};
use crate::error::{AppError, Result};
use crate::port::{CommandRunner, IdProvider, TimeProvider};

/// Runtime options for a mounted dashboard
#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub poll_timeout: Duration,
    pub dispatch_timeout: Duration,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            dispatch_timeout: DEFAULT_DISPATCH_TIMEOUT,
        }
    }
}

/// A displayed value changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollChange {
    pub widget: String,
    pub poll: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub widgets: usize,
    pub polls: usize,
    pub poll_runs: u64,
    pub poll_failures: u64,
    pub dispatch: DispatchStats,
    pub uptime_ms: i64,
}

/// Entry point for mounting a dashboard
pub struct Dashboard;

impl Dashboard {
    /// Validate `spec` and start every poller
    ///
    /// Must be called from within a Tokio runtime.
    pub fn mount(
        spec: DashboardSpec,
        runner: Arc<dyn CommandRunner>,
        time_provider: Arc<dyn TimeProvider>,
        id_provider: Arc<dyn IdProvider>,
        options: DashboardOptions,
    ) -> Result<MountedDashboard> {
        spec.validate()?;

        let (shutdown_tx, shutdown) = shutdown_channel();
        let widgets = spec
            .widgets
            .iter()
            .map(|widget| {
                let polls = widget
                    .polls
                    .iter()
                    .map(|(name, poll)| {
                        let handle = Poller::new(
                            format!("{}.{}", widget.name, name),
                            poll.clone(),
                            runner.clone(),
                            time_provider.clone(),
                        )
                        .with_timeout(options.poll_timeout)
                        .start_linked(shutdown.clone())?;
                        Ok((name.clone(), handle))
                    })
                    .collect::<Result<BTreeMap<_, _>>>()?;
                Ok(MountedWidget {
                    spec: widget.clone(),
                    polls,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let dispatcher =
            Dispatcher::new(runner, id_provider).with_timeout(options.dispatch_timeout);

        info!(
            widgets = widgets.len(),
            polls = spec.poll_count(),
            "Dashboard mounted"
        );

        Ok(MountedDashboard {
            widgets,
            dispatcher,
            time_provider: time_provider.clone(),
            mounted_at_ms: time_provider.now_millis(),
            shutdown_tx,
        })
    }
}

struct MountedWidget {
    spec: WidgetSpec,
    polls: BTreeMap<String, PollHandle>,
}

impl MountedWidget {
    fn snapshot(&self) -> WidgetSnapshot {
        let rows = self
            .spec
            .rows
            .iter()
            .map(|row| match row {
                WidgetRow::Text { text } => RowSnapshot::Text { text: text.clone() },
                WidgetRow::Field { label, poll } => {
                    // Rows were validated against the poll map at mount
                    let state = self.polls.get(poll).map(|h| h.state());
                    RowSnapshot::Field {
                        label: label.clone(),
                        poll: poll.clone(),
                        value: state.as_ref().map(|s| s.value.clone()).unwrap_or_default(),
                        outcome: state
                            .map(|s| s.outcome)
                            .unwrap_or(crate::domain::PollOutcome::Pending),
                    }
                }
                WidgetRow::Button {
                    label,
                    action,
                    label_poll,
                } => RowSnapshot::Button {
                    label: label_poll
                        .as_ref()
                        .and_then(|p| self.polls.get(p))
                        .map(|h| h.value())
                        .unwrap_or_else(|| label.clone()),
                    action: action.clone(),
                },
            })
            .collect();

        WidgetSnapshot {
            name: self.spec.name.clone(),
            title: self.spec.title.clone(),
            icon: self.spec.icon.clone(),
            rows,
        }
    }
}

/// A dashboard whose pollers are running
pub struct MountedDashboard {
    widgets: Vec<MountedWidget>,
    dispatcher: Dispatcher,
    time_provider: Arc<dyn TimeProvider>,
    mounted_at_ms: i64,
    shutdown_tx: ShutdownSender,
}

impl MountedDashboard {
    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            taken_at_ms: self.time_provider.now_millis(),
            widgets: self.widgets.iter().map(MountedWidget::snapshot).collect(),
        }
    }

    pub fn widget(&self, name: &str) -> Result<WidgetSnapshot> {
        self.find(name).map(MountedWidget::snapshot)
    }

    /// Observe one poll of one widget
    pub fn observe(&self, widget: &str, poll: &str) -> Result<PollObserver> {
        self.find(widget)?
            .polls
            .get(poll)
            .map(PollHandle::subscribe)
            .ok_or_else(|| AppError::NotFound(format!("Poll {}.{} not found", widget, poll)))
    }

    /// Dispatch the command bound to `widget`/`action`; returns the dispatch ID
    ///
    /// Only declared actions can be dispatched. The effect becomes visible on
    /// the affected pollers' next tick.
    pub fn press(&self, widget: &str, action: &str) -> Result<String> {
        let command = self.action_command(widget, action)?.to_string();

        debug!(widget = %widget, action = %action, "Button pressed");
        Ok(self.dispatcher.dispatch(command))
    }

    /// Command bound to `widget`/`action`, without running it
    pub fn action_command(&self, widget: &str, action: &str) -> Result<&str> {
        self.find(widget)?
            .spec
            .actions
            .get(action)
            .map(|spec| spec.command.as_str())
            .ok_or_else(|| AppError::NotFound(format!("Action {}.{} not found", widget, action)))
    }

    /// Stream of displayed-value changes across every poll
    ///
    /// The stream ends once every poller has stopped.
    pub fn changes(&self) -> mpsc::Receiver<PollChange> {
        let (tx, rx) = mpsc::channel(CHANGE_CHANNEL_CAPACITY);

        for widget in &self.widgets {
            for (poll, handle) in &widget.polls {
                let mut observer = handle.subscribe();
                let tx = tx.clone();
                let widget = widget.spec.name.clone();
                let poll = poll.clone();

                tokio::spawn(async move {
                    while let Some(state) = observer.changed().await {
                        let change = PollChange {
                            widget: widget.clone(),
                            poll: poll.clone(),
                            value: state.value,
                        };
                        if tx.send(change).await.is_err() {
                            break;
                        }
                    }
                });
            }
        }

        rx
    }

    pub fn stats(&self) -> DashboardStats {
        let (poll_runs, poll_failures) = self
            .widgets
            .iter()
            .flat_map(|w| w.polls.values())
            .map(|h| h.state())
            .fold((0, 0), |(runs, failures), s| {
                (runs + s.runs, failures + s.failures)
            });

        DashboardStats {
            widgets: self.widgets.len(),
            polls: self.widgets.iter().map(|w| w.polls.len()).sum(),
            poll_runs,
            poll_failures,
            dispatch: self.dispatcher.stats(),
            uptime_ms: self.time_provider.now_millis() - self.mounted_at_ms,
        }
    }

    /// Stop every poller and wait for them to exit
    ///
    /// Takes `&self` so a dashboard shared behind an `Arc` can be stopped.
    pub async fn unmount(&self) {
        self.shutdown_tx.shutdown();

        let mut observers: Vec<PollObserver> = self
            .widgets
            .iter()
            .flat_map(|w| w.polls.values())
            .map(PollHandle::subscribe)
            .collect();
        join_all(observers.iter_mut().map(PollObserver::closed)).await;

        info!(widgets = self.widgets.len(), "Dashboard unmounted");
    }

    fn find(&self, name: &str) -> Result<&MountedWidget> {
        self.widgets
            .iter()
            .find(|w| w.spec.name == name)
            .ok_or_else(|| AppError::NotFound(format!("Widget {} not found", name)))
    }
}
