//! RPC Request/Response Types
//!
//! `dashboard.snapshot.v1` and `widget.get.v1` answer with the core snapshot
//! types directly.

use dashpanel_core::application::DashboardStats;
use serde::{Deserialize, Serialize};

/// widget.get.v1 - Resolve one widget
#[derive(Debug, Deserialize)]
pub struct WidgetRequest {
    pub widget: String,
}

/// action.dispatch.v1 - Press a widget button
#[derive(Debug, Deserialize)]
pub struct DispatchRequest {
    pub widget: String,
    pub action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchResponse {
    pub widget: String,
    pub action: String,
    pub dispatch_id: String,
    /// Queued for execution; the command's own outcome is only logged
    pub accepted: bool,
}

/// admin.stats.v1 - Dashboard statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub widgets: usize,
    pub polls: usize,
    pub poll_runs: u64,
    pub poll_failures: u64,
    pub dispatched: u64,
    pub dispatch_succeeded: u64,
    pub dispatch_failed: u64,
    pub uptime_seconds: i64,
}

impl From<DashboardStats> for StatsResponse {
    fn from(stats: DashboardStats) -> Self {
        Self {
            widgets: stats.widgets,
            polls: stats.polls,
            poll_runs: stats.poll_runs,
            poll_failures: stats.poll_failures,
            dispatched: stats.dispatch.dispatched,
            dispatch_succeeded: stats.dispatch.succeeded,
            dispatch_failed: stats.dispatch.failed,
            uptime_seconds: stats.uptime_ms / 1000,
        }
    }
}
