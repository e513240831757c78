//! RPC Method Handlers
//!
//! Thin adapters from JSON-RPC parameters onto a mounted dashboard.

use crate::error::{throttled, to_rpc_error};
use crate::throttle::DispatchThrottle;
use crate::types::{DispatchRequest, DispatchResponse, StatsResponse, WidgetRequest};
use dashpanel_core::application::MountedDashboard;
use dashpanel_core::domain::{DashboardSnapshot, WidgetSnapshot};
use jsonrpsee::types::ErrorObjectOwned;
use std::sync::Arc;
use tracing::{info, warn};

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    dashboard: Arc<MountedDashboard>,
    throttle: DispatchThrottle,
}

impl RpcHandler {
    pub fn new(dashboard: Arc<MountedDashboard>, throttle: DispatchThrottle) -> Self {
        Self {
            dashboard,
            throttle,
        }
    }

    /// dashboard.snapshot.v1
    pub async fn snapshot(&self) -> Result<DashboardSnapshot, ErrorObjectOwned> {
        Ok(self.dashboard.snapshot())
    }

    /// widget.get.v1
    pub async fn widget(&self, params: WidgetRequest) -> Result<WidgetSnapshot, ErrorObjectOwned> {
        self.dashboard
            .widget(&params.widget)
            .map_err(to_rpc_error)
    }

    /// action.dispatch.v1
    pub async fn dispatch(
        &self,
        params: DispatchRequest,
    ) -> Result<DispatchResponse, ErrorObjectOwned> {
        // Unknown names never reach the throttle
        self.dashboard
            .action_command(&params.widget, &params.action)
            .map_err(to_rpc_error)?;

        // Each accepted press spawns a process
        if !self.throttle.check() {
            warn!(widget = %params.widget, action = %params.action, "Dispatch throttled");
            return Err(throttled());
        }

        let dispatch_id = self
            .dashboard
            .press(&params.widget, &params.action)
            .map_err(to_rpc_error)?;

        info!(
            widget = %params.widget,
            action = %params.action,
            dispatch_id = %dispatch_id,
            "Action dispatched via RPC"
        );

        Ok(DispatchResponse {
            widget: params.widget,
            action: params.action,
            dispatch_id,
            accepted: true,
        })
    }

    /// admin.stats.v1
    pub async fn stats(&self) -> Result<StatsResponse, ErrorObjectOwned> {
        Ok(self.dashboard.stats().into())
    }
}
