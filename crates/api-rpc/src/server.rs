//! JSON-RPC Server
//!
//! Serves JSON-RPC 2.0 over HTTP on a localhost TCP port.

use crate::error::ServerError;
use crate::handler::RpcHandler;
use crate::throttle::{DispatchThrottle, DEFAULT_BURST, DEFAULT_RATE_PER_SEC};
use crate::types::{DispatchRequest, WidgetRequest};
use dashpanel_core::application::MountedDashboard;
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9531;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    /// 0 picks a free port
    pub port: u16,
    pub rate_limit_burst: u32,
    pub rate_limit_rate: u32,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
            rate_limit_burst: DEFAULT_BURST,
            rate_limit_rate: DEFAULT_RATE_PER_SEC,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, dashboard: Arc<MountedDashboard>) -> Self {
        let throttle = DispatchThrottle::new(config.rate_limit_burst, config.rate_limit_rate);
        Self {
            config,
            handler: Arc::new(RpcHandler::new(dashboard, throttle)),
        }
    }

    /// Start the JSON-RPC server; returns its handle and bound address
    pub async fn start(self) -> Result<(ServerHandle, SocketAddr), ServerError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = server.local_addr().map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

        let mut module = RpcModule::new(());

        let handler = self.handler.clone();
        module
            .register_async_method("dashboard.snapshot.v1", move |_, _, _| {
                let handler = handler.clone();
                async move { handler.snapshot().await }
            })
            .map_err(|e| ServerError::Register(e.to_string()))?;

        let handler = self.handler.clone();
        module
            .register_async_method("widget.get.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: WidgetRequest = params.parse()?;
                    handler.widget(req).await
                }
            })
            .map_err(|e| ServerError::Register(e.to_string()))?;

        let handler = self.handler.clone();
        module
            .register_async_method("action.dispatch.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: DispatchRequest = params.parse()?;
                    handler.dispatch(req).await
                }
            })
            .map_err(|e| ServerError::Register(e.to_string()))?;

        let handler = self.handler.clone();
        module
            .register_async_method("admin.stats.v1", move |_, _, _| {
                let handler = handler.clone();
                async move { handler.stats().await }
            })
            .map_err(|e| ServerError::Register(e.to_string()))?;

        info!(
            addr = %local_addr,
            burst = self.config.rate_limit_burst,
            rate = self.config.rate_limit_rate,
            "JSON-RPC server started"
        );

        Ok((server.start(module), local_addr))
    }
}
