//! dashpanel daemon - Main Entry Point
//! Mounts the configured widgets, serves them over JSON-RPC and optionally
//! streams snapshots to stdout.

mod config;
mod logging;
mod telemetry;

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

// Import workspace crates
use dashpanel_api_rpc::RpcServer;
use dashpanel_core::application::catalog;
use dashpanel_core::application::constants::SHUTDOWN_TIMEOUT;
use dashpanel_core::application::{Dashboard, MountedDashboard};
use dashpanel_core::domain::DashboardSpec;
use dashpanel_core::port::id_provider::UuidProvider;
use dashpanel_core::port::time_provider::SystemTimeProvider;
use dashpanel_core::port::ToolProbe;
use dashpanel_infra_system::{PathToolProbe, ShellCommandRunner};

use crate::config::DaemonConfig;
use crate::telemetry::Telemetry;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration (defaults <- file <- env)
    let (config, config_path) = DaemonConfig::load()?;

    // 2. Initialize logging
    let (otel_layer, telemetry) = telemetry::layer();
    let _log_guard = logging::init(&config, otel_layer)?;

    info!("dashpanel daemon v{} starting...", VERSION);
    match telemetry {
        Telemetry::Disabled => {}
        Telemetry::Enabled { endpoint } => info!(endpoint = %endpoint, "OpenTelemetry enabled"),
        Telemetry::Unavailable { endpoint, reason } => warn!(
            endpoint = %endpoint,
            reason = %reason,
            "OpenTelemetry endpoint set but tracing export unavailable (continuing without it)"
        ),
    }
    info!(
        config_path = ?config_path,
        shell = %config.shell,
        widgets = ?config.widgets,
        "Configuration loaded"
    );

    // 3. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let id_provider = Arc::new(UuidProvider);
    let runner = Arc::new(ShellCommandRunner::new(
        config.shell.clone(),
        time_provider.clone(),
    ));
    let probe = PathToolProbe::from_env();

    // 4. Compose and mount
    let spec = catalog::compose(&config.widgets, &config.custom_widgets)
        .context("Failed to compose dashboard")?;
    warn_missing_tools(&spec, &probe);

    let dashboard = Arc::new(
        Dashboard::mount(
            spec,
            runner,
            time_provider,
            id_provider,
            config.dashboard_options(),
        )
        .context("Failed to mount dashboard")?,
    );

    // 5. Start JSON-RPC server
    let rpc_handle = if config.rpc.enabled {
        let (handle, addr) = RpcServer::new(config.rpc_server_config(), dashboard.clone())
            .start()
            .await
            .context("RPC server start failed")?;
        info!(addr = %addr, "RPC ready");
        Some(handle)
    } else {
        info!("RPC disabled by configuration");
        None
    };

    // 6. Optional stdout snapshot stream
    let stream_task = config
        .stream_stdout
        .then(|| spawn_snapshot_stream(dashboard.clone()));

    info!("System ready. Press Ctrl+C to shutdown");

    // 7. Wait for shutdown signal
    shutdown_signal().await?;
    info!("Shutdown signal received. Exiting gracefully...");

    // 8. Graceful shutdown
    if let Some(handle) = rpc_handle {
        if let Err(e) = handle.stop() {
            warn!(error = %e, "RPC server already stopped");
        }
    }

    if tokio::time::timeout(SHUTDOWN_TIMEOUT, dashboard.unmount())
        .await
        .is_err()
    {
        warn!(
            timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
            "Pollers did not stop in time"
        );
    }

    if let Some(task) = stream_task {
        // Ends once every poller has stopped
        let _ = tokio::time::timeout(SHUTDOWN_TIMEOUT, task).await;
    }

    info!("Shutdown complete.");
    Ok(())
}

/// Warn once per widget about utilities missing from PATH
fn warn_missing_tools(spec: &DashboardSpec, probe: &dyn ToolProbe) {
    for widget in &spec.widgets {
        let missing = probe.missing(&widget.requires);
        if !missing.is_empty() {
            warn!(
                widget = %widget.name,
                missing = ?missing,
                "Widget tools not found on PATH; affected values will show their fallback"
            );
        }
    }
}

/// Print a JSON snapshot line whenever any displayed value changes
fn spawn_snapshot_stream(dashboard: Arc<MountedDashboard>) -> JoinHandle<()> {
    let mut changes = dashboard.changes();

    tokio::spawn(async move {
        while changes.recv().await.is_some() {
            // Coalesce a burst of changes into one line
            while changes.try_recv().is_ok() {}

            match serde_json::to_string(&dashboard.snapshot()) {
                Ok(line) => println!("{}", line),
                Err(e) => error!(error = %e, "Failed to serialize snapshot"),
            }
        }
    })
}

async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate =
            signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result.context("Failed to listen for Ctrl+C")?,
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    Ok(())
}
