//! Subscriber setup
//!
//! Console output goes to stderr so stdout stays free for the snapshot
//! stream. `RUST_LOG` overrides the default filter.

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{DaemonConfig, LogFormat};
use crate::telemetry::BoxedLayer;

const DEFAULT_FILTER: &str = "dashpanel=info";
const LOG_FILE_PREFIX: &str = "dashpaneld.log";

/// Install the global subscriber
///
/// The returned guard flushes the file writer and must live until exit.
pub fn init(config: &DaemonConfig, telemetry: Option<BoxedLayer>) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .context("Failed to create env filter")?;

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir))?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let base = tracing_subscriber::registry()
        .with(telemetry)
        .with(env_filter)
        .with(file_layer);

    match config.log_format {
        // Production: JSON structured logging
        LogFormat::Json => base
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        // Development: Pretty formatting with colors
        LogFormat::Pretty => base
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
    }
    .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
