//! Telemetry setup for OpenTelemetry integration
//!
//! Built before the subscriber is installed, so outcomes are reported back
//! to the caller and logged once logging is up.

use tracing_subscriber::{Layer, Registry};

pub type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Debug)]
pub enum Telemetry {
    /// `OTEL_EXPORTER_OTLP_ENDPOINT` not set
    Disabled,
    Enabled { endpoint: String },
    Unavailable { endpoint: String, reason: String },
}

/// Build the OpenTelemetry layer if enabled
///
/// # Environment Variables
///
/// - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (e.g., http://localhost:4317)
/// - `OTEL_SERVICE_NAME`: Service name (default: dashpaneld)
pub fn layer() -> (Option<BoxedLayer>, Telemetry) {
    let endpoint = match std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") {
        Ok(endpoint) => endpoint,
        Err(_) => return (None, Telemetry::Disabled),
    };

    #[cfg(feature = "telemetry")]
    return match build_layer(&endpoint) {
        Ok(layer) => (Some(layer), Telemetry::Enabled { endpoint }),
        Err(e) => (
            None,
            Telemetry::Unavailable {
                endpoint,
                reason: e.to_string(),
            },
        ),
    };

    #[cfg(not(feature = "telemetry"))]
    return (
        None,
        Telemetry::Unavailable {
            endpoint,
            reason: "feature 'telemetry' not enabled (cargo build --features telemetry)".to_string(),
        },
    );
}

#[cfg(feature = "telemetry")]
fn build_layer(endpoint: &str) -> anyhow::Result<BoxedLayer> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig;

    let service_name =
        std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "dashpaneld".to_string());

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = opentelemetry_sdk::trace::TracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .build();
    let tracer = provider.tracer(service_name);
    opentelemetry::global::set_tracer_provider(provider);

    Ok(tracing_opentelemetry::layer().with_tracer(tracer).boxed())
}
