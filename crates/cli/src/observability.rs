//! Tracing subscriber and OpenTelemetry wiring.
//!
//! Logs go to stderr so stdout carries only the run outcome.

use anyhow::Context;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace::TracerProvider};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LogFormat;

const DEFAULT_FILTER: &str = "info";
const TRACER_NAME: &str = "blogsmith";

/// Flushes exported spans when dropped.
pub struct TelemetryGuard {
    provider: Option<TracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("failed to flush OpenTelemetry spans: {e}");
            }
        }
    }
}

/// Installs the global subscriber.
///
/// `RUST_LOG` overrides the default `info` filter. When `otlp_endpoint` is
/// set, spans are also exported over OTLP/gRPC.
pub fn init(format: LogFormat, otlp_endpoint: Option<&str>) -> anyhow::Result<TelemetryGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (pretty, json) = match format {
        LogFormat::Pretty => (
            Some(fmt::layer().with_writer(std::io::stderr).with_target(false)),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(fmt::layer().json().with_writer(std::io::stderr)),
        ),
    };

    let (otel, provider) = match otlp_endpoint {
        Some(endpoint) => {
            let exporter = opentelemetry_otlp::SpanExporter::builder()
                .with_tonic()
                .with_endpoint(endpoint)
                .build()
                .context("failed to build OTLP span exporter")?;
            let provider = TracerProvider::builder()
                .with_batch_exporter(exporter, runtime::Tokio)
                .build();
            let layer = tracing_opentelemetry::layer().with_tracer(provider.tracer(TRACER_NAME));
            (Some(layer), Some(provider))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(json)
        .with(otel)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(TelemetryGuard { provider })
}
