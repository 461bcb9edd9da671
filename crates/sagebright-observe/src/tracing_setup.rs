//! Tracing subscriber initialization for the Sagebright runtime.
//!
//! Installs a structured `fmt` layer (human-readable or JSON) and, when
//! requested, bridges spans to OpenTelemetry through a stdout exporter.
//! The exporter is meant for local development; production embedders swap
//! it for OTLP.

use std::sync::OnceLock;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Kept so the OTel tracer provider can be flushed on exit.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// How the subscriber should be assembled.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingOptions {
    /// Emit log lines as JSON instead of the human-readable format.
    pub json: bool,
    /// Bridge spans to OpenTelemetry (stdout exporter).
    pub otel: bool,
}

/// Initialize the global tracing subscriber.
///
/// Respects `RUST_LOG` via `EnvFilter`. Span close timing is always
/// recorded so completion-call latency shows up without extra fields.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(options: TracingOptions) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::from_default_env();

    if options.json {
        let otel_layer = options.otel.then(|| {
            let provider = SdkTracerProvider::builder()
                .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
                .build();
            let tracer = provider.tracer("sagebright");

            let _ = TRACER_PROVIDER.set(provider.clone());
            opentelemetry::global::set_tracer_provider(provider);

            tracing_opentelemetry::layer().with_tracer(tracer)
        });
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .try_init()?;
    } else {
        let otel_layer = options.otel.then(|| {
            let provider = SdkTracerProvider::builder()
                .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
                .build();
            let tracer = provider.tracer("sagebright");

            let _ = TRACER_PROVIDER.set(provider.clone());
            opentelemetry::global::set_tracer_provider(provider);

            tracing_opentelemetry::layer().with_tracer(tracer)
        });
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .try_init()?;
    }

    Ok(())
}

/// Flush pending spans and shut the OTel provider down.
///
/// No-op when OTel was never enabled.
pub fn shutdown_tracing() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            eprintln!("warning: OTel tracer provider shutdown error: {e}");
        }
    }
}
