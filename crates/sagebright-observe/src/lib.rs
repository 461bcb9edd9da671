//! Observability for Sagebright: tracing subscriber setup and OpenTelemetry
//! GenAI attribute constants.

pub mod genai_attrs;
pub mod tracing_setup;
