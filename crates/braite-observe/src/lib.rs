//! Observability setup for Braite: tracing subscriber and optional
//! OpenTelemetry export.

pub mod tracing_setup;
