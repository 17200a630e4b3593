use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Initialize structured logging for the portal engine.
///
/// JSON output with span context so workflow transitions can be correlated
/// across a session. `RUST_LOG` narrows the filter as usual.
pub fn init_telemetry() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true),
        )
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Portal telemetry initialized with structured logging");
    Ok(())
}

/// Generate a correlation ID for linking related workflow operations.
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Create a span carrying the common workflow attributes.
pub fn create_workflow_span(
    operation: &str,
    actor_id: Option<&str>,
    correlation_id: Option<&str>,
) -> tracing::Span {
    tracing::info_span!(
        "portal_workflow",
        operation = operation,
        actor.id = actor_id,
        correlation.id = correlation_id,
    )
}

/// Shutdown telemetry gracefully.
pub fn shutdown_telemetry() {
    tracing::info!("Portal telemetry shutdown complete");
}
