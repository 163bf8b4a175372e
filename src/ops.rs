//! Ops listener
//!
//! Optional HTTP surface for liveness checks and Prometheus scraping. Kept
//! apart from the daemon's real work: the publisher runs the same whether
//! or not this listener is enabled.

use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::get,
};
use prometheus::{Encoder, TextEncoder};
use tower_http::trace::TraceLayer;

use crate::config::OpsSettings;
use crate::error::{AppError, Result};
use crate::metrics::REGISTRY;

async fn health_check() -> &'static str {
    "OK"
}

/// Metrics endpoint handler
///
/// Returns all metrics in Prometheus text format.
async fn metrics_handler() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    match encoder.encode_to_string(&metric_families) {
        Ok(metrics_text) => (
            axum::http::StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, encoder.format_type())],
            metrics_text,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics",
            )
                .into_response()
        }
    }
}

/// Build the ops router
///
/// Shared by the binary and integration tests to keep route composition
/// consistent across environments.
pub fn build_router() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
}

/// Bind the ops listener and serve it from a background task
///
/// Returns the bound address (useful when the configured port is 0).
///
/// # Errors
/// Fails if the address cannot be bound; serve errors after that are logged
/// from the spawned task.
pub async fn spawn(settings: &OpsSettings) -> Result<std::net::SocketAddr> {
    let addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind ops listener on {addr}: {e}")))?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| AppError::Internal(e.into()))?;

    tracing::info!("Ops listener on {}", local_addr);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, build_router()).await {
            tracing::error!(error = %e, "Ops listener terminated");
        }
    });

    Ok(local_addr)
}
