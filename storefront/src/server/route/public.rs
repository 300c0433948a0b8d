use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use tracing::warn;

use crate::core::config::Config;

pub(super) fn local_route(config: Arc<Config>) -> Router {
    Router::new()
        .route("/health", get(health_checker_handler))
        .route("/ready", get(readiness_handler))
        .with_state(config)
}

/// 200 while the document store answers a ping.
async fn health_checker_handler(State(config): State<Arc<Config>>) -> (StatusCode, &'static str) {
    match config.store().health_check().await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(e) => {
            warn!(error = %e, "Health check: document store unreachable");
            (StatusCode::SERVICE_UNAVAILABLE, "Document store unavailable")
        }
    }
}

/// 503 until the start-up schema upgrade run has finished.
async fn readiness_handler(State(config): State<Arc<Config>>) -> (StatusCode, &'static str) {
    if config.is_ready() {
        (StatusCode::OK, "READY")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Schema upgrades in progress")
    }
}
