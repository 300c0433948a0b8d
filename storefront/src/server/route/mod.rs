use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Router;

use crate::core::config::Config;

pub(super) mod admin;
pub(super) mod public;

/// Fallback for routes that match nothing.
pub async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "The requested resource was not found")
}

pub(crate) fn server_router(config: Arc<Config>) -> Router {
    Router::new()
        .merge(public::local_route(config.clone()))
        .nest("/admin/schema", admin::schema_router(config))
        .fallback(handler_404)
}
