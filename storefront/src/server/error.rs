use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::types::ApiResponse;

/// Errors returned by the schema admin routes.
///
/// # Status Code Mapping
/// * `AdminDisabled` -> 403 Forbidden
/// * `UnknownCollection` -> 404 Not Found
/// * `StoreUnavailable` -> 500 Internal Server Error
#[derive(Debug, thiserror::Error)]
pub enum SchemaRouteError {
    #[error("Admin endpoints disabled")]
    AdminDisabled,

    #[error("Collection is not registered: {0}")]
    UnknownCollection(String),

    #[error("Document store unavailable: {0}")]
    StoreUnavailable(String),
}

impl IntoResponse for SchemaRouteError {
    fn into_response(self) -> Response {
        match self {
            SchemaRouteError::AdminDisabled => (
                StatusCode::FORBIDDEN,
                Json(ApiResponse::error("Admin endpoints disabled. Enable with --admin-enabled flag.".to_string())),
            )
                .into_response(),
            SchemaRouteError::UnknownCollection(name) => {
                (StatusCode::NOT_FOUND, Json(ApiResponse::error(format!("Collection is not registered: {}", name))))
                    .into_response()
            }
            SchemaRouteError::StoreUnavailable(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiResponse::error(format!("Document store unavailable: {}", msg))))
                    .into_response()
            }
        }
    }
}
