use axum::response::Response;
use serde::{Deserialize, Serialize};

use super::error::SchemaRouteError;

/// Represents a standardized API response structure.
///
/// # Examples
/// ```
/// use storefront::server::types::ApiResponse;
/// let response = ApiResponse::error("Admin endpoints disabled".to_string());
/// assert_eq!(response.success, false);
/// assert_eq!(response.message, Some("Admin endpoints disabled".to_string()));
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T = ()> {
    /// Indicates if the operation was successful
    pub success: bool,
    /// Optional data payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Optional message, typically used for error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiResponse<()> {
    pub fn error(message: String) -> Self {
        Self { success: false, data: None, message: Some(message) }
    }
}

impl<T> ApiResponse<T> {
    /// Creates a successful response carrying data and an optional message.
    pub fn success_with_data(data: T, message: Option<String>) -> Self {
        Self { success: true, data: Some(data), message }
    }
}

/// Result type used by the schema admin handlers.
pub type SchemaRouteResult = Result<Response<axum::body::Body>, SchemaRouteError>;
