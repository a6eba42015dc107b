//! Error responses for the control-plane HTTP surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Errors a control-plane route can return, mapped directly onto HTTP
/// status codes.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// No live instance matches the requested `(pattern_type, name)`.
    NotFound(String),
    /// The request body failed validation before reaching the registry.
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<tower_resilience_core::registry::RegistryError> for ApiError {
    fn from(err: tower_resilience_core::registry::RegistryError) -> Self {
        use tower_resilience_core::registry::RegistryError;
        match err {
            RegistryError::NotFound => ApiError::NotFound(err.to_string()),
            RegistryError::InvalidUpdate(_) => ApiError::BadRequest(err.to_string()),
        }
    }
}
