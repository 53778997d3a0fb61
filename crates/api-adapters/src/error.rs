//! Maps domain failures onto the HTTP surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::error::DomainError;
use tracing::error;

/// The error type every handler returns. Wraps the domain taxonomy and
/// adds the transport-level 401 for absent/invalid credentials.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    Domain(DomainError),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ApiError::Unauthorized(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::Domain(DomainError::Validation(msg.into()))
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Domain(err) => {
                let status = match &err {
                    DomainError::Validation(_) => StatusCode::BAD_REQUEST,
                    DomainError::Permission(_) => StatusCode::FORBIDDEN,
                    DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
                    DomainError::Conflict(_) => StatusCode::CONFLICT,
                    DomainError::Transport(_) => StatusCode::BAD_GATEWAY,
                    DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status.is_server_error() {
                    error!(error = %err, "request failed");
                }
                (status, err.to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
