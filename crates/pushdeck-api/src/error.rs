//! API error handling for read endpoints.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

/// API error type.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Forbidden(String),
    Conflict(String),
    Upstream(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        if status.is_server_error() {
            error!(status = %status, error = %message, "request failed");
        }

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<pushdeck_core::Error> for ApiError {
    fn from(err: pushdeck_core::Error) -> Self {
        use pushdeck_core::Error;
        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::InvalidInput(_) | Error::UnknownModule(_) => {
                ApiError::BadRequest(err.to_string())
            }
            Error::InvalidTransition { .. } => ApiError::Conflict(err.to_string()),
            Error::NotAuthorized(msg) => ApiError::Forbidden(msg),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::Upstream(msg) => ApiError::Upstream(msg),
        }
    }
}

impl From<pushdeck_db::DbError> for ApiError {
    fn from(err: pushdeck_db::DbError) -> Self {
        pushdeck_core::Error::from(err).into()
    }
}
