//! Server error types and their JSON rendering.

use std::io;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use calbridge_caldav::CalDavError;

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding or serving failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Invalid CalDAV configuration.
    #[error(transparent)]
    Config(#[from] CalDavError),
}

/// Result type for server start-up.
pub type ServerResult<T> = Result<T, ServerError>;

/// Result type for request handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned to bridge clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or wrong X-Api-Key.
    #[error("Invalid API key")]
    Unauthorized,

    /// Account credentials were not configured.
    #[error("Server misconfigured: APPLE_ID or APPLE_APP_PASSWORD missing")]
    Misconfigured,

    /// The request body could not be read.
    #[error("{message}")]
    InvalidRequest { message: String },

    /// A CalDAV operation failed.
    #[error(transparent)]
    CalDav(#[from] CalDavError),
}

impl ApiError {
    /// Creates an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Misconfigured => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidRequest { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::CalDav(err) => {
                StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::BAD_GATEWAY)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid_request(rejection.body_text())
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        }
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calbridge_caldav::DiscoveryStep;

    #[test]
    fn status_mapping() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Misconfigured.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(CalDavError::transport("refused")).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(CalDavError::upstream(412, "")).status(),
            StatusCode::PRECONDITION_FAILED
        );
        assert_eq!(
            ApiError::from(CalDavError::discovery(DiscoveryStep::Home)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn messages_pass_through() {
        assert_eq!(
            ApiError::from(CalDavError::upstream(404, "gone")).to_string(),
            "gone"
        );
        assert_eq!(
            ApiError::Misconfigured.to_string(),
            "Server misconfigured: APPLE_ID or APPLE_APP_PASSWORD missing"
        );
    }
}
