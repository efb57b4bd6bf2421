//! X-Api-Key gate.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::error::ApiError;
use crate::state::SharedState;

/// Header carrying the client's API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Rejects requests whose `X-Api-Key` does not match the configured key.
///
/// Does nothing when no key is configured.
pub async fn require_api_key(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(expected) = state.api_key() {
        let provided = request
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());

        if provided != Some(expected) {
            warn!(path = %request.uri().path(), "Rejected request with invalid API key");
            return ApiError::Unauthorized.into_response();
        }
    }

    next.run(request).await
}
