//! Shared request state.

use std::sync::Arc;

use calbridge_caldav::CalDavClient;

use crate::error::{ApiError, ApiResult};

/// State shared by all handlers.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    client: Option<CalDavClient>,
    api_key: Option<String>,
}

/// Handle passed to the router.
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Creates state without a CalDAV client or API key.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the CalDAV client used by calendar endpoints.
    pub fn with_client(mut self, client: CalDavClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Requires clients to send this key in `X-Api-Key`.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// The configured API key, if any.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// The CalDAV client, or [`ApiError::Misconfigured`] without credentials.
    pub fn client(&self) -> ApiResult<&CalDavClient> {
        self.client.as_ref().ok_or(ApiError::Misconfigured)
    }

    pub fn into_shared(self) -> SharedState {
        Arc::new(self)
    }
}
