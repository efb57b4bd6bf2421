//! The CalDAV client.
//!
//! [`CalDavClient`] owns the configuration and a [`Transport`]. It keeps no
//! other state: every call re-runs whatever requests it needs, so one
//! client can serve any number of concurrent operations through `&self`.
//! The operations themselves live in [`discovery`](crate::discovery) and
//! [`events`](crate::events).

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::CalDavConfig;
use crate::error::{CalDavError, CalDavResult};
use crate::http::HttpTransport;
use crate::transport::{DavMethod, DavRequest, DavResponse, Transport};

/// Client for one CalDAV account.
#[derive(Clone)]
pub struct CalDavClient {
    config: CalDavConfig,
    transport: Arc<dyn Transport>,
}

impl CalDavClient {
    /// Creates a client talking HTTP to the configured server.
    pub fn new(config: CalDavConfig) -> CalDavResult<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Creates a client over an arbitrary transport.
    pub fn with_transport(config: CalDavConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CalDavConfig {
        &self.config
    }

    /// Resolves a server href to a request URL.
    pub fn resolve(&self, href: &str) -> String {
        self.config.resolve_href(href)
    }

    /// Performs a PROPFIND and returns the response body.
    pub(crate) async fn propfind(&self, url: &str, depth: u8, body: String) -> CalDavResult<String> {
        let request = DavRequest::new(DavMethod::Propfind, url)
            .with_depth(depth)
            .with_xml_body(body);
        Ok(self.dav(request).await?.body)
    }

    /// Performs a REPORT and returns the response body.
    pub(crate) async fn report(&self, url: &str, depth: u8, body: String) -> CalDavResult<String> {
        let request = DavRequest::new(DavMethod::Report, url)
            .with_depth(depth)
            .with_xml_body(body);
        Ok(self.dav(request).await?.body)
    }

    /// Sends a request, treating any status from 400 up as an upstream error.
    pub(crate) async fn dav(&self, request: DavRequest) -> CalDavResult<DavResponse> {
        let method = request.method;
        let url = request.url.clone();
        let response = self.send(request).await?;
        if response.is_error() {
            warn!(%method, %url, status = response.status, "Upstream rejected request");
            return Err(CalDavError::upstream(response.status, response.body));
        }
        Ok(response)
    }

    /// Sends a request and requires one of `accepted` statuses.
    pub(crate) async fn expect_status(
        &self,
        request: DavRequest,
        accepted: &[u16],
    ) -> CalDavResult<DavResponse> {
        let method = request.method;
        let url = request.url.clone();
        let response = self.send(request).await?;
        if !accepted.contains(&response.status) {
            warn!(%method, %url, status = response.status, "Unexpected upstream status");
            return Err(CalDavError::upstream(response.status, response.body));
        }
        Ok(response)
    }

    async fn send(&self, request: DavRequest) -> CalDavResult<DavResponse> {
        debug!(
            method = %request.method,
            url = %request.url,
            depth = request.header("Depth").unwrap_or("-"),
            "Sending CalDAV request"
        );
        self.transport.send(request).await
    }
}

impl std::fmt::Debug for CalDavClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalDavClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
