//! reqwest-backed [`Transport`].
//!
//! Sends Basic credentials preemptively on every request, follows
//! redirects and applies the configured per-request timeout.

use reqwest::header::AUTHORIZATION;
use reqwest::redirect::Policy;
use reqwest::{Client, Method};
use tracing::trace;

use crate::auth::Credentials;
use crate::config::CalDavConfig;
use crate::error::{CalDavError, CalDavResult};
use crate::transport::{BoxFuture, DavRequest, DavResponse, Transport};

/// Maximum number of redirects followed per request.
const MAX_REDIRECTS: usize = 10;

/// HTTP transport for CalDAV operations.
pub struct HttpTransport {
    /// The underlying HTTP client.
    client: Client,
    /// Basic auth credentials, if configured.
    credentials: Option<Credentials>,
}

impl HttpTransport {
    /// Creates a new transport from the client configuration.
    pub fn new(config: &CalDavConfig) -> CalDavResult<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(!config.verify_tls)
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| {
                CalDavError::configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            credentials: config.credentials.clone(),
        })
    }

    async fn execute(&self, request: DavRequest) -> CalDavResult<DavResponse> {
        let method = Method::from_bytes(request.method.as_str().as_bytes()).map_err(|_| {
            CalDavError::internal(format!("Invalid HTTP method: {}", request.method))
        })?;

        let mut builder = self.client.request(method, &request.url);

        if let Some(ref credentials) = self.credentials {
            builder = builder.header(AUTHORIZATION, credentials.authorization_header());
        }

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        trace!(method = %request.method, url = %request.url, "Sending request");

        let response = builder
            .send()
            .await
            .map_err(|e| CalDavError::transport(e.to_string()))?;

        let status = response.status().as_u16();
        trace!(status, "Received response");

        let body = response
            .text()
            .await
            .map_err(|e| CalDavError::transport(format!("Failed to read response: {}", e)))?;

        Ok(DavResponse { status, body })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: DavRequest) -> BoxFuture<'_, CalDavResult<DavResponse>> {
        Box::pin(self.execute(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn transport_creation() {
        let config = CalDavConfig::new("https://caldav.example.com/")
            .unwrap()
            .with_credentials("user", "pass")
            .with_timeout(Duration::from_secs(10));

        let transport = HttpTransport::new(&config);
        assert!(transport.is_ok());
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        // Port 9 (discard) on loopback is closed on any sane test machine.
        let config = CalDavConfig::new("http://127.0.0.1:9")
            .unwrap()
            .with_timeout(Duration::from_secs(2));
        let transport = HttpTransport::new(&config).unwrap();

        let result = transport
            .send(DavRequest::new(
                crate::transport::DavMethod::Propfind,
                "http://127.0.0.1:9/",
            ))
            .await;

        assert!(matches!(result, Err(CalDavError::Transport { .. })));
    }
}
