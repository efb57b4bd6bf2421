//! CalDAV client configuration.

use std::time::Duration;

use url::Url;

use crate::auth::Credentials;
use crate::error::{CalDavError, CalDavResult};

/// Configuration for the CalDAV client.
///
/// The base URL is kept as an opaque prefix: hrefs returned by the server are
/// resolved by plain concatenation.
#[derive(Debug, Clone)]
pub struct CalDavConfig {
    /// Scheme and authority of the server, without a trailing slash.
    pub base_url: String,

    /// Basic auth credentials.
    pub credentials: Option<Credentials>,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Reject invalid server certificates.
    pub verify_tls: bool,

    /// Sent as `User-Agent`.
    pub user_agent: String,
}

impl CalDavConfig {
    /// Default server, Apple's iCloud CalDAV endpoint.
    pub const DEFAULT_BASE_URL: &'static str = "https://caldav.icloud.com";

    /// Per-request timeout unless overridden, in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration for the given server.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the URL does not parse or is not
    /// http(s).
    pub fn new(base_url: impl AsRef<str>) -> CalDavResult<Self> {
        let raw = base_url.as_ref().trim();
        let parsed = Url::parse(raw).map_err(|e| {
            CalDavError::configuration(format!("invalid base URL {:?}: {}", raw, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CalDavError::configuration(format!(
                "base URL must be http or https, got {:?}",
                parsed.scheme()
            )));
        }

        Ok(Self {
            base_url: raw.trim_end_matches('/').to_string(),
            credentials: None,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            verify_tls: true,
            user_agent: format!("calbridge/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Sends Basic credentials with every request.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some(Credentials::new(username, password));
        self
    }

    /// Bounds each outbound request. There is no budget for a whole chain.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Accepts any server certificate. Local test servers only.
    pub fn with_insecure_tls(mut self) -> Self {
        self.verify_tls = false;
        self
    }

    /// Overrides `calbridge/<version>`.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Resolves a server href to a request URL.
    pub fn resolve_href(&self, href: &str) -> String {
        calbridge_core::href::resolve(&self.base_url, href)
    }

    /// Whether requests will carry an Authorization header.
    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_creation_strips_trailing_slash() {
        let config = CalDavConfig::new("https://caldav.example.com/").unwrap();
        assert_eq!(config.base_url, "https://caldav.example.com");
        assert!(!config.has_credentials());
        assert!(config.verify_tls);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = CalDavConfig::new(CalDavConfig::DEFAULT_BASE_URL)
            .unwrap()
            .with_credentials("user", "pass")
            .with_timeout(Duration::from_millis(1500))
            .with_insecure_tls()
            .with_user_agent("test-agent");

        assert!(config.has_credentials());
        assert_eq!(config.credentials.as_ref().map(|c| c.username()), Some("user"));
        assert_eq!(config.timeout, Duration::from_millis(1500));
        assert!(!config.verify_tls);
        assert_eq!(config.user_agent, "test-agent");
    }

    #[test]
    fn resolve_href_uses_base() {
        let config = CalDavConfig::new("https://caldav.example.com").unwrap();
        assert_eq!(
            config.resolve_href("/123/principal/"),
            "https://caldav.example.com/123/principal/"
        );
        assert_eq!(
            config.resolve_href("https://p01-caldav.icloud.com/123/calendars/"),
            "https://p01-caldav.icloud.com/123/calendars/"
        );
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(CalDavConfig::new("not a valid url").is_err());
        assert!(matches!(
            CalDavConfig::new("ftp://caldav.example.com"),
            Err(CalDavError::Configuration { .. })
        ));
    }
}
