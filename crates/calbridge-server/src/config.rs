//! Server configuration from command-line flags and environment.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

use calbridge_caldav::{CalDavConfig, CalDavError, CalDavResult};

/// calbridge - JSON bridge to a CalDAV account
#[derive(Debug, Clone, Parser)]
#[command(name = "calbridge")]
#[command(author, version, about, long_about = None)]
pub struct ServerConfig {
    /// CalDAV server base URL
    #[arg(long, env = "BASE_URL", default_value = CalDavConfig::DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Account name for the CalDAV server
    #[arg(long, env = "APPLE_ID")]
    pub apple_id: Option<String>,

    /// App-specific password for the CalDAV server
    #[arg(long, env = "APPLE_APP_PASSWORD", hide_env_values = true)]
    pub apple_app_password: Option<String>,

    /// Key clients must send in X-Api-Key (no check when unset)
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Per-request timeout for outbound calls, in seconds
    #[arg(long, env = "HTTP_TIMEOUT", default_value_t = 30.0)]
    pub http_timeout: f64,

    /// Address to listen on
    #[arg(long, env = "CALBRIDGE_LISTEN", default_value = "127.0.0.1:8000")]
    pub listen: SocketAddr,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl ServerConfig {
    /// Builds the CalDAV configuration.
    ///
    /// Returns `Ok(None)` when the account credentials are incomplete. The
    /// server still starts in that case and answers calendar requests with
    /// a configuration error.
    pub fn caldav_config(&self) -> CalDavResult<Option<CalDavConfig>> {
        let (Some(user), Some(password)) = (
            non_empty(self.apple_id.as_deref()),
            non_empty(self.apple_app_password.as_deref()),
        ) else {
            return Ok(None);
        };

        let timeout = Duration::try_from_secs_f64(self.http_timeout).map_err(|e| {
            CalDavError::configuration(format!("Invalid HTTP timeout {}: {}", self.http_timeout, e))
        })?;

        let config = CalDavConfig::new(&self.base_url)?
            .with_credentials(user, password)
            .with_timeout(timeout);
        Ok(Some(config))
    }

    /// The configured API key, ignoring an empty value.
    pub fn api_key(&self) -> Option<&str> {
        non_empty(self.api_key.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
