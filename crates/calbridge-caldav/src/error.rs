//! Error types for CalDAV operations.
//!
//! Every operation either fully succeeds or fails with one of these; partial
//! results are never returned.

use std::fmt;

use thiserror::Error;

/// A discovery step whose expected property was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscoveryStep {
    /// current-user-principal / principal-URL.
    Principal,
    /// calendar-home-set.
    Home,
}

impl DiscoveryStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Principal => "principal",
            Self::Home => "home",
        }
    }
}

impl fmt::Display for DiscoveryStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error raised while talking to a CalDAV server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalDavError {
    /// The outbound request could not complete (connection refused, DNS, timeout).
    #[error("Upstream request failed: {message}")]
    Transport { message: String },

    /// The server answered with a non-success status.
    #[error("{}", upstream_message(*status, body))]
    Upstream { status: u16, body: String },

    /// A response that should have been XML could not be parsed.
    #[error("Failed to parse XML from server: {message}")]
    MalformedResponse { message: String },

    /// A well-formed response lacked the property a discovery step needs.
    #[error("{}", discovery_message(*step))]
    DiscoveryFailed { step: DiscoveryStep },

    /// Invalid or missing configuration.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected local failure (request serialization and the like).
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalDavError {
    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates an upstream error carrying the server's status and body.
    pub fn upstream(status: u16, body: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            body: body.into(),
        }
    }

    /// Creates a malformed response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Creates a discovery failure for the given step.
    pub fn discovery(step: DiscoveryStep) -> Self {
        Self::DiscoveryFailed { step }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if the server itself rejected the request.
    ///
    /// Only these failures are eligible for the single alternate attempt of
    /// a [`Fallback`](crate::fallback::Fallback).
    pub fn is_upstream_rejection(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }

    /// The HTTP status a caller-facing API should answer with.
    ///
    /// Upstream statuses pass through untouched.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Transport { .. } | Self::MalformedResponse { .. } => 502,
            Self::Upstream { status, .. } => *status,
            Self::DiscoveryFailed { .. } | Self::Configuration { .. } | Self::Internal { .. } => {
                500
            }
        }
    }
}

/// The server body, or the status' reason phrase when the body is empty.
fn upstream_message(status: u16, body: &str) -> String {
    if !body.is_empty() {
        return body.to_string();
    }
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status))
}

fn discovery_message(step: DiscoveryStep) -> &'static str {
    match step {
        DiscoveryStep::Principal => "Could not parse principal href",
        DiscoveryStep::Home => "Could not parse calendar-home-set",
    }
}

/// A specialized Result type for CalDAV operations.
pub type CalDavResult<T> = Result<T, CalDavError>;
