//! CalDAV client for calbridge.
//!
//! - [`CalDavClient`] - discovery, calendar listing and event operations
//! - [`CalDavConfig`] - base URL, credentials and timeouts
//! - [`Transport`] - the HTTP seam ([`HttpTransport`] in production,
//!   [`ScriptedTransport`] in tests)
//! - [`CalDavError`] - error types with their caller-facing status mapping
//!
//! # Discovery
//!
//! ```text
//! {base}/.well-known/caldav ─┐
//! {base}/ ───────────────────┼─ current-user-principal / principal-URL
//!                            ▼
//!                      principal href ── calendar-home-set
//!                                              ▼
//!                                        calendar home ── Depth: 1 listing
//! ```
//!
//! # Example
//!
//! ```ignore
//! use calbridge_caldav::{CalDavClient, CalDavConfig};
//!
//! let config = CalDavConfig::new("https://caldav.icloud.com")?
//!     .with_credentials("user@example.com", "app-password");
//! let client = CalDavClient::new(config)?;
//! let listing = client.list_calendars().await?;
//! ```

pub mod auth;
pub mod body;
pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod events;
pub mod fallback;
pub mod http;
pub mod ics;
pub mod transport;
pub mod xml;

pub use auth::Credentials;
pub use client::CalDavClient;
pub use config::CalDavConfig;
pub use error::{CalDavError, CalDavResult, DiscoveryStep};
pub use fallback::Fallback;
pub use http::HttpTransport;
pub use transport::{BoxFuture, DavMethod, DavRequest, DavResponse, ScriptedTransport, Transport};
