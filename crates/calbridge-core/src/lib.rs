//! Core types for calbridge.
//!
//! This crate holds the pieces shared by the CalDAV layer and the HTTP
//! bridge:
//!
//! - [`href`] - resolution of server hrefs against a base authority
//! - [`calendar`] - calendar listings, event query results and event payloads
//! - [`tracing`] - subscriber setup used by the binaries

pub mod calendar;
pub mod href;
pub mod tracing;

pub use calendar::{CalendarEntry, CalendarListing, CreatedEvent, EventItem, NewEvent, TimeRange};
