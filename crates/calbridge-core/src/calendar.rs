//! Calendar listing and event types.
//!
//! Timestamps travel as compact UTC strings (`YYYYMMDDThhmmssZ`). They are
//! forwarded to the server as given and never parsed here.

use serde::{Deserialize, Serialize};

/// A calendar collection found under the calendar home.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    /// Collection href as returned by the server.
    pub href: String,
    /// The collection's display name (may be empty).
    #[serde(rename = "displayname")]
    pub display_name: String,
}

impl CalendarEntry {
    /// Creates a new calendar entry.
    pub fn new(href: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            display_name: display_name.into(),
        }
    }
}

/// Calendars found under a calendar home, in server order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarListing {
    /// The calendar home href the listing was read from.
    pub home: String,
    /// One entry per calendar collection.
    pub items: Vec<CalendarEntry>,
}

/// One event returned by a time-range query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventItem {
    /// Event resource href.
    pub href: String,
    /// Raw iCalendar document text.
    #[serde(rename = "ics")]
    pub document: String,
}

impl EventItem {
    /// Creates a new event item.
    pub fn new(href: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            document: document.into(),
        }
    }
}

/// A UTC time window, both bounds in `YYYYMMDDThhmmssZ` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

impl TimeRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// An event to be created in a calendar collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    /// Target calendar collection href.
    pub calendar_href: String,
    /// Event title.
    pub summary: String,
    /// Start, `YYYYMMDDThhmmssZ`.
    pub start: String,
    /// End, `YYYYMMDDThhmmssZ`.
    pub end: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Optional caller-supplied UID. A random one is generated otherwise.
    pub uid: Option<String>,
}

impl NewEvent {
    /// Creates a new event without description or UID.
    pub fn new(
        calendar_href: impl Into<String>,
        summary: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        Self {
            calendar_href: calendar_href.into(),
            summary: summary.into(),
            start: start.into(),
            end: end.into(),
            description: None,
            uid: None,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the UID.
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }
}

/// Outcome of a successful event creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedEvent {
    /// The (uppercased) UID used for the document and the resource name.
    pub uid: String,
    /// The new event's href, relative to the calendar href given.
    pub href: String,
}
