//! Event query, creation and deletion inside a known calendar collection.

use chrono::{DateTime, Utc};
use tracing::info;

use calbridge_core::href::join_member;
use calbridge_core::{CreatedEvent, EventItem, NewEvent, TimeRange};

use crate::body::calendar_query;
use crate::client::CalDavClient;
use crate::error::CalDavResult;
use crate::ics::{self, CALENDAR_CONTENT_TYPE};
use crate::transport::{DavMethod, DavRequest};
use crate::xml::{self, CALENDAR_DATA, MULTISTATUS_RESPONSE, RESPONSE_HREF};

/// Statuses accepted for a PUT creating a new resource.
pub const CREATE_OK: &[u16] = &[200, 201, 204];

/// Statuses accepted for a DELETE.
pub const DELETE_OK: &[u16] = &[200, 202, 204];

/// Extracts `(href, calendar-data)` pairs from a calendar-query response.
///
/// Responses missing either part are skipped. Order follows the document.
pub fn parse_event_items(body: &str) -> CalDavResult<Vec<EventItem>> {
    let root = xml::parse(body)?;
    let items = root
        .find_all_first_of(MULTISTATUS_RESPONSE)
        .into_iter()
        .filter_map(|response| {
            let href = xml::find_text(response, RESPONSE_HREF)?;
            let data = xml::find_text(response, CALENDAR_DATA)?;
            Some(EventItem::new(href, data))
        })
        .collect();
    Ok(items)
}

impl CalDavClient {
    /// Returns the events of a calendar overlapping `range`.
    ///
    /// The bounds are passed to the server untouched.
    pub async fn query_events(
        &self,
        calendar_href: &str,
        range: &TimeRange,
    ) -> CalDavResult<Vec<EventItem>> {
        let url = self.resolve(calendar_href);
        let body = self
            .report(&url, 1, calendar_query(&range.start, &range.end)?)
            .await?;
        let items = parse_event_items(&body)?;
        info!(
            calendar = %calendar_href,
            start = %range.start,
            end = %range.end,
            count = items.len(),
            "Queried events"
        );
        Ok(items)
    }

    /// Creates `event` stamped with the current time.
    pub async fn create_event(&self, event: &NewEvent) -> CalDavResult<CreatedEvent> {
        self.create_event_at(event, Utc::now()).await
    }

    /// Creates `event` with `now` as DTSTAMP.
    ///
    /// Refuses to overwrite an existing resource (`If-None-Match: *`).
    pub async fn create_event_at(
        &self,
        event: &NewEvent,
        now: DateTime<Utc>,
    ) -> CalDavResult<CreatedEvent> {
        let uid = ics::resolve_uid(event.uid.as_deref());
        let href = join_member(&event.calendar_href, &ics::resource_name(&uid));
        let document = ics::render_event(event, &uid, now);

        let request = DavRequest::new(DavMethod::Put, self.resolve(&href))
            .with_header("If-None-Match", "*")
            .with_body(CALENDAR_CONTENT_TYPE, document);
        self.expect_status(request, CREATE_OK).await?;

        info!(uid = %uid, href = %href, "Created event");
        Ok(CreatedEvent { uid, href })
    }

    /// Deletes the event resource at `href`.
    pub async fn delete_event(&self, href: &str) -> CalDavResult<()> {
        let request = DavRequest::new(DavMethod::Delete, self.resolve(href));
        self.expect_status(request, DELETE_OK).await?;
        info!(href = %href, "Deleted event");
        Ok(())
    }
}
