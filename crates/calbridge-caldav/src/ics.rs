//! Minimal iCalendar (RFC 5545) documents for event creation.
//!
//! Only what a server needs to accept a single VEVENT is written. Lines end
//! with CRLF. Newlines in the description become the two characters `\n`;
//! no other text escaping is done.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use calbridge_core::NewEvent;

/// PRODID of generated documents.
pub const PRODUCT_ID: &str = "-//Clockwork//Study//EN";

/// Suffix appended to the UID property (`{uid}@{UID_DOMAIN}`).
pub const UID_DOMAIN: &str = "clockwork";

/// Content type for PUT bodies.
pub const CALENDAR_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

const CRLF: &str = "\r\n";

/// Uppercases a caller-supplied UID, or generates a random hex one.
pub fn resolve_uid(uid: Option<&str>) -> String {
    match uid {
        Some(uid) if !uid.is_empty() => uid.to_uppercase(),
        _ => Uuid::new_v4().simple().to_string().to_uppercase(),
    }
}

/// Name of the event resource inside its collection.
pub fn resource_name(uid: &str) -> String {
    format!("{}.ics", uid)
}

/// Formats a datetime in compact UTC form, e.g. `20250205T143000Z`.
pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Escapes a description for a single content line.
pub fn escape_description(text: &str) -> String {
    text.replace('\n', "\\n")
}

/// Renders the VCALENDAR document for `event`.
///
/// `uid` must already be resolved (see [`resolve_uid`]) and `now` becomes
/// DTSTAMP, so the output is fully determined by the arguments.
pub fn render_event(event: &NewEvent, uid: &str, now: DateTime<Utc>) -> String {
    let description = escape_description(event.description.as_deref().unwrap_or_default());

    let lines = [
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{}", PRODUCT_ID),
        "CALSCALE:GREGORIAN".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}@{}", uid, UID_DOMAIN),
        format!("DTSTAMP:{}", format_timestamp(now)),
        format!("DTSTART:{}", event.start),
        format!("DTEND:{}", event.end),
        format!("SUMMARY:{}", event.summary),
        format!("DESCRIPTION:{}", description),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ];

    let mut document = lines.join(CRLF);
    document.push_str(CRLF);
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use icalendar::{Calendar, CalendarComponent, Component};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap()
    }

    fn standup() -> NewEvent {
        NewEvent::new(
            "/123/calendars/work/",
            "Standup",
            "20250101T090000Z",
            "20250101T093000Z",
        )
    }

    #[test]
    fn renders_exact_document() {
        let doc = render_event(&standup(), "ABC123", fixed_now());
        let expected = "BEGIN:VCALENDAR\r\n\
                        VERSION:2.0\r\n\
                        PRODID:-//Clockwork//Study//EN\r\n\
                        CALSCALE:GREGORIAN\r\n\
                        BEGIN:VEVENT\r\n\
                        UID:ABC123@clockwork\r\n\
                        DTSTAMP:20250101T080000Z\r\n\
                        DTSTART:20250101T090000Z\r\n\
                        DTEND:20250101T093000Z\r\n\
                        SUMMARY:Standup\r\n\
                        DESCRIPTION:\r\n\
                        END:VEVENT\r\n\
                        END:VCALENDAR\r\n";
        assert_eq!(doc, expected);
    }

    #[test]
    fn rendering_is_deterministic() {
        let event = standup().with_description("notes");
        assert_eq!(
            render_event(&event, "U1", fixed_now()),
            render_event(&event, "U1", fixed_now())
        );
    }

    #[test]
    fn every_line_ends_with_crlf() {
        let doc = render_event(&standup(), "U1", fixed_now());
        assert!(doc.ends_with("\r\n"));
        assert_eq!(doc.matches('\n').count(), doc.matches("\r\n").count());
        assert_eq!(doc.matches("\r\n").count(), 13);
    }

    #[test]
    fn description_newlines_are_escaped() {
        let event = standup().with_description("line one\nline two");
        let doc = render_event(&event, "U1", fixed_now());
        assert!(doc.contains("DESCRIPTION:line one\\nline two\r\n"));
        assert!(!doc.contains("line one\n"));
    }

    #[test]
    fn commas_and_semicolons_are_left_alone() {
        let event = NewEvent::new("/c/", "Lunch, maybe; later", "A", "B")
            .with_description("a,b;c");
        let doc = render_event(&event, "U1", fixed_now());
        assert!(doc.contains("SUMMARY:Lunch, maybe; later\r\n"));
        assert!(doc.contains("DESCRIPTION:a,b;c\r\n"));
    }

    #[test]
    fn document_parses_as_icalendar() {
        let event = standup().with_description("agenda\nitems");
        let doc = render_event(&event, "U1", fixed_now());
        let calendar: Calendar = doc.parse().unwrap();

        let events: Vec<_> = calendar
            .iter()
            .filter_map(|c| match c {
                CalendarComponent::Event(e) => Some(e),
                _ => None,
            })
            .collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].get_uid(), Some("U1@clockwork"));
        assert_eq!(events[0].get_summary(), Some("Standup"));
    }

    #[test]
    fn supplied_uid_is_uppercased() {
        assert_eq!(resolve_uid(Some("abc-def")), "ABC-DEF");
    }

    #[test]
    fn generated_uid_is_uppercase_hex() {
        let uid = resolve_uid(None);
        assert_eq!(uid.len(), 32);
        assert!(uid.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
        assert_ne!(uid, resolve_uid(None));
        assert_eq!(resolve_uid(Some("")).len(), 32);
    }

    #[test]
    fn resource_name_and_timestamp_format() {
        assert_eq!(resource_name("ABC"), "ABC.ics");
        let dt = Utc.with_ymd_and_hms(2025, 2, 5, 14, 30, 0).unwrap();
        assert_eq!(format_timestamp(dt), "20250205T143000Z");
    }
}
