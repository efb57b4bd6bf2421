//! Request bodies for PROPFIND and REPORT.

use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

use crate::error::{CalDavError, CalDavResult};
use crate::xml::{CALDAV_NS, DAV_NS};

/// The calendar namespace as written by the first calendar-listing attempt.
///
/// The doubled `ietf:` segment is not the registered CalDAV namespace, but
/// some servers accept it. See [`CALENDAR_LISTING_NAMESPACES`](crate::discovery::CALENDAR_LISTING_NAMESPACES).
pub const LEGACY_CALDAV_NS: &str = "urn:ietf:ietf:params:xml:ns:caldav";

/// Which principal property a discovery PROPFIND asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalProperty {
    CurrentUserPrincipal,
    PrincipalUrl,
}

impl PrincipalProperty {
    pub fn element_name(&self) -> &'static str {
        match self {
            Self::CurrentUserPrincipal => "D:current-user-principal",
            Self::PrincipalUrl => "D:principal-URL",
        }
    }
}

/// `<D:propfind xmlns:D="DAV:"><D:prop><D:{property}/></D:prop></D:propfind>`
pub fn principal_propfind(property: PrincipalProperty) -> CalDavResult<String> {
    let mut body = BodyWriter::new()?;
    let mut propfind = BytesStart::new("D:propfind");
    propfind.push_attribute(("xmlns:D", DAV_NS));
    body.start(propfind)?;
    body.start(BytesStart::new("D:prop"))?;
    body.empty(property.element_name())?;
    body.end("D:prop")?;
    body.end("D:propfind")?;
    body.finish()
}

/// PROPFIND body asking for `calendar-home-set`.
pub fn calendar_home_propfind() -> CalDavResult<String> {
    let mut body = BodyWriter::new()?;
    let mut propfind = BytesStart::new("D:propfind");
    propfind.push_attribute(("xmlns:D", DAV_NS));
    propfind.push_attribute(("xmlns:C", CALDAV_NS));
    body.start(propfind)?;
    body.start(BytesStart::new("D:prop"))?;
    body.empty("C:calendar-home-set")?;
    body.end("D:prop")?;
    body.end("D:propfind")?;
    body.finish()
}

/// Depth-1 PROPFIND body listing calendar collections.
///
/// `caldav_ns` is bound to the `C:` prefix.
pub fn calendar_list_propfind(caldav_ns: &str) -> CalDavResult<String> {
    let mut body = BodyWriter::new()?;
    let mut propfind = BytesStart::new("D:propfind");
    propfind.push_attribute(("xmlns:D", DAV_NS));
    propfind.push_attribute(("xmlns:C", caldav_ns));
    body.start(propfind)?;
    body.start(BytesStart::new("D:prop"))?;
    body.empty("D:displayname")?;
    body.empty("C:supported-calendar-component-set")?;
    body.empty("D:resourcetype")?;
    body.end("D:prop")?;
    body.end("D:propfind")?;
    body.finish()
}

/// REPORT calendar-query body selecting VEVENTs in `[start, end)`.
///
/// Both bounds are written as given.
pub fn calendar_query(start: &str, end: &str) -> CalDavResult<String> {
    let mut body = BodyWriter::new()?;

    let mut query = BytesStart::new("c:calendar-query");
    query.push_attribute(("xmlns:d", DAV_NS));
    query.push_attribute(("xmlns:c", CALDAV_NS));
    body.start(query)?;

    body.start(BytesStart::new("d:prop"))?;
    body.empty("d:getetag")?;
    body.empty("c:calendar-data")?;
    body.end("d:prop")?;

    body.start(BytesStart::new("c:filter"))?;

    let mut vcalendar = BytesStart::new("c:comp-filter");
    vcalendar.push_attribute(("name", "VCALENDAR"));
    body.start(vcalendar)?;

    let mut vevent = BytesStart::new("c:comp-filter");
    vevent.push_attribute(("name", "VEVENT"));
    body.start(vevent)?;

    let mut time_range = BytesStart::new("c:time-range");
    time_range.push_attribute(("start", start));
    time_range.push_attribute(("end", end));
    body.write(Event::Empty(time_range))?;

    body.end("c:comp-filter")?; // VEVENT
    body.end("c:comp-filter")?; // VCALENDAR
    body.end("c:filter")?;
    body.end("c:calendar-query")?;
    body.finish()
}

/// Thin wrapper over [`Writer`] that maps write failures to [`CalDavError`].
struct BodyWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl BodyWriter {
    /// Starts a document with `<?xml version="1.0"?>`.
    fn new() -> CalDavResult<Self> {
        let mut body = Self {
            writer: Writer::new(Cursor::new(Vec::new())),
        };
        body.write(Event::Decl(BytesDecl::new("1.0", None, None)))?;
        Ok(body)
    }

    fn write(&mut self, event: Event<'_>) -> CalDavResult<()> {
        self.writer
            .write_event(event)
            .map_err(|e| CalDavError::internal(format!("Failed to write request body: {}", e)))
    }

    fn start(&mut self, element: BytesStart<'_>) -> CalDavResult<()> {
        self.write(Event::Start(element))
    }

    fn empty(&mut self, name: &str) -> CalDavResult<()> {
        self.write(Event::Empty(BytesStart::new(name)))
    }

    fn end(&mut self, name: &str) -> CalDavResult<()> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn finish(self) -> CalDavResult<String> {
        String::from_utf8(self.writer.into_inner().into_inner())
            .map_err(|e| CalDavError::internal(format!("Request body is not UTF-8: {}", e)))
    }
}
