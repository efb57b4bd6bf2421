//! Namespace-aware parsing of WebDAV multistatus responses.
//!
//! Responses are parsed into a small [`Element`] tree whose names carry the
//! resolved namespace URI instead of the prefix, so `<d:href>`, `<D:href>`
//! and `<href xmlns="DAV:">` all look the same. Properties are then looked
//! up with ordered tables of candidate [`XmlPath`]s: the first candidate
//! that yields non-empty text wins. Servers that spell things differently
//! are supported by appending a candidate, not by new lookup code.

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;

use crate::error::{CalDavError, CalDavResult};

/// DAV namespace
pub const DAV_NS: &str = "DAV:";
/// CalDAV namespace
pub const CALDAV_NS: &str = "urn:ietf:params:xml:ns:caldav";

/// A qualified element name. `namespace: None` matches any namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QName {
    pub namespace: Option<&'static str>,
    pub local: &'static str,
}

impl QName {
    /// A name in the DAV namespace.
    pub const fn dav(local: &'static str) -> Self {
        Self {
            namespace: Some(DAV_NS),
            local,
        }
    }

    /// A name in the CalDAV namespace.
    pub const fn caldav(local: &'static str) -> Self {
        Self {
            namespace: Some(CALDAV_NS),
            local,
        }
    }

    /// A local name in whatever namespace (or none).
    pub const fn any(local: &'static str) -> Self {
        Self {
            namespace: None,
            local,
        }
    }
}

/// A path of element names, anchored at the context element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XmlPath {
    /// Whether the first step may match at any depth (`.//a/b`) or only
    /// among direct children (`a/b`).
    pub deep: bool,
    pub steps: &'static [QName],
}

impl XmlPath {
    /// `.//steps[0]/steps[1]/...`
    pub const fn descendant(steps: &'static [QName]) -> Self {
        Self { deep: true, steps }
    }

    /// `steps[0]/steps[1]/...`
    pub const fn child(steps: &'static [QName]) -> Self {
        Self { deep: false, steps }
    }
}

/// Where the principal href lives in a PROPFIND response.
pub const PRINCIPAL_HREF: &[XmlPath] = &[
    XmlPath::descendant(&[QName::dav("current-user-principal"), QName::dav("href")]),
    XmlPath::descendant(&[QName::dav("principal-URL"), QName::dav("href")]),
    XmlPath::descendant(&[QName::any("current-user-principal"), QName::any("href")]),
    XmlPath::descendant(&[QName::any("principal-URL"), QName::any("href")]),
];

/// Where the calendar home href lives in a PROPFIND response.
pub const CALENDAR_HOME_HREF: &[XmlPath] = &[
    XmlPath::descendant(&[QName::caldav("calendar-home-set"), QName::dav("href")]),
    XmlPath::descendant(&[QName::any("calendar-home-set"), QName::any("href")]),
];

/// The per-resource blocks of a multistatus document.
pub const MULTISTATUS_RESPONSE: &[QName] = &[QName::dav("response"), QName::any("response")];

/// The resource href of one `<response>`.
pub const RESPONSE_HREF: &[XmlPath] = &[
    XmlPath::child(&[QName::dav("href")]),
    XmlPath::child(&[QName::any("href")]),
];

/// A collection's display name within one `<response>`.
pub const DISPLAY_NAME: &[XmlPath] = &[
    XmlPath::descendant(&[QName::dav("displayname")]),
    XmlPath::descendant(&[QName::any("displayname")]),
];

/// The iCalendar payload within one `<response>`.
pub const CALENDAR_DATA: &[XmlPath] = &[
    XmlPath::descendant(&[QName::caldav("calendar-data")]),
    XmlPath::descendant(&[QName::any("calendar-data")]),
];

/// An XML element with its namespace resolved.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Namespace URI, if the element is in one.
    pub namespace: Option<String>,
    /// Local name.
    pub name: String,
    /// Concatenated character data directly inside this element, untrimmed.
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    /// Returns true if this element has the given name.
    pub fn is(&self, name: &QName) -> bool {
        self.name == name.local
            && name
                .namespace
                .is_none_or(|ns| self.namespace.as_deref() == Some(ns))
    }

    /// Trimmed text content, `None` when empty.
    pub fn text(&self) -> Option<&str> {
        let text = self.text.trim();
        (!text.is_empty()).then_some(text)
    }

    /// All descendants in document order, excluding `self`.
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out);
        out
    }

    fn collect_descendants<'a>(&'a self, out: &mut Vec<&'a Element>) {
        for child in &self.children {
            out.push(child);
            child.collect_descendants(out);
        }
    }

    /// All descendants with the given name, in document order.
    pub fn find_all(&self, name: &QName) -> Vec<&Element> {
        self.descendants()
            .into_iter()
            .filter(|e| e.is(name))
            .collect()
    }

    /// Descendants matching the first candidate name that matches anything.
    pub fn find_all_first_of(&self, candidates: &[QName]) -> Vec<&Element> {
        candidates
            .iter()
            .map(|name| self.find_all(name))
            .find(|found| !found.is_empty())
            .unwrap_or_default()
    }

    /// All elements reached by `path`, in document order.
    pub fn select(&self, path: &XmlPath) -> Vec<&Element> {
        let Some((first, rest)) = path.steps.split_first() else {
            return Vec::new();
        };

        let mut current: Vec<&Element> = if path.deep {
            self.find_all(first)
        } else {
            self.children.iter().filter(|e| e.is(first)).collect()
        };

        for step in rest {
            current = current
                .into_iter()
                .flat_map(|e| e.children.iter().filter(|c| c.is(step)))
                .collect();
        }
        current
    }

    /// The first element reached by any candidate, tried in order.
    pub fn select_first(&self, candidates: &[XmlPath]) -> Option<&Element> {
        candidates
            .iter()
            .find_map(|path| self.select(path).into_iter().next())
    }
}

/// Returns the first non-empty trimmed text reached by the candidates,
/// trying them in order.
pub fn find_text(root: &Element, candidates: &[XmlPath]) -> Option<String> {
    candidates.iter().find_map(|path| {
        root.select(path)
            .into_iter()
            .find_map(Element::text)
            .map(str::to_string)
    })
}

/// Parses an XML document into its root [`Element`].
///
/// # Errors
///
/// Returns [`CalDavError::MalformedResponse`] for anything that is not a
/// single well-formed, namespace-valid element tree.
pub fn parse(xml: &str) -> CalDavResult<Element> {
    let mut reader = NsReader::from_str(xml);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let (resolved, event) = reader
            .read_resolved_event()
            .map_err(|e| CalDavError::malformed(e.to_string()))?;

        match event {
            Event::Start(start) => {
                let element = open_element(resolved, &start)?;
                if stack.is_empty() && root.is_some() {
                    return Err(CalDavError::malformed("multiple root elements"));
                }
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = open_element(resolved, &start)?;
                close_element(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| CalDavError::malformed("unexpected closing tag"))?;
                close_element(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| CalDavError::malformed(e.to_string()))?;
                append_text(&mut stack, &text)?;
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data).into_owned();
                append_text(&mut stack, &text)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(CalDavError::malformed("unexpected end of document"));
    }
    root.ok_or_else(|| CalDavError::malformed("no root element"))
}

fn open_element(resolved: ResolveResult<'_>, start: &BytesStart<'_>) -> CalDavResult<Element> {
    let namespace = match resolved {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        ResolveResult::Unbound => None,
        ResolveResult::Unknown(prefix) => {
            return Err(CalDavError::malformed(format!(
                "unbound namespace prefix {:?}",
                String::from_utf8_lossy(&prefix)
            )));
        }
    };

    Ok(Element {
        namespace,
        name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
        ..Element::default()
    })
}

fn close_element(
    stack: &mut Vec<Element>,
    root: &mut Option<Element>,
    element: Element,
) -> CalDavResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(CalDavError::malformed("multiple root elements")),
    }
    Ok(())
}

fn append_text(stack: &mut [Element], text: &str) -> CalDavResult<()> {
    match stack.last_mut() {
        Some(element) => {
            element.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(CalDavError::malformed("text outside of the root element")),
    }
}
