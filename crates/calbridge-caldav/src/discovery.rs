//! Principal, calendar-home and calendar discovery (RFC 4791 section 7.1,
//! RFC 5397, RFC 6764).
//!
//! The chain is strictly sequential:
//!
//! ```text
//! current-user-principal ──▶ calendar-home-set ──▶ calendars (Depth: 1)
//! ```
//!
//! Nothing is cached between calls.

use tracing::{debug, info};

use calbridge_core::{CalendarEntry, CalendarListing};

use crate::body::{
    LEGACY_CALDAV_NS, PrincipalProperty, calendar_home_propfind, calendar_list_propfind,
    principal_propfind,
};
use crate::client::CalDavClient;
use crate::error::{CalDavError, CalDavResult, DiscoveryStep};
use crate::fallback::Fallback;
use crate::xml::{
    self, CALDAV_NS, CALENDAR_HOME_HREF, DISPLAY_NAME, MULTISTATUS_RESPONSE, PRINCIPAL_HREF,
    RESPONSE_HREF,
};

/// Bootstrap location of the CalDAV context path.
pub const WELL_KNOWN_CALDAV: &str = "/.well-known/caldav";

/// Server root.
pub const ROOT_PATH: &str = "/";

/// Where current-user-principal is asked for, in order.
pub const PRINCIPAL_PATHS: Fallback<&str> = Fallback::new(WELL_KNOWN_CALDAV, ROOT_PATH);

/// Namespace strings bound to the calendar prefix when listing calendars.
pub const CALENDAR_LISTING_NAMESPACES: Fallback<&str> =
    Fallback::new(LEGACY_CALDAV_NS, CALDAV_NS);

/// Extracts the principal href from a PROPFIND response.
pub fn parse_principal_href(body: &str) -> CalDavResult<Option<String>> {
    let root = xml::parse(body)?;
    Ok(xml::find_text(&root, PRINCIPAL_HREF))
}

/// Extracts the calendar-home-set href from a PROPFIND response.
pub fn parse_calendar_home(body: &str) -> CalDavResult<Option<String>> {
    let root = xml::parse(body)?;
    Ok(xml::find_text(&root, CALENDAR_HOME_HREF))
}

/// Extracts calendar collections from a Depth-1 PROPFIND response.
///
/// Every `<response>` with a non-empty href and a displayname element is
/// kept, in document order and without deduplication. The home collection
/// itself is included when the server names it.
pub fn parse_calendar_listing(body: &str) -> CalDavResult<Vec<CalendarEntry>> {
    let root = xml::parse(body)?;
    let entries = root
        .find_all_first_of(MULTISTATUS_RESPONSE)
        .into_iter()
        .filter_map(|response| {
            let href = xml::find_text(response, RESPONSE_HREF)?;
            let name = response.select_first(DISPLAY_NAME)?;
            Some(CalendarEntry::new(href, name.text().unwrap_or_default()))
        })
        .collect();
    Ok(entries)
}

impl CalDavClient {
    /// Finds the authenticated user's principal href.
    ///
    /// Asks for current-user-principal at the well-known path, then at the
    /// server root, then falls back to principal-URL at the root.
    pub async fn discover_principal(&self) -> CalDavResult<String> {
        let current = PRINCIPAL_PATHS
            .first_found(|path| self.probe_principal(path, PrincipalProperty::CurrentUserPrincipal))
            .await?;

        let principal = match current {
            Some(href) => Some(href),
            None => {
                debug!("No current-user-principal, trying principal-URL");
                self.probe_principal(ROOT_PATH, PrincipalProperty::PrincipalUrl)
                    .await?
            }
        };

        let principal = principal.ok_or(CalDavError::discovery(DiscoveryStep::Principal))?;
        info!(principal = %principal, "Discovered principal");
        Ok(principal)
    }

    async fn probe_principal(
        &self,
        path: &str,
        property: PrincipalProperty,
    ) -> CalDavResult<Option<String>> {
        let url = format!("{}{}", self.config().base_url, path);
        let body = self.propfind(&url, 0, principal_propfind(property)?).await?;
        let href = parse_principal_href(&body)?;
        debug!(url = %url, ?property, found = href.is_some(), "Principal probe");
        Ok(href)
    }

    /// Raw response of a current-user-principal PROPFIND at the server root.
    ///
    /// For diagnosing servers whose answers the parser does not understand.
    pub async fn principal_xml(&self) -> CalDavResult<String> {
        let url = format!("{}{}", self.config().base_url, ROOT_PATH);
        self.propfind(
            &url,
            0,
            principal_propfind(PrincipalProperty::CurrentUserPrincipal)?,
        )
        .await
    }

    /// Runs principal discovery, then returns the calendar home href.
    pub async fn discover_calendar_home(&self) -> CalDavResult<String> {
        let principal = self.discover_principal().await?;
        self.calendar_home_of(&principal).await
    }

    /// Returns the calendar home href of a known principal.
    pub async fn calendar_home_of(&self, principal_href: &str) -> CalDavResult<String> {
        let url = self.resolve(principal_href);
        let body = self.propfind(&url, 0, calendar_home_propfind()?).await?;
        let home = parse_calendar_home(&body)?.ok_or(CalDavError::discovery(DiscoveryStep::Home))?;
        info!(home = %home, "Discovered calendar home");
        Ok(home)
    }

    /// Runs the full discovery chain and lists the calendars.
    pub async fn list_calendars(&self) -> CalDavResult<CalendarListing> {
        let home = self.discover_calendar_home().await?;
        let items = self.calendars_in(&home).await?;
        Ok(CalendarListing { home, items })
    }

    /// Lists the calendar collections under a known calendar home.
    pub async fn calendars_in(&self, home_href: &str) -> CalDavResult<Vec<CalendarEntry>> {
        let url = self.resolve(home_href);
        let body = CALENDAR_LISTING_NAMESPACES
            .on_rejection(|namespace| {
                let url = url.as_str();
                async move {
                    self.propfind(url, 1, calendar_list_propfind(namespace)?)
                        .await
                }
            })
            .await?;

        let entries = parse_calendar_listing(&body)?;
        info!(home = %home_href, count = entries.len(), "Listed calendars");
        Ok(entries)
    }
}
