//! Href resolution.
//!
//! CalDAV servers hand back hrefs either as absolute paths on the same
//! authority (`/123/calendars/work/`) or as fully qualified URLs. Requests
//! always need the latter.

/// Returns true if `href` already carries a scheme and authority.
pub fn is_absolute(href: &str) -> bool {
    href.starts_with("http://") || href.starts_with("https://")
}

/// Resolves `href` against `base`.
///
/// Absolute hrefs are returned unchanged; anything else gets `base`
/// prefixed exactly once. Applying it twice yields the same URL.
pub fn resolve(base: &str, href: &str) -> String {
    if is_absolute(href) {
        href.to_string()
    } else {
        format!("{}{}", base, href)
    }
}

/// Joins a collection href and a member resource name with a single `/`.
pub fn join_member(collection: &str, member: &str) -> String {
    if collection.ends_with('/') {
        format!("{}{}", collection, member)
    } else {
        format!("{}/{}", collection, member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://caldav.example.com";

    #[test]
    fn relative_href_gets_base_prefix() {
        assert_eq!(
            resolve(BASE, "/123/calendars/work/"),
            "https://caldav.example.com/123/calendars/work/"
        );
    }

    #[test]
    fn absolute_href_is_unchanged() {
        let href = "https://p42-caldav.icloud.com/123/calendars/";
        assert_eq!(resolve(BASE, href), href);
        assert_eq!(resolve(BASE, "http://plain.example.com/x"), "http://plain.example.com/x");
    }

    #[test]
    fn resolution_is_idempotent() {
        for href in [
            "/123/principal/",
            "/",
            "",
            "https://other.example.com/cal/",
            "relative/path",
        ] {
            let once = resolve(BASE, href);
            assert_eq!(resolve(BASE, &once), once, "href {:?}", href);
        }
    }

    #[test]
    fn join_member_inserts_single_slash() {
        assert_eq!(join_member("/cal/work/", "A.ics"), "/cal/work/A.ics");
        assert_eq!(join_member("/cal/work", "A.ics"), "/cal/work/A.ics");
    }
}
