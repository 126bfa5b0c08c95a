//! URL handling module for Site-Freezer
//!
//! This module decides which anchors found in a frozen page are followed,
//! resolves relative links against the page they appear on, and derives the
//! identities used for deduplication.

use url::Url;

/// Origin used to resolve site-relative links; never contacted
const LOCAL_ORIGIN: &str = "http://site-freezer.invalid/";

/// Schemes that never name a page of the site
const IGNORED_SCHEMES: &[&str] = &["mailto:", "tel:", "javascript:", "data:"];

/// Classification of an anchor target found in a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkClass {
    /// A page of this site, resolved to a rooted path (query kept)
    Local(String),
    /// Points at another host (`//host/...` or `scheme://...`)
    External,
    /// Not a page at all (fragment-only, mailto:, javascript:, ...)
    Ignored,
}

/// Returns true for protocol-relative (`//host`) and absolute (`scheme://`) links
///
/// # Examples
///
/// ```
/// use site_freezer::url::is_external_link;
///
/// assert!(is_external_link("//cdn.example.com/app.js"));
/// assert!(is_external_link("https://example.com/"));
/// assert!(!is_external_link("/hello"));
/// assert!(!is_external_link("mailto:someone@example.com"));
/// ```
pub fn is_external_link(href: &str) -> bool {
    if href.starts_with("//") {
        return true;
    }

    match href.split_once("://") {
        Some((scheme, _)) => {
            !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphabetic())
        }
        None => false,
    }
}

/// Classifies an anchor `href` found on the page at `page_url`
///
/// Relative links are resolved against the page, dot segments are removed and
/// fragments dropped.
///
/// # Examples
///
/// ```
/// use site_freezer::url::{classify_link, LinkClass};
///
/// assert_eq!(classify_link("world", "/hello/"), LinkClass::Local("/hello/world".to_string()));
/// assert_eq!(classify_link("//other.com/", "/"), LinkClass::External);
/// assert_eq!(classify_link("#top", "/"), LinkClass::Ignored);
/// ```
pub fn classify_link(href: &str, page_url: &str) -> LinkClass {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return LinkClass::Ignored;
    }

    if is_external_link(href) {
        return LinkClass::External;
    }

    let lower = href.to_ascii_lowercase();
    if IGNORED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        return LinkClass::Ignored;
    }

    match resolve_local(href, page_url) {
        Some(resolved) => LinkClass::Local(resolved),
        None => LinkClass::External,
    }
}

/// Resolves `href` against the page it was found on
///
/// Returns None when the result leaves the site.
fn resolve_local(href: &str, page_url: &str) -> Option<String> {
    let origin = Url::parse(LOCAL_ORIGIN).ok()?;
    let page = origin.join(page_url).ok()?;
    let resolved = page.join(href).ok()?;

    if resolved.origin() != origin.origin() {
        return None;
    }

    Some(path_and_query(&resolved))
}

fn path_and_query(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

/// Identity of a fetched resource: the URL without its fragment
///
/// The query string is kept, so `/search?q=a` and `/search?q=b` are fetched
/// independently even though they share an output file.
pub fn fetch_key(url: &str) -> &str {
    match url.find('#') {
        Some(pos) => &url[..pos],
        None => url,
    }
}

/// The URL without query string or fragment
///
/// # Examples
///
/// ```
/// use site_freezer::url::strip_query;
///
/// assert_eq!(strip_query("/search?q=x"), "/search");
/// assert_eq!(strip_query("/page#top"), "/page");
/// assert_eq!(strip_query("/plain"), "/plain");
/// ```
pub fn strip_query(url: &str) -> &str {
    match url.find(['?', '#']) {
        Some(pos) => &url[..pos],
        None => url,
    }
}
