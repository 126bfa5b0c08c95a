//! HTML anchor extraction
//!
//! Pulls the raw `href` values out of a rendered page. Classifying them as
//! local, external or ignorable is left to `crate::url::classify_link`, which
//! needs the page URL to resolve relative targets.

use scraper::{Html, Selector};

/// Returns every `<a href>` value in document order
///
/// Anchors carrying a `download` attribute point at files, not pages, and
/// are left out. Values are returned untrimmed and unresolved.
///
/// # Example
///
/// ```
/// use site_freezer::crawler::extract_anchors;
///
/// let html = r#"<p><a href="/a">A</a> <a href="b">B</a></p>"#;
/// assert_eq!(extract_anchors(html), vec!["/a", "b"]);
/// ```
pub fn extract_anchors(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter(|element| element.value().attr("download").is_none())
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}
