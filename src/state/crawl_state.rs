use std::collections::HashSet;

/// Deduplication registries for a single freeze run
///
/// Created empty at the start of every run and dropped at its end. Each
/// `claim_*` method is a check-and-insert: it returns true exactly once per
/// distinct key.
#[derive(Debug, Clone, Default)]
pub struct CrawlState {
    /// Route keys (name + encoded params) already resolved to a URL
    frozen_routes: HashSet<String>,

    /// URLs (query included, fragment excluded) already fetched
    frozen_urls: HashSet<String>,

    /// External links already reported as skipped
    external_links: HashSet<String>,
}

impl CrawlState {
    /// Creates a new CrawlState with empty registries
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a route key; false if it was already resolved this run
    pub fn claim_route(&mut self, key: &str) -> bool {
        self.frozen_routes.insert(key.to_string())
    }

    /// Claims a URL for fetching; false if it was already fetched this run
    pub fn claim_url(&mut self, url: &str) -> bool {
        self.frozen_urls.insert(url.to_string())
    }

    /// Claims an external link for reporting; false if already reported
    pub fn claim_external(&mut self, href: &str) -> bool {
        self.external_links.insert(href.to_string())
    }

    pub fn is_url_frozen(&self, url: &str) -> bool {
        self.frozen_urls.contains(url)
    }

    pub fn is_route_frozen(&self, key: &str) -> bool {
        self.frozen_routes.contains(key)
    }

    /// Number of distinct URLs fetched so far
    pub fn urls_fetched(&self) -> usize {
        self.frozen_urls.len()
    }

    /// Number of distinct route keys resolved so far
    pub fn routes_resolved(&self) -> usize {
        self.frozen_routes.len()
    }
}
