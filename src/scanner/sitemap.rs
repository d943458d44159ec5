use std::collections::HashMap;
use url::Url;

/// A successfully fetched, parseable page. Never mutated after the crawl.
#[derive(Debug, Clone)]
pub struct DiscoveredPage {
    pub url: Url,
    pub depth: usize,
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

#[derive(Debug, Default)]
pub struct CrawlResult {
    pub pages: Vec<DiscoveredPage>,
    /// Every normalized URL dequeued for fetching, in dequeue order
    pub visited: Vec<String>,
    /// URLs that failed or were skipped, with the reason
    pub failures: Vec<(String, String)>,
}

/// Canonical form used by the visited set: the fragment never changes what
/// the server returns.
pub fn normalize_url(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.to_string()
}
