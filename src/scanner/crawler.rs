use crate::core::cancel::CancelFlag;
use crate::core::scope::Scope;
use crate::errors::FetchError;
use crate::http::client::HttpClient;
use crate::http::response::HttpResponse;
use crate::reporting::reporter::Reporter;
use crate::scanner::links::extract_links;
use crate::scanner::sitemap::{normalize_url, CrawlResult, DiscoveredPage};
use std::collections::{HashSet, VecDeque};
use tokio::task::JoinSet;
use url::Url;

/// Path extensions that never lead to HTML worth crawling
const NON_HTML_EXTENSIONS: &[&str] = &[
    // images
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "svg", "ico", "tif", "tiff", "avif",
    // archives
    "zip", "rar", "7z", "tar", "gz", "tgz", "bz2", "xz",
    // audio / video
    "mp3", "wav", "ogg", "flac", "aac", "m4a", "mp4", "avi", "mov", "mkv", "webm", "wmv", "flv",
    // fonts, documents, binaries
    "woff", "woff2", "ttf", "otf", "eot", "pdf", "exe", "dmg", "iso", "apk",
];

/// A link waiting to be visited
#[derive(Debug, Clone)]
pub struct FrontierEntry {
    pub url: Url,
    pub depth: usize,
}

pub struct Crawler {
    pub max_depth: usize,
    pub max_pages: usize,
    /// Fetches allowed in flight at once; 1 is a strictly sequential BFS
    pub concurrency: usize,
}

impl Crawler {
    pub fn new(max_depth: usize, max_pages: usize) -> Self {
        Self {
            max_depth,
            max_pages,
            concurrency: 1,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Breadth-first crawl from `start_url`.
    ///
    /// The coordinator alone owns the frontier and the visited set and marks
    /// a URL visited before dispatching its fetch, so no URL is fetched twice
    /// however many fetches are in flight.
    pub async fn crawl(
        &self,
        client: &HttpClient,
        start_url: Url,
        reporter: &Reporter,
        cancel: &CancelFlag,
    ) -> anyhow::Result<CrawlResult> {
        let scope = Scope::new(&start_url)?;
        let mut result = CrawlResult::default();

        let mut visited: HashSet<String> = HashSet::new();
        let mut queued: HashSet<String> = HashSet::new();
        let mut frontier: VecDeque<FrontierEntry> = VecDeque::new();
        let mut in_flight: JoinSet<(FrontierEntry, Result<HttpResponse, FetchError>)> =
            JoinSet::new();

        if self.max_pages == 0 {
            return Ok(result);
        }

        queued.insert(normalize_url(&start_url));
        frontier.push_back(FrontierEntry {
            url: start_url,
            depth: 0,
        });

        loop {
            while in_flight.len() < self.concurrency.max(1)
                && result.pages.len() + in_flight.len() < self.max_pages
                && !cancel.is_cancelled()
            {
                let Some(entry) = frontier.pop_front() else {
                    break;
                };

                if entry.depth > self.max_depth {
                    continue;
                }

                let key = normalize_url(&entry.url);
                if !visited.insert(key.clone()) {
                    continue;
                }
                result.visited.push(key);

                let client = client.clone();
                in_flight.spawn(async move {
                    let outcome = client.fetch(&entry.url).await;
                    (entry, outcome)
                });
            }

            let Some(joined) = in_flight.join_next().await else {
                break;
            };

            let (entry, outcome) = match joined {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!("Crawl task failed: {}", e);
                    continue;
                }
            };

            let resp = match outcome {
                Ok(r) => r,
                Err(e) => {
                    if e.is_skip() {
                        tracing::debug!("{}", e);
                    } else {
                        reporter.log(format!("[crawl] ✗ {}", e));
                    }
                    result.failures.push((entry.url.to_string(), e.to_string()));
                    continue;
                }
            };

            if result.pages.len() >= self.max_pages {
                continue;
            }

            // A redirect target counts as visited under its own URL too
            let landed = Url::parse(&resp.final_url).unwrap_or_else(|_| entry.url.clone());
            let landed_key = normalize_url(&landed);
            if landed_key != normalize_url(&entry.url) {
                queued.insert(landed_key.clone());
                if !visited.insert(landed_key) {
                    reporter.log(format!(
                        "[crawl] ↪ {} redirects to already visited {}",
                        entry.url, landed
                    ));
                    continue;
                }
            }

            let body = resp.body_text();
            reporter.log(format!(
                "[crawl] ✓ {} (depth {}, HTTP {})",
                entry.url, entry.depth, resp.status
            ));

            if entry.depth < self.max_depth {
                // Links are relative to wherever redirects ended up
                for next in extract_links(&body, &landed) {
                    if is_non_html_resource(&next) || !scope.is_in_scope(&next) {
                        continue;
                    }

                    let key = normalize_url(&next);
                    if visited.contains(&key) || !queued.insert(key) {
                        continue;
                    }

                    frontier.push_back(FrontierEntry {
                        url: next,
                        depth: entry.depth + 1,
                    });
                }
            }

            result.pages.push(DiscoveredPage {
                url: entry.url,
                depth: entry.depth,
                status: resp.status,
                headers: resp.headers,
                body,
            });
        }

        if cancel.is_cancelled() {
            reporter.log(format!(
                "[crawl] cancelled, keeping {} discovered pages",
                result.pages.len()
            ));
        }

        Ok(result)
    }
}

/// Whether the URL path ends in an extension that is never HTML
pub fn is_non_html_resource(url: &Url) -> bool {
    let path = url.path().to_lowercase();
    let last = path.rsplit('/').next().unwrap_or("");

    match last.rsplit_once('.') {
        Some((_, ext)) => NON_HTML_EXTENSIONS.contains(&ext),
        None => false,
    }
}
