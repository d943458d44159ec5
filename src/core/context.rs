//! Scan configuration passed explicitly into the pipeline

use crate::cli::args::Cli;
use crate::core::capability::Capability;
use crate::core::profile::ScanProfile;
use crate::http::client::FetchOptions;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Marker an operator places in the target URL to pin the injection point
pub const INJECTION_MARKER: &str = "FUZZ";

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub target: String,
    pub max_depth: usize,
    pub max_pages: usize,
    pub request_delay_ms: u64,
    pub follow_redirects: bool,
    pub timeout_secs: u64,
    /// Upper bound on simultaneous requests to the target
    pub concurrency: usize,
    pub profile: ScanProfile,
    /// Cap on payloads tried per parameter, 0 = no cap
    pub max_payloads: usize,
    pub payload_file: Option<PathBuf>,
    // Authentication
    pub cookies: Option<String>,
    pub headers: HashMap<String, String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            max_depth: 2,
            max_pages: 20,
            request_delay_ms: 500,
            follow_redirects: true,
            timeout_secs: 10,
            concurrency: 1,
            profile: ScanProfile::all(),
            max_payloads: 0,
            payload_file: None,
            cookies: None,
            headers: HashMap::new(),
        }
    }
}

impl ScanConfig {
    pub fn for_target(target: &str) -> Self {
        Self {
            target: target.to_string(),
            ..Self::default()
        }
    }

    pub fn from_cli(cli: &Cli) -> Self {
        let mut profile = ScanProfile::all();
        profile.set(Capability::Crawl, !cli.no_crawl);
        profile.set(Capability::ContextDetection, !cli.no_context);
        profile.set(Capability::DefenseDetection, !cli.no_waf);
        profile.set(Capability::AdaptivePayloads, !cli.no_adaptive);

        // Parse custom headers
        let mut headers = HashMap::new();
        for header in &cli.headers {
            if let Some((key, value)) = header.split_once(':') {
                headers.insert(key.trim().to_string(), value.trim().to_string());
            }
        }

        Self {
            target: cli.target.clone(),
            max_depth: cli.depth,
            max_pages: cli.max_pages,
            request_delay_ms: cli.delay,
            follow_redirects: !cli.no_redirects,
            timeout_secs: cli.timeout,
            concurrency: cli.concurrency.max(1),
            profile,
            max_payloads: cli.max_payloads,
            payload_file: cli.payloads.clone(),
            cookies: cli.cookie.clone(),
            headers,
        }
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            follow_redirects: self.follow_redirects,
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
            cookies: self.cookies.clone(),
            headers: self.headers.clone(),
        }
    }
}
