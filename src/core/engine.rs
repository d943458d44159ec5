//! Core Engine
//!
//! Runs the pipeline for one target: crawl, parameter discovery,
//! classification, payload selection and probing. Per-URL failures become log
//! lines; only an unusable seed aborts the run.

use crate::core::cancel::CancelFlag;
use crate::core::capability::Capability;
use crate::core::context::ScanConfig;
use crate::core::rate_limit::RateLimiter;
use crate::core::scope::Scope;
use crate::errors::ScanError;
use crate::http::client::HttpClient;
use crate::payload::injector::{build_test_url, find_marked_parameter};
use crate::payload::loader::load_payloads;
use crate::reporting::model::ScanReport;
use crate::reporting::reporter::Reporter;
use crate::scanner::crawler::Crawler;
use crate::scanner::params::{ParameterCandidate, ParameterDiscoverer};
use crate::xss::context::{Classification, ClassifyOptions, CANARY};
use crate::xss::engine::XssScanner;
use std::sync::Arc;
use url::Url;

pub struct Engine {
    config: ScanConfig,
    client: HttpClient,
    custom_payloads: Vec<String>,
}

#[derive(Default)]
struct RunStats {
    pages_crawled: usize,
    parameters_tested: usize,
}

impl Engine {
    pub fn new(config: ScanConfig) -> anyhow::Result<Self> {
        let client = HttpClient::new(&config.fetch_options())?;

        let custom_payloads = match &config.payload_file {
            Some(path) => {
                let set = load_payloads(path)?;
                tracing::info!("Loaded {} custom payloads from {}", set.len(), set.name);
                set.payloads
            }
            None => Vec::new(),
        };

        Ok(Self {
            config,
            client,
            custom_payloads,
        })
    }

    pub async fn run(
        &self,
        reporter: Arc<Reporter>,
        cancel: &CancelFlag,
    ) -> Result<ScanReport, ScanError> {
        let target = match normalize_target(&self.config.target) {
            Ok(url) => url,
            Err(e) => {
                reporter.log(format!("[error] {}", e));
                return Err(e);
            }
        };

        tracing::info!("Starting scan against {}", target);
        if self.config.cookies.is_some() || !self.config.headers.is_empty() {
            tracing::info!(
                "Using authenticated session ({} custom headers)",
                self.config.headers.len()
            );
        }
        reporter.log(format!("[scan] target {}", target));

        let scanner = self.xss_scanner();
        let stats = match find_marked_parameter(&target) {
            Some(candidate) => {
                self.run_marked(&scanner, &target, candidate, &reporter, cancel)
                    .await
            }
            None => self.run_discovery(&scanner, &target, &reporter, cancel).await,
        };

        if cancel.is_cancelled() {
            reporter.log("[scan] cancelled by operator, partial results kept");
        }

        let findings = reporter.findings().len();
        reporter.log(format!(
            "[done] {} finding(s), {} page(s), {} parameter(s), {} request(s)",
            findings,
            stats.pages_crawled,
            stats.parameters_tested,
            self.client.requests_sent()
        ));

        let (findings, log) = reporter.take();
        Ok(ScanReport {
            target: target.to_string(),
            findings,
            log,
            pages_crawled: stats.pages_crawled,
            parameters_tested: stats.parameters_tested,
            requests_sent: self.client.requests_sent(),
            cancelled: cancel.is_cancelled(),
        })
    }

    fn xss_scanner(&self) -> XssScanner {
        let profile = &self.config.profile;
        XssScanner::new(
            &self.client,
            RateLimiter::from_delay_ms(self.config.request_delay_ms),
        )
        .with_classify_options(ClassifyOptions {
            detect_context: profile.has(Capability::ContextDetection),
            detect_defense: profile.has(Capability::DefenseDetection),
        })
        .with_adaptive(profile.has(Capability::AdaptivePayloads))
        .with_max_payloads(self.config.max_payloads)
        .with_concurrency(self.config.concurrency)
        .with_custom_payloads(self.custom_payloads.clone())
    }

    /// Manual mode: the operator pinned the injection point with the marker
    async fn run_marked(
        &self,
        scanner: &XssScanner,
        target: &Url,
        candidate: ParameterCandidate,
        reporter: &Arc<Reporter>,
        cancel: &CancelFlag,
    ) -> RunStats {
        reporter.log(format!(
            "[params] manual injection point '{}' ({:?})",
            candidate.name, candidate.origin
        ));

        let canary_url = build_test_url(target, &candidate, CANARY);
        let classification = scanner.classify(&canary_url, Some(CANARY)).await;
        log_classification(reporter, target, &classification);

        let summary = scanner
            .probe_parameters(target, &classification, vec![candidate], reporter, cancel)
            .await;

        RunStats {
            pages_crawled: 0,
            parameters_tested: summary.tested,
        }
    }

    async fn run_discovery(
        &self,
        scanner: &XssScanner,
        target: &Url,
        reporter: &Arc<Reporter>,
        cancel: &CancelFlag,
    ) -> RunStats {
        let mut stats = RunStats::default();

        // (url, body already fetched by the crawler)
        let targets: Vec<(Url, Option<String>)> = if self.config.profile.has(Capability::Crawl) {
            let crawler = Crawler::new(self.config.max_depth, self.config.max_pages)
                .with_concurrency(self.config.concurrency);

            match crawler.crawl(&self.client, target.clone(), reporter, cancel).await {
                Ok(result) => {
                    stats.pages_crawled = result.pages.len();
                    reporter.log(format!(
                        "[crawl] {} page(s) discovered, {} failed",
                        result.pages.len(),
                        result.failures.len()
                    ));
                    result
                        .pages
                        .into_iter()
                        .map(|p| (p.url, Some(p.body)))
                        .collect()
                }
                Err(e) => {
                    reporter.log(format!("[crawl] ✗ {}", e));
                    Vec::new()
                }
            }
        } else {
            reporter.log("[crawl] disabled, scanning the seed URL only");
            vec![(target.clone(), None)]
        };

        let discoverer = ParameterDiscoverer::new();

        for (url, body) in targets {
            if cancel.is_cancelled() {
                break;
            }

            let parameters = discoverer
                .discover(&self.client, &url, body.as_deref())
                .await
                .into_vec();

            if parameters.is_empty() {
                reporter.log(format!("[params] {}: no candidates", url));
                continue;
            }

            let names: Vec<&str> = parameters.iter().map(|p| p.name.as_str()).collect();
            reporter.log(format!(
                "[params] {}: {} candidate(s): {}",
                url,
                parameters.len(),
                names.join(", ")
            ));

            let classification = scanner.classify(&url, None).await;
            log_classification(reporter, &url, &classification);

            let summary = scanner
                .probe_parameters(&url, &classification, parameters, reporter, cancel)
                .await;
            stats.parameters_tested += summary.tested;
        }

        stats
    }
}

fn log_classification(reporter: &Reporter, url: &Url, classification: &Classification) {
    reporter.log(format!(
        "[context] {}: {} context, defense: {}",
        url,
        classification.context,
        classification.defense.as_deref().unwrap_or("none")
    ));
}

/// Parse the operator's target, prefixing `https://` when no scheme is given
pub fn normalize_target(raw: &str) -> Result<Url, ScanError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ScanError::InvalidTarget(raw.to_string()));
    }

    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    let url = Url::parse(&candidate).map_err(|_| ScanError::InvalidTarget(raw.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ScanError::InvalidTarget(raw.to_string()));
    }
    Scope::new(&url).map_err(|_| ScanError::InvalidTarget(raw.to_string()))?;

    Ok(url)
}
