// Main XSS Scanner Engine
// Classifies one URL, selects payloads and probes every candidate parameter

use crate::core::cancel::CancelFlag;
use crate::core::rate_limit::RateLimiter;
use crate::http::client::HttpClient;
use crate::reporting::model::Finding;
use crate::reporting::reporter::Reporter;
use crate::scanner::params::ParameterCandidate;
use crate::xss::context::{classify, Classification, ClassifyOptions};
use crate::xss::payloads::{prioritize_payloads, select_payloads, with_custom, XssPayload};
use crate::xss::probe::probe_request;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeSummary {
    pub tested: usize,
    pub vulnerable: usize,
}

pub struct XssScanner {
    /// Unpaced client for the classification request
    client: HttpClient,
    /// Paced client: every probe waits for the inter-request delay
    probe_client: HttpClient,
    pub classify_options: ClassifyOptions,
    pub adaptive: bool,
    /// 0 = no cap
    pub max_payloads: usize,
    pub concurrency: usize,
    pub custom_payloads: Vec<String>,
}

impl XssScanner {
    pub fn new(client: &HttpClient, limiter: RateLimiter) -> Self {
        Self {
            client: client.clone(),
            probe_client: client.paced(limiter),
            classify_options: ClassifyOptions::default(),
            adaptive: true,
            max_payloads: 0,
            concurrency: 1,
            custom_payloads: Vec::new(),
        }
    }

    pub fn with_classify_options(mut self, options: ClassifyOptions) -> Self {
        self.classify_options = options;
        self
    }

    pub fn with_adaptive(mut self, adaptive: bool) -> Self {
        self.adaptive = adaptive;
        self
    }

    pub fn with_max_payloads(mut self, max: usize) -> Self {
        self.max_payloads = max;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_custom_payloads(mut self, payloads: Vec<String>) -> Self {
        self.custom_payloads = payloads;
        self
    }

    /// One reconnaissance request; `canary` is set in manual marker mode and
    /// `url` then already carries it.
    pub async fn classify(&self, url: &Url, canary: Option<&str>) -> Classification {
        classify(&self.client, url, canary, self.classify_options).await
    }

    /// Ordered payloads for a classification, custom payloads appended and
    /// the per-parameter cap applied.
    pub fn payloads_for(&self, classification: &Classification) -> Vec<XssPayload> {
        let context = self
            .classify_options
            .detect_context
            .then_some(classification.context);

        let selected = select_payloads(context, classification.defense_detected(), self.adaptive);
        let selected = with_custom(selected, &self.custom_payloads);
        prioritize_payloads(selected, self.max_payloads)
    }

    /// Probe every candidate of `url`. A parameter stops at its first
    /// successful payload; all parameters are always attempted unless the
    /// scan is cancelled.
    pub async fn probe_parameters(
        &self,
        url: &Url,
        classification: &Classification,
        parameters: Vec<ParameterCandidate>,
        reporter: &Arc<Reporter>,
        cancel: &CancelFlag,
    ) -> ProbeSummary {
        let payloads = Arc::new(self.payloads_for(classification));
        let mut summary = ProbeSummary::default();

        if parameters.is_empty() || payloads.is_empty() {
            return summary;
        }

        if self.concurrency <= 1 {
            for candidate in parameters {
                if cancel.is_cancelled() {
                    break;
                }
                summary.tested += 1;
                let hit = probe_parameter(
                    self.probe_client.clone(),
                    url.clone(),
                    candidate,
                    payloads.clone(),
                    classification.clone(),
                    reporter.clone(),
                    cancel.clone(),
                )
                .await;
                if hit {
                    summary.vulnerable += 1;
                }
            }
            return summary;
        }

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for candidate in parameters {
            if cancel.is_cancelled() {
                break;
            }
            summary.tested += 1;

            let client = self.probe_client.clone();
            let url = url.clone();
            let payloads = payloads.clone();
            let classification = classification.clone();
            let reporter = reporter.clone();
            let cancel = cancel.clone();
            let semaphore = semaphore.clone();

            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return false;
                };
                probe_parameter(client, url, candidate, payloads, classification, reporter, cancel)
                    .await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(true) => summary.vulnerable += 1,
                Ok(false) => {}
                Err(e) => tracing::warn!("Probe task failed: {}", e),
            }
        }

        summary
    }
}

/// Sequential payload loop for one parameter, stopping at the first hit
async fn probe_parameter(
    client: HttpClient,
    url: Url,
    candidate: ParameterCandidate,
    payloads: Arc<Vec<XssPayload>>,
    classification: Classification,
    reporter: Arc<Reporter>,
    cancel: CancelFlag,
) -> bool {
    let total = payloads.len();
    reporter.log(format!(
        "[probe] {} → '{}' ({} payloads, {} context)",
        url, candidate.name, total, classification.context
    ));

    for (idx, payload) in payloads.iter().enumerate() {
        if cancel.is_cancelled() {
            return false;
        }

        let outcome = match probe_request(&client, &url, &candidate, &payload.value).await {
            Ok(outcome) => outcome,
            Err(e) => {
                reporter.log(format!("[probe]   ✗ {} [{}/{}] {}", candidate.name, idx + 1, total, e));
                continue;
            }
        };

        reporter.log(format!(
            "[probe]   {} [{}/{}] {} → HTTP {}",
            candidate.name,
            idx + 1,
            total,
            payload.value,
            outcome.status
        ));

        if let Some(evidence) = outcome.evidence {
            reporter.log(format!(
                "[vuln] ✓ {} parameter '{}' reflects {} ({})",
                url, candidate.name, payload.value, evidence
            ));
            reporter.add(Finding::reflected_xss(
                url.as_str(),
                candidate,
                &payload.value,
                classification,
                outcome.test_url.as_str(),
                evidence,
            ));
            return true;
        }
    }

    false
}
