//! HTTP client with hard timeouts, browser-like headers, optional pacing and
//! cookie/header support

use crate::core::rate_limit::RateLimiter;
use crate::errors::FetchError;
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use anyhow::{Context, Result};
use reqwest::{header, redirect::Policy, Client};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const MAX_REDIRECTS: usize = 10;

/// Per-client request settings
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub follow_redirects: bool,
    pub timeout: Duration,
    pub cookies: Option<String>,
    pub headers: HashMap<String, String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            follow_redirects: true,
            timeout: Duration::from_secs(10),
            cookies: None,
            headers: HashMap::new(),
        }
    }
}

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
    limiter: Option<RateLimiter>,
    default_headers: HashMap<String, String>,
    cookies: Option<String>,
    sent: Arc<AtomicUsize>,
}

impl HttpClient {
    pub fn new(options: &FetchOptions) -> Result<Self> {
        let redirect = if options.follow_redirects {
            Policy::limited(MAX_REDIRECTS)
        } else {
            Policy::none()
        };

        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .redirect(redirect)
            .timeout(options.timeout)
            .default_headers(browser_headers())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            timeout: options.timeout,
            limiter: None,
            default_headers: options.headers.clone(),
            cookies: options.cookies.clone(),
            sent: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Clone of this client whose requests are spaced by `limiter`.
    /// The request counter stays shared.
    pub fn paced(&self, limiter: RateLimiter) -> Self {
        let mut client = self.clone();
        client.limiter = Some(limiter);
        client
    }

    /// Number of requests issued through this client and its clones
    pub fn requests_sent(&self) -> usize {
        self.sent.load(Ordering::Relaxed)
    }

    pub async fn execute(&self, req: HttpRequest) -> Result<HttpResponse, FetchError> {
        self.send(req, false).await
    }

    /// With `text_only`, the body of a non-2xx or non-text response is never
    /// read; the caller only needs its status and headers.
    async fn send(&self, req: HttpRequest, text_only: bool) -> Result<HttpResponse, FetchError> {
        // ---- RATE LIMIT ENFORCEMENT ----
        if let Some(limiter) = &self.limiter {
            limiter.wait().await;
        }

        let url = req.url.to_string();
        let mut request = self
            .client
            .request(req.method, req.url)
            .headers(req.headers);

        for (key, value) in &self.default_headers {
            if let Ok(header_name) = header::HeaderName::from_bytes(key.as_bytes()) {
                if let Ok(header_value) = header::HeaderValue::from_str(value) {
                    request = request.header(header_name, header_value);
                }
            }
        }

        if let Some(ref cookies) = self.cookies {
            request = request.header(header::COOKIE, cookies);
        }

        self.sent.fetch_add(1, Ordering::Relaxed);
        let start = Instant::now();

        let exchange = async {
            let response = request.send().await?;
            let status = response.status().as_u16();
            let final_url = response.url().to_string();

            let mut headers = HashMap::new();
            for (k, v) in response.headers().iter() {
                headers.insert(k.to_string(), v.to_str().unwrap_or("").to_string());
            }

            let mut resp = HttpResponse {
                status,
                final_url,
                headers,
                body: Vec::new(),
                elapsed_ms: 0,
            };
            if !text_only || (resp.is_success() && resp.is_parseable()) {
                resp.body = response.bytes().await?.to_vec();
            }
            Ok::<_, reqwest::Error>(resp)
        };

        let mut resp = match tokio::time::timeout(self.timeout, exchange).await {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) if e.is_timeout() => return Err(self.timeout_error(url)),
            Ok(Err(source)) => return Err(FetchError::Transport { url, source }),
            Err(_) => return Err(self.timeout_error(url)),
        };
        resp.elapsed_ms = start.elapsed().as_millis();

        tracing::debug!("GET {} -> {} ({}ms)", url, resp.status, resp.elapsed_ms);
        Ok(resp)
    }

    /// Plain GET returning the response whatever its status
    pub async fn get(&self, url: &Url) -> Result<HttpResponse, FetchError> {
        self.execute(HttpRequest::get(url.clone())).await
    }

    /// GET for content extraction: non-2xx responses are errors and non-text
    /// content types come back as `FetchError::Skipped`. Neither body is
    /// downloaded.
    pub async fn fetch(&self, url: &Url) -> Result<HttpResponse, FetchError> {
        let resp = self.send(HttpRequest::get(url.clone()), true).await?;

        if !resp.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: resp.status,
            });
        }

        if !resp.is_parseable() {
            return Err(FetchError::Skipped {
                url: url.to_string(),
                content_type: resp.content_type().unwrap_or_default().to_string(),
            });
        }

        Ok(resp)
    }

    fn timeout_error(&self, url: String) -> FetchError {
        FetchError::Timeout {
            url,
            ms: self.timeout.as_millis(),
        }
    }
}

fn browser_headers() -> header::HeaderMap {
    let mut headers = header::HeaderMap::new();
    headers.insert(header::USER_AGENT, header::HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        header::HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        header::HeaderValue::from_static("1"),
    );
    headers.insert(
        header::HeaderName::from_static("sec-fetch-dest"),
        header::HeaderValue::from_static("document"),
    );
    headers.insert(
        header::HeaderName::from_static("sec-fetch-mode"),
        header::HeaderValue::from_static("navigate"),
    );
    headers.insert(
        header::HeaderName::from_static("sec-fetch-site"),
        header::HeaderValue::from_static("none"),
    );
    headers
}
