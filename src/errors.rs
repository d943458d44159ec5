//! Error taxonomy for the scan pipeline
//!
//! Transport and content errors are never fatal: callers turn them into log
//! lines and move on. Only an unusable seed target stops a run.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out after {ms}ms")]
    Timeout { url: String, ms: u128 },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Non-text content (image/audio/video/octet-stream); nothing to parse.
    #[error("skipped {url}: non-parseable content type {content_type}")]
    Skipped { url: String, content_type: String },
}

impl FetchError {
    /// True when the response was deliberately not parsed
    pub fn is_skip(&self) -> bool {
        matches!(self, FetchError::Skipped { .. })
    }
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid target '{0}': could not be parsed as an http(s) URL")]
    InvalidTarget(String),
}
