//! Probe requests and the reflection heuristic
//!
//! A probe is vulnerable when the response reflects the payload verbatim,
//! reflects its HTML-entity-encoded form, or echoes a script-trigger token the
//! payload carries. This is string containment, not proof of execution:
//! coincidental matches give false positives and payloads that execute
//! without literal reflection are missed.

use crate::errors::FetchError;
use crate::http::client::HttpClient;
use crate::payload::injector::build_test_url;
use crate::scanner::params::ParameterCandidate;
use serde::Serialize;
use url::Url;

/// Tokens rare enough in ordinary pages to count as an echo of the payload
pub const TRIGGER_TOKENS: &[&str] = &[
    "alert(1)",
    "prompt(1)",
    "confirm(1)",
    "alert`1`",
    "alert(document.domain)",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ReflectionEvidence {
    Verbatim,
    EntityEncoded,
    TriggerToken(String),
}

impl std::fmt::Display for ReflectionEvidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReflectionEvidence::Verbatim => write!(f, "payload reflected verbatim"),
            ReflectionEvidence::EntityEncoded => write!(f, "payload reflected HTML-entity encoded"),
            ReflectionEvidence::TriggerToken(t) => write!(f, "trigger token {} reflected", t),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub test_url: Url,
    pub status: u16,
    pub evidence: Option<ReflectionEvidence>,
}

impl ProbeOutcome {
    pub fn is_vulnerable(&self) -> bool {
        self.evidence.is_some()
    }
}

/// Inject `payload` at the candidate's location, fetch once and apply the
/// reflection heuristic. Error pages are inspected like any other body.
pub async fn probe_request(
    client: &HttpClient,
    url: &Url,
    candidate: &ParameterCandidate,
    payload: &str,
) -> Result<ProbeOutcome, FetchError> {
    let test_url = build_test_url(url, candidate, payload);
    let resp = client.get(&test_url).await?;

    let evidence = if resp.is_parseable() {
        is_reflected(&resp.body_text(), payload)
    } else {
        None
    };

    Ok(ProbeOutcome {
        test_url,
        status: resp.status,
        evidence,
    })
}

/// Boolean form of [`probe_request`]; transport failures count as not
/// vulnerable.
pub async fn probe(
    client: &HttpClient,
    url: &Url,
    candidate: &ParameterCandidate,
    payload: &str,
) -> bool {
    match probe_request(client, url, candidate, payload).await {
        Ok(outcome) => outcome.is_vulnerable(),
        Err(e) => {
            tracing::debug!("Probe failed: {}", e);
            false
        }
    }
}

pub fn is_reflected(body: &str, payload: &str) -> Option<ReflectionEvidence> {
    if payload.is_empty() {
        return None;
    }

    if body.contains(payload) {
        return Some(ReflectionEvidence::Verbatim);
    }

    let encoded = [html_entity_encode(payload, "&#x27;"), html_entity_encode(payload, "&#39;")];
    if encoded
        .iter()
        .any(|e| e.as_str() != payload && body.contains(e.as_str()))
    {
        return Some(ReflectionEvidence::EntityEncoded);
    }

    TRIGGER_TOKENS
        .iter()
        .find(|token| payload.contains(*token) && body.contains(*token))
        .map(|token| ReflectionEvidence::TriggerToken(token.to_string()))
}

/// Entity-encode the five HTML special characters; `apos` is the encoding
/// used for a single quote.
pub fn html_entity_encode(s: &str, apos: &str) -> String {
    let mut out = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str(apos),
            _ => out.push(c),
        }
    }
    out
}
