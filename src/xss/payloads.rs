// Context-Aware Payload Selection Module
// Maps a classification to an ordered payload list drawn from the built-in catalog

use crate::payload::loader::parse_payload_lines;
use crate::xss::context::XssContext;
use serde::Serialize;

const BASIC: &str = include_str!("../../payloads/xss/basic.txt");
const HTML: &str = include_str!("../../payloads/xss/html.txt");
const SCRIPT: &str = include_str!("../../payloads/xss/script.txt");
const ATTRIBUTE: &str = include_str!("../../payloads/xss/attribute.txt");
const URL: &str = include_str!("../../payloads/xss/url.txt");
const BYPASS: &str = include_str!("../../payloads/xss/bypass.txt");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PayloadCategory {
    Basic,
    Html,
    Script,
    Attribute,
    Url,
    DefenseBypass,
    /// Supplied by the operator with --payloads
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct XssPayload {
    pub value: String,
    pub technique: String,
    pub category: PayloadCategory,
}

impl XssPayload {
    pub fn new(value: impl Into<String>, category: PayloadCategory) -> Self {
        let value = value.into();
        Self {
            technique: classify_technique(&value),
            value,
            category,
        }
    }
}

/// Every payload of one catalog category, in file order
pub fn catalog(category: PayloadCategory) -> Vec<XssPayload> {
    let raw = match category {
        PayloadCategory::Basic => BASIC,
        PayloadCategory::Html => HTML,
        PayloadCategory::Script => SCRIPT,
        PayloadCategory::Attribute => ATTRIBUTE,
        PayloadCategory::Url => URL,
        PayloadCategory::DefenseBypass => BYPASS,
        PayloadCategory::Custom => return Vec::new(),
    };

    parse_payload_lines(raw)
        .into_iter()
        .map(|p| XssPayload::new(p, category))
        .collect()
}

fn category_for(context: XssContext) -> PayloadCategory {
    match context {
        XssContext::Html => PayloadCategory::Html,
        XssContext::Script => PayloadCategory::Script,
        XssContext::Attribute => PayloadCategory::Attribute,
        XssContext::Url => PayloadCategory::Url,
    }
}

/// Ordered candidates for a classification.
///
/// `None` (context unknown or detection disabled) falls back to the basic
/// catalog. A detected defense appends the bypass catalog after the base
/// selection, never replacing it. With `adaptive` off only the basic
/// catalog is used.
pub fn select_payloads(
    context: Option<XssContext>,
    defense_detected: bool,
    adaptive: bool,
) -> Vec<XssPayload> {
    if !adaptive {
        return catalog(PayloadCategory::Basic);
    }

    let base = context.map_or(PayloadCategory::Basic, category_for);
    let mut selected = catalog(base);

    if defense_detected {
        for payload in catalog(PayloadCategory::DefenseBypass) {
            if !selected.iter().any(|p| p.value == payload.value) {
                selected.push(payload);
            }
        }
    }

    selected
}

/// Append operator payloads that the selection does not already contain
pub fn with_custom(mut selected: Vec<XssPayload>, custom: &[String]) -> Vec<XssPayload> {
    for value in custom {
        if !selected.iter().any(|p| &p.value == value) {
            selected.push(XssPayload::new(value.clone(), PayloadCategory::Custom));
        }
    }
    selected
}

/// Keep at most `max_count` payloads (0 keeps all), sampling evenly
/// across the list so later categories stay represented.
pub fn prioritize_payloads(payloads: Vec<XssPayload>, max_count: usize) -> Vec<XssPayload> {
    if max_count == 0 || payloads.len() <= max_count {
        return payloads;
    }

    let step = payloads.len() / max_count;
    payloads
        .into_iter()
        .step_by(step.max(1))
        .take(max_count)
        .collect()
}

fn classify_technique(payload: &str) -> String {
    let lower = payload.to_lowercase();
    if lower.contains("</script>") && !lower.starts_with("<script") && !lower.starts_with('"') && !lower.starts_with('\'') {
        "Script Breakout".to_string()
    } else if lower.contains("<script") {
        "Script Tag".to_string()
    } else if lower.contains("<svg") {
        "SVG Event".to_string()
    } else if lower.contains("<img") {
        "IMG Event".to_string()
    } else if lower.contains("javascript:") || lower.contains("script:") {
        "JavaScript Protocol".to_string()
    } else if lower.starts_with("data:") {
        "Data URI".to_string()
    } else if lower.contains(" on") && lower.contains('=') {
        "Event Handler".to_string()
    } else if payload.contains("';") || payload.contains("\";") || payload.contains("`;") {
        "String Breakout".to_string()
    } else {
        "Generic".to_string()
    }
}
