//! Outbound link extraction from raw HTML and inline script
//!
//! Markup references come from a tolerant HTML parse; script-level navigation
//! comes from pattern matching over the raw text. Neither is exhaustive.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

const EXCLUDED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

static SCRIPT_NAV_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // location = "...", location.href = "...", window/document.location = "..."
        r#"(?:window\.|document\.|top\.|self\.)?location(?:\.href)?\s*=\s*["'`]([^"'`\s]+)["'`]"#,
        // location.assign("...") / location.replace("...")
        r#"location\.(?:assign|replace)\(\s*["'`]([^"'`\s]+)["'`]"#,
        // router.navigate("..."), navigate('/x')
        r#"\bnavigate\(\s*["'`]([^"'`\s]+)["'`]"#,
        // history.pushState(state, title, "...")
        r#"history\.(?:push|replace)State\([^,]*,[^,]*,\s*["'`]([^"'`\s]+)["'`]"#,
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

static ANCHOR_SEL: Lazy<Option<Selector>> = Lazy::new(|| Selector::parse("a[href], area[href]").ok());
static FORM_SEL: Lazy<Option<Selector>> = Lazy::new(|| Selector::parse("form[action]").ok());

/// Extract absolute navigable URLs referenced by `body`, resolved against
/// `base`. Malformed references and non-navigable schemes are dropped.
/// Order of first appearance is kept; duplicates are removed.
pub fn extract_links(body: &str, base: &Url) -> Vec<Url> {
    let mut raw: Vec<String> = Vec::new();

    let document = Html::parse_document(body);

    if let Some(sel) = ANCHOR_SEL.as_ref() {
        for el in document.select(sel) {
            if let Some(href) = el.value().attr("href") {
                raw.push(href.to_string());
            }
        }
    }

    if let Some(sel) = FORM_SEL.as_ref() {
        for el in document.select(sel) {
            if let Some(action) = el.value().attr("action") {
                raw.push(action.to_string());
            }
        }
    }

    for re in SCRIPT_NAV_PATTERNS.iter() {
        for caps in re.captures_iter(body) {
            if let Some(m) = caps.get(1) {
                raw.push(m.as_str().to_string());
            }
        }
    }

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for reference in raw {
        if let Some(url) = resolve(&reference, base) {
            if seen.insert(url.as_str().to_string()) {
                links.push(url);
            }
        }
    }

    links
}

fn resolve(reference: &str, base: &Url) -> Option<Url> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }

    let lower = reference.to_lowercase();
    if EXCLUDED_SCHEMES.iter().any(|s| lower.starts_with(s)) {
        return None;
    }

    let url = base.join(reference).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}
