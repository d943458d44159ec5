// Context & Defense Classification
// One reconnaissance request per URL decides where a reflected value would
// land and whether a protective layer sits in front of the target.

use crate::http::client::HttpClient;
use crate::http::response::HttpResponse;
use crate::scanner::fingerprint::detect_defense;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum XssContext {
    /// Between tags: <div>USER_INPUT</div>
    Html,
    /// Inside a script block: var x = "USER_INPUT";
    Script,
    /// Inside a tag attribute value: <input value="USER_INPUT">
    Attribute,
    /// Inside a URL-bearing attribute: <a href="USER_INPUT">
    Url,
}

impl std::fmt::Display for XssContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            XssContext::Html => write!(f, "HTML"),
            XssContext::Script => write!(f, "Script"),
            XssContext::Attribute => write!(f, "Attribute"),
            XssContext::Url => write!(f, "URL"),
        }
    }
}

/// Result of classifying one target URL. `defense == None` means no
/// signature matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub context: XssContext,
    pub defense: Option<String>,
}

impl Default for Classification {
    fn default() -> Self {
        Self {
            context: XssContext::Html,
            defense: None,
        }
    }
}

impl Classification {
    pub fn defense_detected(&self) -> bool {
        self.defense.is_some()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ClassifyOptions {
    pub detect_context: bool,
    pub detect_defense: bool,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            detect_context: true,
            detect_defense: true,
        }
    }
}

static SCRIPT_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>(.*?)</script\s*>").expect("static regex")
});

/// Script text that reads attacker-controllable browser state
static SCRIPT_SOURCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"location\.(?:search|hash|href)|document\.(?:URL|documentURI|location|referrer)|URLSearchParams|window\.name",
    )
    .expect("static regex")
});

/// Benign marker substituted for the operator's injection marker during
/// classification
pub const CANARY: &str = "xsc0ut7c4n4ry";

const URL_ATTRIBUTES: &[&str] = &[
    "href", "src", "action", "formaction", "data", "poster", "background", "cite", "codebase",
];

/// Fetch `url` once and classify it. When `canary` is given the URL already
/// carries that benign string at the operator-marked injection point.
pub async fn classify(
    client: &HttpClient,
    url: &Url,
    canary: Option<&str>,
    opts: ClassifyOptions,
) -> Classification {
    match client.get(url).await {
        Ok(resp) => classify_response(&resp, canary, opts),
        Err(e) => {
            tracing::debug!("Classification request failed, using defaults: {}", e);
            Classification::default()
        }
    }
}

/// Pure classification of an already fetched response
pub fn classify_response(
    resp: &HttpResponse,
    canary: Option<&str>,
    opts: ClassifyOptions,
) -> Classification {
    let context = if opts.detect_context {
        infer_context(&resp.body_text(), canary)
    } else {
        XssContext::Html
    };

    let defense = if opts.detect_defense {
        detect_defense(&resp.headers, resp.status)
    } else {
        None
    };

    Classification { context, defense }
}

/// Html unless a script block qualifies. Attribute and Url are only reported
/// when a canary was planted and found.
pub fn infer_context(body: &str, canary: Option<&str>) -> XssContext {
    if let Some(canary) = canary {
        if let Some(pos) = body.find(canary) {
            return locate_context(body, pos);
        }
    }

    if has_script_source_block(body) {
        return XssContext::Script;
    }

    XssContext::Html
}

/// Any script block whose text reads URL-derived state
pub fn has_script_source_block(body: &str) -> bool {
    SCRIPT_BLOCK_RE
        .captures_iter(body)
        .any(|caps| SCRIPT_SOURCE_RE.is_match(&caps[1]))
}

/// Context of the byte offset `pos` (a char boundary) inside `body`
fn locate_context(body: &str, pos: usize) -> XssContext {
    // An attribute of a real tag, including <script src=...> itself. A tag-like
    // string inside a script block is still script text.
    if let Some((tag_start, attr)) = attribute_at(body, pos) {
        if !is_inside_script_tag(body, tag_start) {
            return if URL_ATTRIBUTES.contains(&attr.as_str()) {
                XssContext::Url
            } else {
                XssContext::Attribute
            };
        }
    }

    if is_inside_script_tag(body, pos) {
        XssContext::Script
    } else {
        XssContext::Html
    }
}

fn is_inside_script_tag(body: &str, pos: usize) -> bool {
    let before = body[..pos].to_lowercase();

    // Find the most recent opening script tag
    let last_open = before.rfind("<script");
    let last_close = before.rfind("</script");

    match (last_open, last_close) {
        (Some(open), Some(close)) if open > close => true,
        (Some(_), None) => true,
        _ => false,
    }
}

/// Start of the enclosing tag and the name of the attribute whose value
/// contains `pos`, if `pos` is inside a tag
fn attribute_at(body: &str, pos: usize) -> Option<(usize, String)> {
    let before = &body[..pos];

    // Look for the most recent < character
    let tag_start = before.rfind('<')?;
    let in_tag = &before[tag_start..];
    if in_tag.contains('>') {
        return None;
    }
    body[pos..].find('>')?;

    let eq = in_tag.rfind('=')?;
    let name = in_tag[..eq]
        .trim_end()
        .rsplit(|c: char| c.is_whitespace() || c == '<' || c == '"' || c == '\'')
        .next()?
        .to_lowercase();

    (!name.is_empty()).then_some((tag_start, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_html_text_context() {
        let html = format!("<div>{}</div>", CANARY);
        assert_eq!(infer_context(&html, Some(CANARY)), XssContext::Html);
    }

    #[test]
    fn test_attribute_context_double_quotes() {
        let html = format!(r#"<input type="text" value="{}">"#, CANARY);
        assert_eq!(infer_context(&html, Some(CANARY)), XssContext::Attribute);
    }

    #[test]
    fn test_url_attribute_context() {
        let html = format!(r#"<a class="x" href="{}">go</a>"#, CANARY);
        assert_eq!(infer_context(&html, Some(CANARY)), XssContext::Url);
    }

    #[test]
    fn test_script_context_from_canary() {
        let html = format!(r#"<script>var x = "{}";</script>"#, CANARY);
        assert_eq!(infer_context(&html, Some(CANARY)), XssContext::Script);
    }

    #[test]
    fn test_script_src_is_url_context() {
        let html = format!(r#"<script src="/static/{}.js"></script>"#, CANARY);
        assert_eq!(infer_context(&html, Some(CANARY)), XssContext::Url);

        let html = format!(r#"<script type="{}">var a = 1;</script>"#, CANARY);
        assert_eq!(infer_context(&html, Some(CANARY)), XssContext::Attribute);
    }

    #[test]
    fn test_markup_string_inside_script_stays_script() {
        let html = format!(r#"<script>el.innerHTML = '<a href="{}">';</script>"#, CANARY);
        assert_eq!(infer_context(&html, Some(CANARY)), XssContext::Script);
    }

    #[test]
    fn test_attribute_only_with_canary() {
        let html = r#"<input value="anything"><div>text</div>"#;
        assert_eq!(infer_context(html, None), XssContext::Html);
    }

    #[test]
    fn test_script_source_block_upgrades_to_script() {
        let html = r#"<script>document.write(location.search)</script>"#;
        assert_eq!(infer_context(html, None), XssContext::Script);

        let inert = r#"<script src="/app.js"></script><script>var a = 1;</script>"#;
        assert_eq!(infer_context(inert, None), XssContext::Html);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let mut headers = HashMap::new();
        headers.insert("server".to_string(), "cloudflare".to_string());
        let resp = HttpResponse {
            status: 200,
            final_url: "https://example.com/".to_string(),
            headers,
            body: b"<script>var q = location.hash;</script>".to_vec(),
            elapsed_ms: 3,
        };

        let first = classify_response(&resp, None, ClassifyOptions::default());
        let second = classify_response(&resp, None, ClassifyOptions::default());
        assert_eq!(first, second);
        assert_eq!(first.context, XssContext::Script);
        assert_eq!(first.defense.as_deref(), Some("Cloudflare"));
    }

    #[test]
    fn test_toggles_disable_detection() {
        let resp = HttpResponse {
            status: 403,
            final_url: "https://example.com/".to_string(),
            headers: HashMap::new(),
            body: b"<script>location.hash</script>".to_vec(),
            elapsed_ms: 0,
        };
        let opts = ClassifyOptions {
            detect_context: false,
            detect_defense: false,
        };
        assert_eq!(classify_response(&resp, None, opts), Classification::default());
    }
}
