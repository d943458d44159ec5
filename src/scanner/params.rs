//! Injection point discovery
//!
//! Candidates come from the URL itself (query keys, typed path segments, REST
//! resource ids, API defaults) and from the page body (form controls,
//! data/meta attributes, inline script analysis). Every source is a
//! best-effort heuristic; the union is deduplicated by name.

use crate::http::client::HttpClient;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use url::Url;

/// Low-confidence names added to any API / GraphQL looking URL
const API_COMMON_PARAMS: &[&str] = &[
    "id", "limit", "offset", "page", "per_page", "query", "q", "search", "filter", "sort",
    "order", "fields", "include", "format", "callback", "token", "key", "type", "lang",
];

/// Identifiers script analysis must never report
const SCRIPT_NOISE: &[&str] = &[
    "http", "https", "mailto", "javascript", "data", "function", "return", "var", "let",
    "const", "this", "true", "false", "null", "undefined", "default", "case", "new",
    "typeof", "if", "else", "for", "while", "query", "mutation", "fragment", "on",
    "subscription",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ParamOrigin {
    Query,
    PathSegment,
    FormField,
    ScriptLiteral,
    Heuristic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterCandidate {
    pub name: String,
    pub origin: ParamOrigin,
    /// Index into the URL's path segments for path-borne candidates
    pub path_index: Option<usize>,
}

impl ParameterCandidate {
    pub fn new(name: impl Into<String>, origin: ParamOrigin) -> Self {
        Self {
            name: name.into(),
            origin,
            path_index: None,
        }
    }

    pub fn path(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            origin: ParamOrigin::PathSegment,
            path_index: Some(index),
        }
    }
}

/// Shape of a single path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathShape {
    NumericId,
    Uuid,
    ObjectId,
    Date,
    Slug,
    Generic,
}

impl PathShape {
    pub fn label(&self) -> &'static str {
        match self {
            PathShape::NumericId => "id",
            PathShape::Uuid => "uuid",
            PathShape::ObjectId => "object_id",
            PathShape::Date => "date",
            PathShape::Slug => "slug",
            PathShape::Generic => "segment",
        }
    }

    pub fn is_identifier(&self) -> bool {
        matches!(self, PathShape::NumericId | PathShape::Uuid | PathShape::ObjectId)
    }
}

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("static regex")
});
static OBJECT_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i)[0-9a-f]{24}$").expect("static regex"));
static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}(?:T[\d:.]+Z?)?$").expect("static regex"));
static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").expect("static regex"));
static VERSION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^v\d+$").expect("static regex"));

/// Classify a decoded path segment, `None` when it carries nothing alphanumeric
pub fn classify_segment(segment: &str) -> Option<PathShape> {
    if segment.is_empty() {
        return None;
    }
    if segment.chars().all(|c| c.is_ascii_digit()) {
        return Some(PathShape::NumericId);
    }
    if UUID_RE.is_match(segment) {
        return Some(PathShape::Uuid);
    }
    if OBJECT_ID_RE.is_match(segment) {
        return Some(PathShape::ObjectId);
    }
    if DATE_RE.is_match(segment) {
        return Some(PathShape::Date);
    }
    if SLUG_RE.is_match(segment) {
        return Some(PathShape::Slug);
    }
    if segment.chars().any(|c| c.is_alphanumeric()) {
        return Some(PathShape::Generic);
    }
    None
}

/// Ordered, name-unique collection of candidates. The first source to
/// contribute a name keeps it.
#[derive(Debug, Clone, Default)]
pub struct ParameterSet {
    candidates: Vec<ParameterCandidate>,
    names: HashSet<String>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the name was already present
    pub fn insert(&mut self, candidate: ParameterCandidate) -> bool {
        if candidate.name.is_empty() || !self.names.insert(candidate.name.clone()) {
            return false;
        }
        self.candidates.push(candidate);
        true
    }

    pub fn extend(&mut self, candidates: impl IntoIterator<Item = ParameterCandidate>) {
        for c in candidates {
            self.insert(c);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn get(&self, name: &str) -> Option<&ParameterCandidate> {
        self.candidates.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn names(&self) -> BTreeSet<String> {
        self.names.iter().cloned().collect()
    }

    pub fn into_vec(self) -> Vec<ParameterCandidate> {
        self.candidates
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParameterDiscoverer;

impl ParameterDiscoverer {
    pub fn new() -> Self {
        Self
    }

    /// All candidates for `url`. Uses `cached_body` when the page is already
    /// in hand, otherwise fetches it; a failed fetch degrades to URL-only
    /// candidates.
    pub async fn discover(
        &self,
        client: &HttpClient,
        url: &Url,
        cached_body: Option<&str>,
    ) -> ParameterSet {
        let mut set = ParameterSet::new();
        set.extend(self.identify_from_url(url));

        let fetched;
        let body = match cached_body {
            Some(b) => Some(b),
            None => match client.fetch(url).await {
                Ok(resp) => {
                    fetched = resp.body_text();
                    Some(fetched.as_str())
                }
                Err(e) => {
                    tracing::debug!("Parameter discovery fetch failed, URL-only candidates: {}", e);
                    None
                }
            },
        };

        if let Some(body) = body {
            set.extend(self.identify_from_body(body));
        }

        if is_api_url(url) {
            set.extend(
                API_COMMON_PARAMS
                    .iter()
                    .map(|n| ParameterCandidate::new(*n, ParamOrigin::Heuristic)),
            );
        }

        set
    }

    /// Candidate names only
    pub async fn find_parameters(&self, client: &HttpClient, url: &Url) -> BTreeSet<String> {
        self.discover(client, url, None).await.names()
    }

    /// Query keys, typed path segments and REST resource ids
    pub fn identify_from_url(&self, url: &Url) -> Vec<ParameterCandidate> {
        let mut candidates = Vec::new();

        for (key, _) in url.query_pairs() {
            candidates.push(ParameterCandidate::new(key.to_string(), ParamOrigin::Query));
        }

        let segments = path_segments(url);
        let mut shapes = Vec::with_capacity(segments.len());

        for (idx, segment) in segments.iter().enumerate() {
            let shape = classify_segment(segment);
            if let Some(shape) = shape {
                candidates.push(ParameterCandidate::path(
                    format!("path{}_{}", idx, shape.label()),
                    idx,
                ));
            }
            shapes.push(shape);
        }

        // REST: resource/id pairs after an /api/, /vN/ or /rest/ marker
        if let Some(marker) = segments.iter().position(|s| is_rest_marker(s)) {
            for idx in marker + 1..segments.len().saturating_sub(1) {
                let resource = &segments[idx];
                let resource_shape = shapes[idx];
                let id_shape = shapes[idx + 1];

                let is_resource = matches!(resource_shape, Some(PathShape::Slug))
                    && !is_rest_marker(resource)
                    && resource.chars().any(|c| c.is_alphabetic());

                if is_resource && id_shape.map_or(false, |s| s.is_identifier()) {
                    // The id segment already has a shape candidate; give it the resource name
                    let name = format!("{}_id", singular(&resource.to_lowercase()));
                    match candidates.iter_mut().find(|c| c.path_index == Some(idx + 1)) {
                        Some(existing) => existing.name = name,
                        None => candidates.push(ParameterCandidate::path(name, idx + 1)),
                    }
                }
            }
        }

        candidates
    }

    /// Form controls, data/meta attributes and inline script analysis
    pub fn identify_from_body(&self, body: &str) -> Vec<ParameterCandidate> {
        let mut candidates = Vec::new();
        let document = Html::parse_document(body);

        let attr_sources: [(&str, &str, ParamOrigin); 7] = [
            ("input[name]", "name", ParamOrigin::FormField),
            ("select[name]", "name", ParamOrigin::FormField),
            ("textarea[name]", "name", ParamOrigin::FormField),
            ("[data-field]", "data-field", ParamOrigin::Heuristic),
            ("[data-param]", "data-param", ParamOrigin::Heuristic),
            ("[data-name]", "data-name", ParamOrigin::Heuristic),
            ("meta[name]", "name", ParamOrigin::Heuristic),
        ];

        for (selector, attr, origin) in attr_sources {
            let Ok(sel) = Selector::parse(selector) else {
                continue;
            };
            for el in document.select(&sel) {
                if let Some(value) = el.value().attr(attr) {
                    let value = value.trim();
                    if !value.is_empty() {
                        candidates.push(ParameterCandidate::new(value, origin));
                    }
                }
            }
        }

        if let Ok(script_sel) = Selector::parse("script") {
            for script in document.select(&script_sel) {
                let code: String = script.text().collect();
                for name in script_parameter_names(&code) {
                    candidates.push(ParameterCandidate::new(name, ParamOrigin::ScriptLiteral));
                }
            }
        }

        candidates
    }
}

// -------------------------------------------------
// Inline script analysis
// -------------------------------------------------

static OBJECT_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[{,]\s*["']?([A-Za-z_$][\w$-]*)["']?\s*:[^:]"#).expect("static regex")
});

/// Object blocks whose entries are request data, including shorthand `{a, b}`
static DATA_BLOCK_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"JSON\.stringify\(\s*\{([^{}]*)\}",
        r"\bdata\s*:\s*\{([^{}]*)\}",
        r"\bparams\s*:\s*\{([^{}]*)\}",
        r"\bvariables\s*:\s*\{([^{}]*)\}",
        r"new\s+URLSearchParams\(\s*\{([^{}]*)\}",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

static QUERY_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&]([A-Za-z_][\w\-\[\]]*)=").expect("static regex"));

/// `.get("name")`, `params.get('name')`, `formData.append("name", ...)`
static NAMED_CALL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\.(?:get|getAll|has|append|set)\(\s*["']([A-Za-z_][\w\-\[\]]*)["']\s*[,)]"#)
        .expect("static regex")
});

static ROUTE_PARAM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/:([A-Za-z_]\w*)").expect("static regex"));

static GRAPHQL_DOC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)["'`]\s*((?:query|mutation)\b[^"'`]*)["'`]"#).expect("static regex")
});
static GRAPHQL_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?s)\s*(?:query|mutation)\s*\w*\s*(?:\(([^)]*)\))?").expect("static regex")
});
static GRAPHQL_VAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$([A-Za-z_]\w*)").expect("static regex"));
static IDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[^$\w])([A-Za-z_]\w*)").expect("static regex"));

/// Parameter-like names used by a block of JavaScript
pub fn script_parameter_names(code: &str) -> Vec<String> {
    let mut names = Vec::new();

    for caps in OBJECT_KEY_RE.captures_iter(code) {
        names.push(caps[1].to_string());
    }

    for re in DATA_BLOCK_RES.iter() {
        for caps in re.captures_iter(code) {
            names.extend(object_entry_names(&caps[1]));
        }
    }

    for re in [&*QUERY_KEY_RE, &*NAMED_CALL_RE, &*ROUTE_PARAM_RE] {
        for caps in re.captures_iter(code) {
            names.push(caps[1].to_string());
        }
    }

    for caps in GRAPHQL_DOC_RE.captures_iter(code) {
        names.extend(graphql_names(&caps[1]));
    }

    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|n| is_plausible_name(n))
        .filter(|n| seen.insert(n.clone()))
        .collect()
}

/// Keys of `a: 1, "b": x, c` (shorthand included)
fn object_entry_names(inner: &str) -> Vec<String> {
    inner
        .split(',')
        .filter_map(|entry| {
            let key = entry.split(':').next()?.trim();
            let key = key.trim_matches(|c| c == '"' || c == '\'' || c == '`');
            let valid = !key.is_empty()
                && key
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '_' || c == '$' || c == '-');
            valid.then(|| key.to_string())
        })
        .collect()
}

/// Variables, argument names and selected fields of a GraphQL document
fn graphql_names(doc: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut selection = doc;

    if let Some(header) = GRAPHQL_HEADER_RE.captures(doc) {
        if let Some(vars) = header.get(1) {
            for caps in GRAPHQL_VAR_RE.captures_iter(vars.as_str()) {
                names.push(caps[1].to_string());
            }
        }
        if let Some(whole) = header.get(0) {
            selection = &doc[whole.end()..];
        }
    }

    for caps in IDENT_RE.captures_iter(selection) {
        names.push(caps[2].to_string());
    }

    names
}

fn is_plausible_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 50
        && !name.chars().all(|c| c.is_ascii_digit())
        && !SCRIPT_NOISE.contains(&name.to_lowercase().as_str())
}

// -------------------------------------------------
// URL helpers
// -------------------------------------------------

/// Decoded path segments; empty ones are kept so indices match the URL
fn path_segments(url: &Url) -> Vec<String> {
    url.path_segments()
        .map(|segs| {
            segs.map(|s| {
                urlencoding::decode(s)
                    .map(|d| d.into_owned())
                    .unwrap_or_else(|_| s.to_string())
            })
            .collect()
        })
        .unwrap_or_default()
}

fn is_rest_marker(segment: &str) -> bool {
    let s = segment.to_lowercase();
    s == "api" || s == "rest" || VERSION_RE.is_match(&s)
}

fn is_api_url(url: &Url) -> bool {
    let path = url.path().to_lowercase();
    path.split('/').any(|s| s == "api") || path.contains("graphql")
}

fn singular(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        format!("{}y", stem)
    } else if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}
