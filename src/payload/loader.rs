use anyhow::Context as _;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct PayloadSet {
    pub name: String,
    pub payloads: Vec<String>,
}

impl PayloadSet {
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}

/// Load an operator payload list: one payload per line, blank lines and
/// `#` comments ignored.
pub fn load_payloads<P: AsRef<Path>>(path: P) -> anyhow::Result<PayloadSet> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading payload file {}", path.display()))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    Ok(PayloadSet {
        name,
        payloads: parse_payload_lines(&content),
    })
}

pub fn parse_payload_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
        .collect()
}
