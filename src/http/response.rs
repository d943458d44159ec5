use std::collections::HashMap;

/// Content-type prefixes that never carry markup or script worth parsing
const NON_TEXT_TYPES: &[&str] = &[
    "image/",
    "audio/",
    "video/",
    "font/",
    "application/octet-stream",
    "application/zip",
    "application/pdf",
];

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub final_url: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub elapsed_ms: u128,
}

impl HttpResponse {
    /// Get body as UTF-8 string (lossy conversion)
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(String::as_str)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the body is text the extractors can work on
    pub fn is_parseable(&self) -> bool {
        self.content_type().map_or(true, is_parseable_content_type)
    }
}

pub fn is_parseable_content_type(content_type: &str) -> bool {
    let ct = content_type.trim().to_lowercase();
    !NON_TEXT_TYPES.iter().any(|prefix| ct.starts_with(prefix))
}
