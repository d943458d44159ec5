#![allow(dead_code)]

use wiremock::{Request, Respond, ResponseTemplate};
use xsscout::http::client::{FetchOptions, HttpClient};

pub fn client() -> HttpClient {
    HttpClient::new(&FetchOptions::default()).unwrap()
}

pub fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into().into_bytes(), "text/html")
}

/// Reflects one query parameter into the page without encoding
pub struct Echo {
    pub param: &'static str,
}

impl Respond for Echo {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let value = request
            .url
            .query_pairs()
            .find(|(k, _)| k == self.param)
            .map(|(_, v)| v.into_owned())
            .unwrap_or_default();

        html(format!(
            "<html><body><h1>Results</h1><p>You searched for {}</p></body></html>",
            value
        ))
    }
}

/// Reflects one query parameter HTML-escaped
pub struct EscapedEcho {
    pub param: &'static str,
}

impl Respond for EscapedEcho {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let value = request
            .url
            .query_pairs()
            .find(|(k, _)| k == self.param)
            .map(|(_, v)| v.into_owned())
            .unwrap_or_default()
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;");

        html(format!("<html><body><p>{}</p></body></html>", value))
    }
}
