mod common;

use common::{client, html};
use url::Url;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, Request, Respond, ResponseTemplate,
};
use xsscout::payload::injector::{build_test_url, find_marked_parameter};
use xsscout::scanner::fingerprint::UNKNOWN_DEFENSE;
use xsscout::xss::context::{classify, ClassifyOptions, XssContext, CANARY};

fn url(server: &MockServer, route: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), route)).unwrap()
}

/// Places the `v` parameter inside an href attribute
struct LinkTemplate;

impl Respond for LinkTemplate {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let v = request
            .url
            .query_pairs()
            .find(|(k, _)| k == "v")
            .map(|(_, v)| v.into_owned())
            .unwrap_or_default();
        html(format!(r#"<html><body><a class="back" href="{}">Back</a></body></html>"#, v))
    }
}

#[tokio::test]
async fn test_cloudflare_header_classifies_defense() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<p>hi</p>").insert_header("Server", "CloudFlare"))
        .mount(&server)
        .await;

    let c = classify(&client(), &url(&server, "/"), None, ClassifyOptions::default()).await;
    assert_eq!(c.defense.as_deref(), Some("Cloudflare"));
    assert_eq!(c.context, XssContext::Html);
}

#[tokio::test]
async fn test_blocked_request_is_unknown_defense() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let c = classify(&client(), &url(&server, "/"), None, ClassifyOptions::default()).await;
    assert_eq!(c.defense.as_deref(), Some(UNKNOWN_DEFENSE));
}

#[tokio::test]
async fn test_script_source_page_is_script_context() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/app"))
        .respond_with(html(
            "<script>var p = new URLSearchParams(location.search); document.write(p.get('q'));</script>",
        ))
        .mount(&server)
        .await;

    let c = classify(&client(), &url(&server, "/app"), None, ClassifyOptions::default()).await;
    assert_eq!(c.context, XssContext::Script);
    assert_eq!(c.defense, None);
}

#[tokio::test]
async fn test_marker_canary_locates_url_attribute() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/redirect"))
        .respond_with(LinkTemplate)
        .mount(&server)
        .await;

    let target = url(&server, "/redirect?v=FUZZ");
    let candidate = find_marked_parameter(&target).unwrap();
    let canary_url = build_test_url(&target, &candidate, CANARY);

    let c = classify(&client(), &canary_url, Some(CANARY), ClassifyOptions::default()).await;
    assert_eq!(c.context, XssContext::Url);
}

#[tokio::test]
async fn test_unreachable_target_uses_defaults() {
    let c = classify(
        &client(),
        &Url::parse("http://127.0.0.1:1/").unwrap(),
        None,
        ClassifyOptions::default(),
    )
    .await;
    assert_eq!(c.context, XssContext::Html);
    assert_eq!(c.defense, None);
}
