mod common;

use common::{html, Echo};
use std::sync::Arc;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, Request, Respond, ResponseTemplate,
};
use xsscout::core::cancel::CancelFlag;
use xsscout::core::capability::Capability;
use xsscout::core::context::ScanConfig;
use xsscout::core::engine::Engine;
use xsscout::errors::ScanError;
use xsscout::reporting::reporter::Reporter;
use xsscout::scanner::params::ParamOrigin;

async fn site() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/search?q=shoes">search</a><a href="/about">about</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html("<p>about</p>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(Echo { param: "q" })
        .mount(&server)
        .await;
    server
}

fn config(target: String) -> ScanConfig {
    ScanConfig {
        request_delay_ms: 0,
        max_depth: 1,
        ..ScanConfig::for_target(&target)
    }
}

#[tokio::test]
async fn test_crawl_to_finding() {
    let server = site().await;
    let engine = Engine::new(config(server.uri())).unwrap();
    let reporter = Arc::new(Reporter::new());

    let report = engine.run(reporter, &CancelFlag::new()).await.unwrap();

    assert_eq!(report.pages_crawled, 3);
    assert_eq!(report.findings.len(), 1);
    let finding = &report.findings[0];
    assert_eq!(finding.parameter.name, "q");
    assert!(finding.url.contains("/search"));
    assert!(report.requests_sent > 0);
    assert!(!report.cancelled);
    assert!(report.log.iter().any(|l| l.starts_with("[crawl] ✓")));
    assert!(report.log.iter().any(|l| l.starts_with("[vuln] ✓")));
}

#[tokio::test]
async fn test_progress_stream_mirrors_log() {
    let server = site().await;
    let engine = Engine::new(config(server.uri())).unwrap();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let report = engine
        .run(Arc::new(Reporter::with_sink(tx)), &CancelFlag::new())
        .await
        .unwrap();

    let mut streamed = Vec::new();
    while let Ok(line) = rx.try_recv() {
        streamed.push(line);
    }
    assert_eq!(streamed, report.log);
}

#[tokio::test]
async fn test_no_crawl_scans_seed_only() {
    let server = site().await;
    let mut cfg = config(format!("{}/search?q=x", server.uri()));
    cfg.profile.disable(Capability::Crawl);

    let report = Engine::new(cfg)
        .unwrap()
        .run(Arc::new(Reporter::new()), &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(report.pages_crawled, 0);
    assert_eq!(report.findings.len(), 1);
}

#[tokio::test]
async fn test_marker_mode_probes_single_point() {
    let server = site().await;
    let report = Engine::new(config(format!("{}/search?q=FUZZ", server.uri())))
        .unwrap()
        .run(Arc::new(Reporter::new()), &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(report.pages_crawled, 0);
    assert_eq!(report.parameters_tested, 1);
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].parameter.origin, ParamOrigin::Query);
}

#[tokio::test]
async fn test_invalid_target_is_fatal() {
    let engine = Engine::new(ScanConfig::for_target("http://")).unwrap();
    let reporter = Arc::new(Reporter::new());

    let result = engine.run(reporter.clone(), &CancelFlag::new()).await;

    assert!(matches!(result, Err(ScanError::InvalidTarget(_))));
    assert!(reporter.log_lines().iter().any(|l| l.starts_with("[error]")));
}

#[tokio::test]
async fn test_unreachable_target_completes_empty() {
    let report = Engine::new(config("http://127.0.0.1:1".to_string()))
        .unwrap()
        .run(Arc::new(Reporter::new()), &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(report.pages_crawled, 0);
    assert!(report.findings.is_empty());
    assert!(!report.log.is_empty());
}

/// Echoes `q` and interrupts the scan the first time a payload comes through
struct InterruptingEcho {
    cancel: CancelFlag,
}

impl Respond for InterruptingEcho {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let q = request
            .url
            .query_pairs()
            .find(|(k, _)| k == "q")
            .map(|(_, v)| v.into_owned())
            .unwrap_or_default();
        if q.contains('<') {
            self.cancel.cancel();
        }
        html(format!("<p>{}</p>", q))
    }
}

#[tokio::test]
async fn test_cancel_mid_scan_keeps_partial_results() {
    let cancel = CancelFlag::new();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(InterruptingEcho {
            cancel: cancel.clone(),
        })
        .mount(&server)
        .await;

    let mut cfg = config(format!("{}/search?q=shoes&page=1&sort=asc", server.uri()));
    cfg.profile.disable(Capability::Crawl);
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let report = Engine::new(cfg)
        .unwrap()
        .run(Arc::new(Reporter::with_sink(tx)), &cancel)
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].parameter.name, "q");

    // Discovery, classification and the single reflecting payload; nothing
    // reaches page or sort once the flag is set
    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 3);
    assert_eq!(report.requests_sent, 3);

    let mut streamed = Vec::new();
    while let Ok(line) = rx.try_recv() {
        streamed.push(line);
    }
    let vuln = streamed.iter().position(|l| l.starts_with("[vuln]")).unwrap();
    assert!(streamed[vuln + 1..]
        .iter()
        .all(|l| !l.starts_with("[probe]")));
    assert!(streamed.iter().any(|l| l.contains("cancelled")));
}
