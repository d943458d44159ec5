mod common;

use common::{client, html};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};
use xsscout::core::cancel::CancelFlag;
use xsscout::http::client::{FetchOptions, HttpClient};
use xsscout::reporting::reporter::Reporter;
use xsscout::scanner::crawler::Crawler;

fn seed(server: &MockServer) -> Url {
    Url::parse(&format!("{}/", server.uri())).unwrap()
}

async fn mount_page(server: &MockServer, route: &str, body: &str, hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .expect(hits)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_depth_zero_discovers_only_seed() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<a href="/a">a</a><a href="/b">b</a><a href="/c">c</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/a", "a", 0).await;

    let result = Crawler::new(0, 20)
        .crawl(&client(), seed(&server), &Reporter::new(), &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(result.pages.len(), 1);
    assert_eq!(result.pages[0].depth, 0);
}

#[tokio::test]
async fn test_each_url_fetched_once_in_cycles() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/a">a</a><a href="/b#top">b</a>"#, 1).await;
    mount_page(&server, "/a", r#"<a href="/">home</a><a href="/b">b</a>"#, 1).await;
    mount_page(&server, "/b", r#"<a href="/a">a</a><a href="/b">self</a>"#, 1).await;

    let result = Crawler::new(5, 20)
        .crawl(&client(), seed(&server), &Reporter::new(), &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(result.pages.len(), 3);
    let unique: HashSet<_> = result.visited.iter().collect();
    assert_eq!(unique.len(), result.visited.len());
}

#[tokio::test]
async fn test_concurrent_crawl_keeps_visited_unique() {
    let server = MockServer::start().await;
    let hub: String = (0..8).map(|i| format!(r#"<a href="/p{}">p</a>"#, i)).collect();
    mount_page(&server, "/", &hub, 1).await;
    for i in 0..8 {
        // Every leaf links back to the hub and to all siblings
        mount_page(&server, &format!("/p{}", i), &hub.replace("<a", "<a data-x=1"), 1).await;
    }

    let result = Crawler::new(3, 50)
        .with_concurrency(4)
        .crawl(&client(), seed(&server), &Reporter::new(), &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(result.pages.len(), 9);
    let unique: HashSet<_> = result.visited.iter().collect();
    assert_eq!(unique.len(), 9);
}

#[tokio::test]
async fn test_max_pages_bounds_discovery() {
    let server = MockServer::start().await;
    let links: String = (0..10).map(|i| format!(r#"<a href="/p{}">p</a>"#, i)).collect();
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(links))
        .mount(&server)
        .await;
    for i in 0..10 {
        Mock::given(method("GET"))
            .and(path(format!("/p{}", i)))
            .respond_with(html("leaf"))
            .mount(&server)
            .await;
    }

    for concurrency in [1, 4] {
        let result = Crawler::new(2, 3)
            .with_concurrency(concurrency)
            .crawl(&client(), seed(&server), &Reporter::new(), &CancelFlag::new())
            .await
            .unwrap();

        assert_eq!(result.pages.len(), 3);
        assert!(result.pages.iter().all(|p| p.depth <= 2));
    }
}

#[tokio::test]
async fn test_max_depth_stops_link_following() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/one">1</a>"#, 1).await;
    mount_page(&server, "/one", r#"<a href="/two">2</a>"#, 1).await;
    mount_page(&server, "/two", r#"<a href="/three">3</a>"#, 1).await;
    mount_page(&server, "/three", "deep", 0).await;

    let result = Crawler::new(2, 20)
        .crawl(&client(), seed(&server), &Reporter::new(), &CancelFlag::new())
        .await
        .unwrap();

    let depths: Vec<usize> = result.pages.iter().map(|p| p.depth).collect();
    assert_eq!(depths, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_binary_content_is_skipped() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/avatar">me</a><a href="/about">about</a>"#, 1).await;
    mount_page(&server, "/about", "about us", 1).await;
    Mock::given(method("GET"))
        .and(path("/avatar"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0x89, 0x50, 0x4e, 0x47], "image/png"))
        .expect(1)
        .mount(&server)
        .await;

    let result = Crawler::new(2, 20)
        .crawl(&client(), seed(&server), &Reporter::new(), &CancelFlag::new())
        .await
        .unwrap();

    let paths: Vec<&str> = result.pages.iter().map(|p| p.url.path()).collect();
    assert_eq!(paths, vec!["/", "/about"]);
    assert_eq!(result.failures.len(), 1);
}

#[tokio::test]
async fn test_out_of_scope_and_static_links_ignored() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<a href="https://elsewhere.invalid/">x</a>
           <a href="/logo.png">logo</a>
           <a href="mailto:a@b.c">mail</a>
           <a href="/ok">ok</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/ok", "fine", 1).await;
    mount_page(&server, "/logo.png", "", 0).await;

    let result = Crawler::new(2, 20)
        .crawl(&client(), seed(&server), &Reporter::new(), &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(result.pages.len(), 2);
}

#[tokio::test]
async fn test_failed_pages_are_logged_not_fatal() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/missing">gone</a>"#, 1).await;

    let reporter = Reporter::new();
    let result = Crawler::new(2, 20)
        .crawl(&client(), seed(&server), &reporter, &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(result.pages.len(), 1);
    assert!(reporter
        .log_lines()
        .iter()
        .any(|l| l.starts_with("[crawl] ✗") && l.contains("404")));
}

#[tokio::test]
async fn test_cancelled_crawl_fetches_nothing() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "home", 0).await;

    let cancel = CancelFlag::new();
    cancel.cancel();

    let result = Crawler::new(2, 20)
        .crawl(&client(), seed(&server), &Reporter::new(), &cancel)
        .await
        .unwrap();

    assert!(result.pages.is_empty());
}

async fn mount_redirect(server: &MockServer, from: &str, to: &str) {
    Mock::given(method("GET"))
        .and(path(from))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", to))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_redirect_target_is_not_fetched_again() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/old">old</a><a href="/new">new</a>"#, 1).await;
    mount_redirect(&server, "/old", "/new").await;
    mount_page(&server, "/new", "moved here", 1).await;

    let result = Crawler::new(2, 20)
        .crawl(&client(), seed(&server), &Reporter::new(), &CancelFlag::new())
        .await
        .unwrap();

    let paths: Vec<&str> = result.pages.iter().map(|p| p.url.path()).collect();
    assert_eq!(paths, vec!["/", "/old"]);
}

#[tokio::test]
async fn test_redirect_into_visited_page_is_not_recorded() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/new">new</a><a href="/old">old</a>"#, 1).await;
    // Once directly, once at the end of the redirect
    mount_page(&server, "/new", "moved here", 2).await;
    mount_redirect(&server, "/old", "/new").await;
    let reporter = Reporter::new();

    let result = Crawler::new(2, 20)
        .crawl(&client(), seed(&server), &reporter, &CancelFlag::new())
        .await
        .unwrap();

    let paths: Vec<&str> = result.pages.iter().map(|p| p.url.path()).collect();
    assert_eq!(paths, vec!["/", "/new"]);
    assert!(reporter.log_lines().iter().any(|l| l.starts_with("[crawl] ↪")));
}

#[tokio::test]
async fn test_slow_page_times_out_and_crawl_continues() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/slow">slow</a><a href="/fast">fast</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("late").set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;
    mount_page(&server, "/fast", "quick", 1).await;

    let client = HttpClient::new(&FetchOptions {
        timeout: Duration::from_millis(300),
        ..FetchOptions::default()
    })
    .unwrap();
    let reporter = Reporter::new();

    let result = Crawler::new(2, 20)
        .crawl(&client, seed(&server), &reporter, &CancelFlag::new())
        .await
        .unwrap();

    let paths: Vec<&str> = result.pages.iter().map(|p| p.url.path()).collect();
    assert_eq!(paths, vec!["/", "/fast"]);
    assert_eq!(result.failures.len(), 1);
    assert!(result.failures[0].0.ends_with("/slow"));
    assert!(reporter
        .log_lines()
        .iter()
        .any(|l| l.starts_with("[crawl] ✗") && l.contains("timed out")));
}
