//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! seed, fetch, extract and budget cycle end-to-end. Paths without a mock
//! answer 404, which the crawler treats as a failed fetch.

use ripple_scan::config::CrawlerConfig;
use ripple_scan::crawler::crawl;
use ripple_scan::crawl_domain;
use std::time::Duration;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts an HTML page at `route`
async fn mount_html(server: &MockServer, route: &str, body: impl Into<String>) {
    let body: String = body.into();
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"))
        .mount(server)
        .await;
}

/// Mounts a route that must never be requested
async fn mount_untouched(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
        .expect(0)
        .mount(server)
        .await;
}

fn anchors(routes: &[&str]) -> String {
    routes
        .iter()
        .map(|route| format!(r#"<a href="{}">{}</a>"#, route, route))
        .collect()
}

fn urls(server: &MockServer, routes: &[&str]) -> Vec<String> {
    routes
        .iter()
        .map(|route| format!("{}{}", server.uri(), route))
        .collect()
}

#[tokio::test]
async fn test_crawl_follows_same_domain_links() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        format!(
            "{}{}",
            anchors(&["/page1", "/page2"]),
            r#"<a href="https://otherdomain.example/x">Elsewhere</a>"#
        ),
    )
    .await;
    mount_html(&server, "/page1", "<p>one</p>").await;
    mount_html(&server, "/page2", "<p>two</p>").await;

    let discovered = crawl_domain(&server.uri(), 50, 4, 5.0, 1).await;

    assert_eq!(discovered, urls(&server, &["/", "/page1", "/page2"]));
    assert!(!discovered.iter().any(|u| u.contains("otherdomain")));
}

#[tokio::test]
async fn test_budget_of_one_returns_only_start() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        anchors(&["/p1", "/p2", "/p3", "/p4", "/p5"]),
    )
    .await;
    for route in ["/p1", "/p2", "/p3", "/p4", "/p5", "/about", "/contact"] {
        mount_untouched(&server, route).await;
    }

    let discovered = crawl_domain(&server.uri(), 1, 8, 5.0, 2).await;

    assert_eq!(discovered, urls(&server, &["/"]));
}

#[tokio::test]
async fn test_timed_out_page_is_skipped() {
    let server = MockServer::start().await;
    mount_html(&server, "/", anchors(&["/slow", "/fast"])).await;
    mount_html(&server, "/fast", "<p>quick</p>").await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<p>late</p>", "text/html")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let started = std::time::Instant::now();
    let discovered = crawl_domain(&server.uri(), 50, 4, 1.0, 1).await;

    assert_eq!(discovered, urls(&server, &["/", "/fast"]));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_non_html_is_counted_but_not_parsed() {
    let server = MockServer::start().await;
    mount_html(&server, "/", anchors(&["/report"])).await;
    Mock::given(method("GET"))
        .and(path("/report"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"<a href="/hidden">not really html</a>"#, "application/pdf"),
        )
        .mount(&server)
        .await;
    mount_untouched(&server, "/hidden").await;

    let discovered = crawl_domain(&server.uri(), 50, 4, 5.0, 2).await;

    assert_eq!(discovered, urls(&server, &["/", "/report"]));
}

#[tokio::test]
async fn test_depth_zero_is_independent_of_worker_count() {
    let server = MockServer::start().await;
    mount_html(&server, "/", anchors(&["/deeper"])).await;
    mount_html(&server, "/about", "<p>about</p>").await;
    mount_html(&server, "/contact", "<p>contact</p>").await;
    mount_untouched(&server, "/deeper").await;

    let expected = urls(&server, &["/", "/about", "/contact"]);
    for workers in [1, 3, 16] {
        let discovered = crawl_domain(&server.uri(), 50, workers, 5.0, 0).await;
        assert_eq!(discovered, expected, "workers = {}", workers);
    }
}

#[tokio::test]
async fn test_equivalent_links_are_deduplicated() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        anchors(&["/dup", "/dup/", "/dup#section", "/dup//"]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/dup"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    let discovered = crawl_domain(&server.uri(), 50, 4, 5.0, 1).await;

    assert_eq!(discovered, urls(&server, &["/", "/dup"]));
}

#[tokio::test]
async fn test_redirect_targets_are_credited_once() {
    let server = MockServer::start().await;
    mount_html(&server, "/", anchors(&["/old", "/new"])).await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("{}/new/", server.uri()).as_str()),
        )
        .mount(&server)
        .await;
    mount_html(&server, "/new/", "<p>moved</p>").await;
    mount_html(&server, "/new", "<p>moved</p>").await;

    let discovered = crawl_domain(&server.uri(), 50, 4, 5.0, 1).await;

    assert_eq!(discovered, urls(&server, &["/", "/new"]));
}

#[tokio::test]
async fn test_redirect_off_domain_is_not_returned() {
    let server = MockServer::start().await;
    let elsewhere = MockServer::start().await;
    mount_html(&server, "/", anchors(&["/go"])).await;
    Mock::given(method("GET"))
        .and(path("/go"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", format!("{}/x", elsewhere.uri()).as_str()),
        )
        .mount(&server)
        .await;
    mount_html(&elsewhere, "/x", anchors(&["/y"])).await;
    mount_untouched(&elsewhere, "/y").await;

    let discovered = crawl_domain(&server.uri(), 10, 2, 5.0, 2).await;

    assert_eq!(discovered, urls(&server, &["/"]));
    assert!(!discovered.iter().any(|u| u.starts_with(&elsewhere.uri())));
}

#[tokio::test]
async fn test_huge_timeout_does_not_panic() {
    let discovered = crawl_domain("http://127.0.0.1:9/", 10, 2, 1e19, 0).await;
    assert!(discovered.is_empty());
}

#[tokio::test]
async fn test_budget_caps_large_site() {
    let server = MockServer::start().await;
    let many: Vec<String> = (0..40).map(|i| format!("/item{}", i)).collect();
    let many_refs: Vec<&str> = many.iter().map(String::as_str).collect();
    mount_html(&server, "/", anchors(&many_refs)).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/item\d+$"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(anchors(&["/"]), "text/html"))
        .mount(&server)
        .await;

    let discovered = crawl_domain(&server.uri(), 7, 8, 5.0, 3).await;

    assert_eq!(discovered.len(), 7);
    assert!(discovered.contains(&format!("{}/", server.uri())));
    let mut sorted = discovered.clone();
    sorted.sort();
    assert_eq!(discovered, sorted);
}

#[tokio::test]
async fn test_unreachable_start_returns_empty() {
    let discovered = crawl_domain("http://127.0.0.1:9/", 10, 2, 1.0, 2).await;
    assert!(discovered.is_empty());
}

#[tokio::test]
async fn test_invalid_start_returns_empty() {
    assert!(crawl_domain("not a url", 10, 2, 1.0, 2).await.is_empty());
}

#[tokio::test]
async fn test_custom_user_agent_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(wiremock::matchers::header("user-agent", "RippleTest/2.0"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = CrawlerConfig::new(5, 2, 5.0, 0);
    config.user_agent = "RippleTest/2.0".to_string();
    let discovered = crawl(&server.uri(), &config).await;

    assert_eq!(discovered, urls(&server, &["/"]));
}
