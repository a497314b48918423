//! Integration tests for the probes and reports
//!
//! Each test stands up a wiremock server shaped like a vulnerable (or
//! hardened) site and drives the public scanning API against it.

use ripple_scan::crawl_domain;
use ripple_scan::output::{analyze_vulnerabilities, load_json_report, write_json_report, ScanReport};
use ripple_scan::scanner::{
    build_probe_client, scan_url, scan_urls, Probe, ProbeContext, SECURITY_HEADERS,
};
use ripple_scan::Severity;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn context() -> ProbeContext {
    ProbeContext::new(
        build_probe_client("ripple-scan-test", Duration::from_secs(5)).unwrap(),
        8,
    )
}

fn hardened_page() -> ResponseTemplate {
    SECURITY_HEADERS
        .iter()
        .fold(ResponseTemplate::new(200), |template, (header, _)| {
            template.insert_header(*header, "set")
        })
        .set_body_raw("<p>hello</p>", "text/html")
}

#[tokio::test]
async fn test_hardened_site_has_no_header_findings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(hardened_page())
        .mount(&server)
        .await;

    let findings = scan_url(&context(), &server.uri(), &[Probe::Headers]).await;

    assert!(findings.is_empty(), "unexpected findings: {:?}", findings);
}

#[tokio::test]
async fn test_server_banner_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            hardened_page()
                .insert_header("Server", "Apache/2.4.1")
                .insert_header("X-Powered-By", "PHP/5.6"),
        )
        .mount(&server)
        .await;

    let findings = scan_url(&context(), &server.uri(), &[Probe::Headers]).await;

    assert_eq!(findings.len(), 2);
    assert!(findings
        .iter()
        .all(|f| f.kind == "Information Disclosure" && f.severity == Severity::Low));
    let headers: Vec<_> = findings.iter().filter_map(|f| f.header.as_deref()).collect();
    assert!(headers.contains(&"Server"));
    assert!(headers.contains(&"X-Powered-By"));
}

#[tokio::test]
async fn test_unreachable_url_yields_scan_error() {
    let findings = scan_url(&context(), "http://127.0.0.1:9/", &[Probe::Headers]).await;

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].kind, "Scan Error");
    assert_eq!(findings[0].severity, Severity::Low);
    assert!(findings[0].error.is_some());
}

#[tokio::test]
async fn test_ssrf_through_url_parameter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("url", "http://169.254.169.254/latest/meta-data/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("ami-id\ninstance-type\nmeta-data", "text/plain"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>nothing here</p>", "text/html"))
        .mount(&server)
        .await;

    let findings = scan_url(&context(), &server.uri(), &[Probe::Ssrf]).await;

    assert_eq!(findings.len(), 1);
    let finding = &findings[0];
    assert_eq!(finding.kind, "SSRF");
    assert_eq!(finding.severity, Severity::High);
    assert_eq!(finding.parameter.as_deref(), Some("url"));
    assert_eq!(
        finding.payload.as_deref(),
        Some("http://169.254.169.254/latest/meta-data/")
    );
    assert_eq!(finding.status_code, Some(200));
}

#[tokio::test]
async fn test_error_based_sql_injection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("test", "' OR 1=1--"))
        .respond_with(ResponseTemplate::new(500).set_body_raw(
            "You have an error in your SQL syntax near ''' at line 1",
            "text/html",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>results</p>", "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>results</p>", "text/html"))
        .mount(&server)
        .await;

    let findings = scan_url(&context(), &server.uri(), &[Probe::Injection]).await;

    let sqli: Vec<_> = findings
        .iter()
        .filter(|f| f.kind == "SQL Injection (Error-Based)")
        .collect();
    assert_eq!(sqli.len(), 1);
    assert_eq!(sqli[0].payload.as_deref(), Some("' OR 1=1--"));
    assert!(sqli[0].url.contains("test="));
    assert!(!findings.iter().any(|f| f.kind.starts_with("Reflected XSS")));
}

#[tokio::test]
async fn test_scan_urls_groups_findings_by_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/secure"))
        .respond_with(hardened_page())
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>bare</p>", "text/html"))
        .mount(&server)
        .await;

    let urls = vec![
        format!("{}/a", server.uri()),
        format!("{}/secure", server.uri()),
        format!("{}/b", server.uri()),
    ];
    let findings = scan_urls(&context(), &urls, &[Probe::Headers], 3).await;

    let missing: Vec<_> = findings
        .iter()
        .filter(|f| f.kind == "Missing Security Header")
        .collect();
    assert_eq!(missing.len(), SECURITY_HEADERS.len() * 2);
    assert!(missing[..SECURITY_HEADERS.len()].iter().all(|f| f.url == urls[0]));
    assert!(missing[SECURITY_HEADERS.len()..].iter().all(|f| f.url == urls[2]));
    assert!(!findings.iter().any(|f| f.url == urls[1]));
}

#[tokio::test]
async fn test_no_probes_sends_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let findings = scan_urls(&context(), &[server.uri()], &[], 4).await;

    assert!(findings.is_empty());
}

#[tokio::test]
async fn test_repeated_header_findings_collapse_in_analysis() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>bare</p>", "text/html"))
        .mount(&server)
        .await;

    let urls: Vec<String> = ["/one", "/two", "/three"]
        .iter()
        .map(|p| format!("{}{}", server.uri(), p))
        .collect();
    let findings = scan_urls(&context(), &urls, &[Probe::Headers], 2).await;
    let analysis = analyze_vulnerabilities(&findings);

    let missing_total = SECURITY_HEADERS.len() * urls.len();
    assert!(analysis.total_count >= missing_total);
    let csp = analysis
        .unique_results
        .iter()
        .find(|u| u.finding.header.as_deref() == Some("Content-Security-Policy"))
        .unwrap();
    assert_eq!(csp.affected_urls_count, 3);
    let mut expected = urls.clone();
    expected.sort();
    assert_eq!(csp.affected_urls, expected);
    assert_eq!(
        analysis.unique_severity_counts.get(&Severity::Medium).copied(),
        Some(SECURITY_HEADERS.len())
    );
}

#[tokio::test]
async fn test_crawl_scan_report_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Server", "nginx")
                .set_body_raw(r#"<a href="/contact">Contact</a>"#, "text/html"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/contact"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>write to us</p>", "text/html"))
        .mount(&server)
        .await;

    let discovered = crawl_domain(&server.uri(), 10, 4, 5.0, 1).await;
    assert_eq!(discovered.len(), 2);

    let findings = scan_urls(&context(), &discovered, &[Probe::Headers], 2).await;
    let report = ScanReport::new(server.uri(), discovered.clone(), findings);
    assert_eq!(report.total_vulnerabilities, report.results.len());
    assert!(report.unique_vulnerabilities <= report.total_vulnerabilities);

    let dir = TempDir::new().unwrap();
    let report_path = dir.path().join("scan.json");
    write_json_report(&report, &report_path).unwrap();
    let loaded = load_json_report(&report_path).unwrap();

    assert_eq!(loaded.target, server.uri());
    assert_eq!(loaded.discovered_urls, discovered);
    assert_eq!(loaded.results, report.results);
    assert_eq!(loaded.vulnerability_analysis, report.vulnerability_analysis);

    let raw = std::fs::read_to_string(&report_path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["results"][0]["type"], "Missing Security Header");
    assert!(json["vulnerability_analysis"]["affected_urls_per_vuln"].is_object());
}
