//! Security header probe

use crate::crawler::send_with_retry;
use crate::scanner::{Finding, ProbeContext, Severity};
use reqwest::header::HeaderMap;

/// Headers whose absence is reported, with what each one protects against
pub const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("Content-Security-Policy", "Prevents XSS attacks"),
    ("X-Content-Type-Options", "Prevents MIME-type sniffing"),
    ("X-Frame-Options", "Protects against clickjacking"),
    ("Strict-Transport-Security", "Enforces HTTPS"),
    ("Referrer-Policy", "Controls how much referrer info is shared"),
    ("X-Permitted-Cross-Domain-Policies", "Cross-domain policy control"),
    ("X-XSS-Protection", "XSS protection"),
];

/// Headers whose presence leaks server details
pub const INFO_DISCLOSURE_HEADERS: &[(&str, &str)] = &[
    ("Server", "Server header reveals server information"),
    (
        "X-Powered-By",
        "X-Powered-By header reveals server information",
    ),
];

/// Fetches `url` once and reports missing and over-sharing headers
///
/// A failed fetch yields a single Low "Scan Error" finding.
pub async fn scan_security_headers(ctx: &ProbeContext, url: &str) -> Vec<Finding> {
    let request = match ctx.client().get(url).build() {
        Ok(request) => request,
        Err(e) => return vec![Finding::scan_error(url, format!("Failed to fetch URL: {}", e))],
    };

    match send_with_retry(ctx.client(), request).await {
        Ok(response) => check_headers(url, response.headers()),
        Err(e) => {
            tracing::debug!("Header probe could not fetch {}: {}", url, e);
            vec![Finding::scan_error(url, format!("Failed to fetch URL: {}", e))]
        }
    }
}

/// Evaluates a response's headers without any I/O
pub fn check_headers(url: &str, headers: &HeaderMap) -> Vec<Finding> {
    let mut findings = Vec::new();

    for (header, description) in SECURITY_HEADERS {
        if headers.contains_key(*header) {
            continue;
        }
        findings.push(
            Finding::new("Missing Security Header", url, Severity::Medium)
                .with_header(*header)
                .with_description(*description)
                .with_location("HTTP Response Headers")
                .with_payload(format!("Missing: {}", header))
                .with_evidence(format!("{} header not present - {}", header, description)),
        );
    }

    for (header, description) in INFO_DISCLOSURE_HEADERS {
        let Some(value) = headers.get(*header) else {
            continue;
        };
        let value = String::from_utf8_lossy(value.as_bytes());
        findings.push(
            Finding::new("Information Disclosure", url, Severity::Low)
                .with_header(*header)
                .with_description(*description)
                .with_location(format!("{} header", header))
                .with_payload(format!("{}: {}", header, value))
                .with_evidence(*description),
        );
    }

    findings
}
