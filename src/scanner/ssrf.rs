//! Server-side request forgery probe

use crate::crawler::send_with_retry;
use crate::scanner::{Finding, ProbeContext, Severity};
use futures::stream::{self, StreamExt};

/// Internal and metadata targets injected into URL-like parameters
pub const SSRF_PAYLOADS: &[&str] = &[
    "http://127.0.0.1",
    "http://localhost",
    "http://169.254.169.254",
    "http://0.0.0.0",
    "http://[::1]",
    "http://169.254.169.254/latest/meta-data/",
    "http://internal.example.com",
    "http://localhost:80/admin",
];

/// Parameter names that commonly carry a URL
pub const SSRF_PARAM_NAMES: &[&str] = &[
    "url", "uri", "path", "target", "dest", "redirect", "next", "data", "resource",
];

/// Body fragments suggesting the server fetched an internal resource
pub const SSRF_INDICATORS: &[&str] = &["meta-data", "hostname", "root:x", "127.0.0.1", "localhost"];

/// Tries every parameter/payload pair against `target_url`
pub async fn scan_ssrf(ctx: &ProbeContext, target_url: &str) -> Vec<Finding> {
    tracing::debug!("Starting SSRF probe on {}", target_url);

    let pairs = SSRF_PARAM_NAMES
        .iter()
        .flat_map(|&param| SSRF_PAYLOADS.iter().map(move |&payload| (param, payload)));

    let results: Vec<Option<Finding>> = stream::iter(pairs)
        .map(|(param, payload)| test_ssrf(ctx, target_url, param, payload))
        .buffer_unordered(ctx.concurrency())
        .collect()
        .await;

    let findings: Vec<Finding> = results.into_iter().flatten().collect();
    for finding in &findings {
        tracing::info!(
            "Possible SSRF on {} via '{}'",
            finding.url,
            finding.parameter.as_deref().unwrap_or_default()
        );
    }
    findings
}

async fn test_ssrf(
    ctx: &ProbeContext,
    target_url: &str,
    param: &'static str,
    payload: &'static str,
) -> Option<Finding> {
    let request = ctx
        .client()
        .get(target_url)
        .query(&[(param, payload)])
        .build()
        .ok()?;

    let response = match send_with_retry(ctx.client(), request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!(
                "SSRF request failed on {} ({}={}): {}",
                target_url,
                param,
                payload,
                e
            );
            return None;
        }
    };

    let final_url = response.url().to_string();
    let status = response.status().as_u16();
    let body = match response.text().await {
        Ok(body) => body.to_lowercase(),
        Err(e) => {
            tracing::debug!("SSRF response body unreadable for {}: {}", final_url, e);
            return None;
        }
    };

    if !has_indicator(&body) {
        return None;
    }

    Some(
        Finding::new("SSRF", final_url, Severity::High)
            .with_parameter(param)
            .with_payload(payload)
            .with_status_code(status)
            .with_description(format!(
                "Potential SSRF via parameter '{}' using payload '{}'",
                param, payload
            )),
    )
}

fn has_indicator(lowered_body: &str) -> bool {
    SSRF_INDICATORS
        .iter()
        .any(|indicator| lowered_body.contains(indicator))
}
