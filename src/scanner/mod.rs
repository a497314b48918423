//! Vulnerability probes run against discovered URLs
//!
//! Each probe takes one URL and returns zero or more findings:
//! - Headers: missing security headers and server banner disclosure
//! - Injection: error/time-based SQL injection and reflected XSS
//! - SSRF: server-side request forgery through common URL parameters
//!
//! Probes never fail as a whole. Request errors are logged and the payload
//! that caused them simply produces no finding.

mod finding;
mod headers;
mod injection;
mod ssrf;

pub use finding::{Finding, Severity};
pub use headers::{scan_security_headers, INFO_DISCLOSURE_HEADERS, SECURITY_HEADERS};
pub use injection::{scan_injection, SQLI_PAYLOADS, SQL_ERRORS, XSS_PAYLOADS};
pub use ssrf::{scan_ssrf, SSRF_INDICATORS, SSRF_PARAM_NAMES, SSRF_PAYLOADS};

use crate::config::Config;
use futures::stream::{self, StreamExt};
use reqwest::{redirect::Policy, Client};
use std::fmt;
use std::time::Duration;

/// Maximum redirect hops followed by probe requests
const MAX_PROBE_REDIRECTS: usize = 10;

/// One of the available vulnerability checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Probe {
    Headers,
    Injection,
    Ssrf,
}

impl Probe {
    pub const ALL: [Probe; 3] = [Probe::Headers, Probe::Injection, Probe::Ssrf];

    /// The probes switched on in `[scan]`, in a fixed order
    pub fn enabled(config: &Config) -> Vec<Probe> {
        Self::ALL
            .into_iter()
            .filter(|probe| match probe {
                Self::Headers => config.scan.headers,
                Self::Injection => config.scan.injection,
                Self::Ssrf => config.scan.ssrf,
            })
            .collect()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Headers => "headers",
            Self::Injection => "injection",
            Self::Ssrf => "ssrf",
        }
    }

    /// Runs this probe against one URL
    pub async fn run(&self, ctx: &ProbeContext, url: &str) -> Vec<Finding> {
        match self {
            Self::Headers => scan_security_headers(ctx, url).await,
            Self::Injection => scan_injection(ctx, url).await,
            Self::Ssrf => scan_ssrf(ctx, url).await,
        }
    }
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shared resources for running probes
#[derive(Debug, Clone)]
pub struct ProbeContext {
    client: Client,
    concurrency: usize,
}

impl ProbeContext {
    /// Wraps an existing client; `concurrency` bounds payload requests per probe
    pub fn new(client: Client, concurrency: usize) -> Self {
        Self {
            client,
            concurrency: concurrency.max(1),
        }
    }

    /// Builds a probe client from the `[http]` and `[scan]` sections
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_probe_client(&config.http.user_agent, config.scan.request_timeout())?;
        Ok(Self::new(client, config.scan.probe_concurrency))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }
}

/// Builds the HTTP client used by probes
///
/// Sends no `Accept` preference and applies a single overall timeout.
pub fn build_probe_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .redirect(Policy::limited(MAX_PROBE_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Runs `probes` in order against one URL
pub async fn scan_url(ctx: &ProbeContext, url: &str, probes: &[Probe]) -> Vec<Finding> {
    let mut findings = Vec::new();

    for probe in probes {
        let found = probe.run(ctx, url).await;
        tracing::debug!("{} probe on {}: {} findings", probe, url, found.len());
        findings.extend(found);
    }

    findings
}

/// Runs `scan_url` over every URL, `max_concurrent` URLs at a time
///
/// Findings are returned grouped by URL in input order.
pub async fn scan_urls(
    ctx: &ProbeContext,
    urls: &[String],
    probes: &[Probe],
    max_concurrent: usize,
) -> Vec<Finding> {
    if probes.is_empty() {
        return Vec::new();
    }

    tracing::info!(
        "Probing {} URLs with [{}]",
        urls.len(),
        probes
            .iter()
            .map(Probe::name)
            .collect::<Vec<_>>()
            .join(", ")
    );

    let per_url: Vec<Vec<Finding>> = stream::iter(urls)
        .map(|url| scan_url(ctx, url, probes))
        .buffered(max_concurrent.max(1))
        .collect()
        .await;

    let findings: Vec<Finding> = per_url.into_iter().flatten().collect();
    tracing::info!("Probing finished: {} findings", findings.len());
    findings
}
