//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client with split connect/read timeouts
//! - Retrying transient status codes for idempotent requests
//! - Following redirects and normalizing the final URL
//! - Classifying every fetch into a `FetchOutcome`

use crate::config::CrawlerConfig;
use crate::crawler::parser::extract_links;
use crate::url::{is_eligible, normalize_url};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client, Method, Request, Response, StatusCode};
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Extra attempts allowed for a transient status
pub const MAX_RETRIES: u32 = 1;

/// Backoff before the first retry; doubles on each further attempt
pub const RETRY_BACKOFF_BASE: Duration = Duration::from_millis(200);

/// Status codes treated as transient
const RETRYABLE_STATUSES: &[u16] = &[429, 500, 502, 503, 504];

/// Media types that are parsed for links
const HTML_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// Maximum redirect hops followed per request
const MAX_REDIRECTS: usize = 10;

/// Why a fetch produced no page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Connect or read timeout expired
    Timeout,

    /// Connection refused, DNS failure, TLS handshake failure
    Connect,

    /// The final response had a non-2xx status
    Status(u16),

    /// Redirect chain too long or looping
    Redirect,

    /// A redirect left the crawl's scope; holds the final URL
    OffDomain(String),

    /// The response body could not be read
    Body(String),

    /// Any other transport or protocol error
    Transport(String),

    /// The batch was cut short before this fetch completed
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::Connect => write!(f, "connection failed"),
            Self::Status(code) => write!(f, "HTTP {}", code),
            Self::Redirect => write!(f, "redirect error"),
            Self::OffDomain(target) => write!(f, "redirected out of scope to {}", target),
            Self::Body(e) => write!(f, "body read failed: {}", e),
            Self::Transport(e) => write!(f, "transport error: {}", e),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Result of a fetch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// HTML page fetched and parsed
    Success {
        /// Normalized URL after redirects
        final_url: String,
        /// Eligible links found on the page
        extracted_links: BTreeSet<String>,
    },

    /// 2xx response that is not HTML; no links were extracted
    NonHtml {
        /// Normalized URL after redirects
        final_url: String,
        /// The Content-Type received
        content_type: String,
    },

    /// No usable response
    Failed {
        /// The URL that was requested
        url: String,
        /// The failure classification
        reason: FailureKind,
    },
}

impl FetchOutcome {
    /// Returns the final URL for outcomes that reached a 2xx response
    pub fn final_url(&self) -> Option<&str> {
        match self {
            Self::Success { final_url, .. } | Self::NonHtml { final_url, .. } => Some(final_url),
            Self::Failed { .. } => None,
        }
    }

    /// Returns true for `Failed` outcomes
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Builds the HTTP client shared by every fetch in one crawl
///
/// # Arguments
///
/// * `config` - The crawler configuration (timeouts and user agent)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use ripple_scan::config::CrawlerConfig;
/// use ripple_scan::crawler::build_http_client;
///
/// # async fn demo() -> Result<(), reqwest::Error> {
/// let client = build_http_client(&CrawlerConfig::default())?;
/// let response = client.get("https://example.com/").send().await?;
/// println!("{} -> {}", response.url(), response.status());
/// # Ok(())
/// # }
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,*/*;q=0.8"),
    );

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(config.read_timeout())
        .connect_timeout(config.connect_timeout())
        .redirect(Policy::limited(MAX_REDIRECTS))
        .pool_max_idle_per_host(config.max_threads.max(1))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches one URL and classifies the result
///
/// # Request Flow
///
/// 1. Bail out immediately if the batch is already cancelled
/// 2. Send a GET, following redirects; retry transient statuses
/// 3. Classify the final response:
///    - non-2xx → `Failed { Status }`
///    - redirected to a URL ineligible against the requested one → `Failed { OffDomain }`
///    - 2xx, not HTML → `NonHtml`
///    - 2xx HTML → extract links → `Success`
///
/// Transport errors never escape: they become `Failed` outcomes. If the
/// cancellation token fires while the request is in flight, the request is
/// dropped and `Failed { Cancelled }` is returned.
///
/// # Arguments
///
/// * `client` - The shared HTTP client
/// * `url` - The canonical URL to fetch
/// * `cancel` - The batch cancellation token
pub async fn fetch_page(client: &Client, url: &str, cancel: &CancellationToken) -> FetchOutcome {
    if cancel.is_cancelled() {
        return FetchOutcome::Failed {
            url: url.to_string(),
            reason: FailureKind::Cancelled,
        };
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => FetchOutcome::Failed {
            url: url.to_string(),
            reason: FailureKind::Cancelled,
        },
        outcome = fetch_and_classify(client, url) => outcome,
    }
}

async fn fetch_and_classify(client: &Client, url: &str) -> FetchOutcome {
    let failed = |reason| FetchOutcome::Failed {
        url: url.to_string(),
        reason,
    };

    let request = match client.request(Method::GET, url).build() {
        Ok(request) => request,
        Err(e) => return failed(classify_error(&e)),
    };

    let response = match send_with_retry(client, request).await {
        Ok(response) => response,
        Err(e) => return failed(classify_error(&e)),
    };

    let status = response.status();
    if !status.is_success() {
        return failed(FailureKind::Status(status.as_u16()));
    }

    let final_url = normalize_url(response.url().as_str());
    if final_url != normalize_url(url) && !is_eligible(&final_url, url) {
        return failed(FailureKind::OffDomain(final_url));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_lowercase();

    if !is_html(&content_type) {
        return FetchOutcome::NonHtml {
            final_url,
            content_type,
        };
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) if e.is_timeout() => return failed(FailureKind::Timeout),
        Err(e) => return failed(FailureKind::Body(e.to_string())),
    };

    let extracted_links = extract_links(&body, &final_url);

    FetchOutcome::Success {
        final_url,
        extracted_links,
    }
}

/// Sends a request, retrying transient statuses for idempotent methods
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 429, 500, 502, 503, 504 on GET/HEAD/OPTIONS | Retry up to `MAX_RETRIES` times, 200ms backoff doubling |
/// | Same statuses on other methods | Return the response as-is |
/// | Transport error | Return the error immediately |
///
/// The last response is returned even if it still carries a transient status.
pub async fn send_with_retry(client: &Client, request: Request) -> Result<Response, reqwest::Error> {
    let retry_allowed = is_idempotent(request.method());
    let mut pending = request;
    let mut attempt = 0;

    loop {
        let spare = if retry_allowed && attempt < MAX_RETRIES {
            pending.try_clone()
        } else {
            None
        };
        let url = pending.url().to_string();

        let response = client.execute(pending).await?;

        match spare {
            Some(next) if is_retryable_status(response.status()) => {
                let backoff = RETRY_BACKOFF_BASE * 2u32.pow(attempt);
                tracing::debug!(
                    "Transient {} from {}, retrying in {:?}",
                    response.status(),
                    url,
                    backoff
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
                pending = next;
            }
            _ => return Ok(response),
        }
    }
}

/// Returns true for statuses worth retrying
pub fn is_retryable_status(status: StatusCode) -> bool {
    RETRYABLE_STATUSES.contains(&status.as_u16())
}

fn is_idempotent(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

fn is_html(content_type: &str) -> bool {
    HTML_CONTENT_TYPES
        .iter()
        .any(|html| content_type.contains(html))
}

fn classify_error(e: &reqwest::Error) -> FailureKind {
    if e.is_timeout() {
        FailureKind::Timeout
    } else if e.is_connect() {
        FailureKind::Connect
    } else if e.is_redirect() {
        FailureKind::Redirect
    } else {
        FailureKind::Transport(e.to_string())
    }
}
