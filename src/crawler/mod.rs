//! Crawler module for bounded site discovery
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry and cancellation
//! - HTML and script link extraction
//! - Per-level batch execution under a worker cap
//! - Overall breadth-first crawl coordination

mod batch;
mod coordinator;
mod fetcher;
mod parser;

pub use batch::{run_batch, BatchLimits, BatchReport, CutShort};
pub use coordinator::Coordinator;
pub use fetcher::{
    build_http_client, fetch_page, is_retryable_status, send_with_retry, FailureKind,
    FetchOutcome,
};
pub use parser::{extract_links, extract_markup_links, extract_script_links};

use crate::config::CrawlerConfig;

/// Runs a complete crawl from `start_url`
///
/// This is the main entry point for discovery. It will:
/// 1. Build the HTTP client
/// 2. Seed the frontier with the start URL and conventional paths
/// 3. Fetch level by level until depth, budget or frontier run out
/// 4. Return the discovered URLs in sorted order
///
/// Never fails: a client that cannot be built or a bad start URL both
/// produce an empty list.
pub async fn crawl(start_url: &str, config: &CrawlerConfig) -> Vec<String> {
    match Coordinator::new(config.clone()) {
        Ok(coordinator) => coordinator.run(start_url).await,
        Err(e) => {
            tracing::error!("Failed to set up crawler: {}", e);
            Vec::new()
        }
    }
}

/// Crawls a domain with explicit limits and the default user agent
///
/// # Arguments
///
/// * `start_url` - Absolute URL the crawl starts from; defines the domain
/// * `max_links` - Hard cap on the number of returned URLs
/// * `max_threads` - Maximum concurrent fetches
/// * `timeout` - Per-request read timeout in seconds
/// * `max_depth` - Deepest breadth-first level explored (0 = seeds only)
///
/// # Example
///
/// ```no_run
/// # async fn demo() {
/// let urls = ripple_scan::crawl_domain("https://example.com", 50, 15, 8.0, 2).await;
/// assert!(urls.len() <= 50);
/// # }
/// ```
pub async fn crawl_domain(
    start_url: &str,
    max_links: usize,
    max_threads: usize,
    timeout: f64,
    max_depth: u32,
) -> Vec<String> {
    let config = CrawlerConfig::new(max_links, max_threads, timeout, max_depth);
    crawl(start_url, &config).await
}
