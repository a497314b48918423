//! Crawler coordinator - breadth-first level loop
//!
//! This module owns a crawl from seeding to completion:
//! - Seeding the level-0 frontier with the start URL and conventional paths
//! - Selecting each level's batch under the remaining budget
//! - Handing batches to the batch runner and collecting the next frontier
//! - Stopping on depth, budget or an empty frontier

use crate::config::CrawlerConfig;
use crate::crawler::batch::{run_batch, BatchLimits};
use crate::crawler::fetcher::{build_http_client, MAX_RETRIES, RETRY_BACKOFF_BASE};
use crate::state::{CrawlPhase, CrawlState};
use crate::url::{common_path_urls, normalize_url};
use crate::ScanError;
use reqwest::Client;
use std::time::{Duration, Instant};
use url::Url;

/// A batch may run for this many read timeouts before it is cut off
const BATCH_TIMEOUT_MULTIPLIER: u32 = 3;

/// Main crawler coordinator structure
pub struct Coordinator {
    config: CrawlerConfig,
    client: Client,
}

impl Coordinator {
    /// Creates a coordinator with its own HTTP client
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to crawl
    /// * `Err(ScanError)` - The HTTP client could not be built
    pub fn new(config: CrawlerConfig) -> Result<Self, ScanError> {
        let client = build_http_client(&config)?;
        Ok(Self::with_client(config, client))
    }

    /// Creates a coordinator around an existing client
    pub fn with_client(config: CrawlerConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// Crawls from `start_url` and returns the sorted discovered URLs
    ///
    /// Never fails: an invalid start URL or any internal error yields an
    /// empty list, and individual fetch failures only shrink the result.
    pub async fn run(&self, start_url: &str) -> Vec<String> {
        match self.try_run(start_url).await {
            Ok(urls) => urls,
            Err(e) => {
                tracing::warn!("Crawl of {} aborted: {}", start_url, e);
                Vec::new()
            }
        }
    }

    async fn try_run(&self, start_url: &str) -> Result<Vec<String>, ScanError> {
        let started = Instant::now();
        let mut state = CrawlState::new(self.config.max_links);

        let mut frontier = seed_frontier(start_url)?;
        tracing::info!(
            "Starting crawl of {} (max_links={}, max_depth={}, workers={})",
            frontier[0],
            self.config.max_links,
            self.config.max_depth,
            self.config.max_threads
        );

        state.transition(CrawlPhase::LevelActive { depth: 0 })?;
        let limits = self.batch_limits();

        loop {
            let depth = state.depth();
            if depth > self.config.max_depth || state.is_budget_exhausted() {
                break;
            }

            let batch = state.select_batch(&frontier);
            if batch.is_empty() {
                tracing::debug!("Depth {}: nothing left to fetch", depth);
                break;
            }

            tracing::info!(
                "Depth {}: fetching {} URLs ({}/{} discovered)",
                depth,
                batch.len(),
                state.discovered_count(),
                self.config.max_links
            );

            let report = run_batch(&self.client, batch, &mut state, limits).await;

            tracing::info!(
                "Depth {} done: {} pages, {} non-HTML, {} failed, {} new candidates",
                depth,
                report.succeeded,
                report.non_html,
                report.failed,
                report.candidates.len()
            );

            if state.is_budget_exhausted() {
                tracing::info!("Link budget of {} reached", self.config.max_links);
                break;
            }

            frontier = report
                .candidates
                .into_iter()
                .filter(|url| !state.is_visited(url))
                .collect();

            state.transition(CrawlPhase::LevelActive { depth: depth + 1 })?;
        }

        state.transition(CrawlPhase::Done)?;

        let visited = state.visited_count();
        let urls = state.into_discovered();
        tracing::info!(
            "Crawl completed in {:.2?}: {} URLs discovered, {} fetched",
            started.elapsed(),
            urls.len(),
            visited
        );

        Ok(urls)
    }

    /// Wall-clock ceiling and worker cap for each level's batch
    fn batch_limits(&self) -> BatchLimits {
        let backoff: Duration = (0..MAX_RETRIES)
            .map(|attempt| RETRY_BACKOFF_BASE * 2u32.pow(attempt))
            .sum();
        let ceiling = self
            .config
            .read_timeout()
            .saturating_mul(BATCH_TIMEOUT_MULTIPLIER)
            .saturating_add(backoff);

        BatchLimits {
            max_workers: self.config.max_threads,
            ceiling,
        }
    }
}

/// Builds the level-0 frontier: the start URL first, then the conventional
/// paths in declared order, without duplicates
fn seed_frontier(start_url: &str) -> Result<Vec<String>, ScanError> {
    let parsed = Url::parse(start_url).map_err(|source| ScanError::StartUrl {
        url: start_url.to_string(),
        source,
    })?;
    if parsed.host_str().is_none() {
        return Err(ScanError::StartUrl {
            url: start_url.to_string(),
            source: url::ParseError::EmptyHost,
        });
    }

    let start = normalize_url(parsed.as_str());
    let mut frontier = vec![start.clone()];
    for url in common_path_urls(&start) {
        if !frontier.contains(&url) {
            frontier.push(url);
        }
    }

    Ok(frontier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::COMMON_PATHS;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_seed_frontier_start_first() {
        let frontier = seed_frontier("https://Example.com/start/").unwrap();
        assert_eq!(frontier[0], "https://example.com/start");
        assert_eq!(frontier[1], "https://example.com/about");
        assert_eq!(frontier.len(), COMMON_PATHS.len() + 1);
    }

    #[test]
    fn test_seed_frontier_dedups_common_path_start() {
        let frontier = seed_frontier("https://example.com/about/").unwrap();
        assert_eq!(frontier[0], "https://example.com/about");
        assert_eq!(frontier.len(), COMMON_PATHS.len());
    }

    #[test]
    fn test_seed_frontier_rejects_bad_start() {
        assert!(matches!(
            seed_frontier("not a url"),
            Err(ScanError::StartUrl { .. })
        ));
        assert!(matches!(
            seed_frontier("mailto:someone@example.com"),
            Err(ScanError::StartUrl { .. })
        ));
    }

    #[test]
    fn test_batch_ceiling_covers_timeout_and_backoff() {
        let coordinator = Coordinator::new(CrawlerConfig::new(10, 2, 2.0, 1)).unwrap();
        let limits = coordinator.batch_limits();
        assert_eq!(limits.max_workers, 2);
        assert!(limits.ceiling >= Duration::from_secs(6));
        assert!(limits.ceiling < Duration::from_secs(7));
    }

    #[test]
    fn test_batch_ceiling_saturates_for_huge_timeout() {
        let coordinator = Coordinator::new(CrawlerConfig::new(10, 2, 1e19, 1)).unwrap();
        assert_eq!(coordinator.batch_limits().ceiling, Duration::MAX);
    }

    #[tokio::test]
    async fn test_run_invalid_start_is_empty() {
        let coordinator = Coordinator::new(CrawlerConfig::default()).unwrap();
        assert!(coordinator.run("::::").await.is_empty());
    }

    #[tokio::test]
    async fn test_run_zero_budget_fetches_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
            .expect(0)
            .mount(&server)
            .await;

        let coordinator = Coordinator::new(CrawlerConfig::new(0, 4, 2.0, 2)).unwrap();
        assert!(coordinator.run(&server.uri()).await.is_empty());
    }

    #[tokio::test]
    async fn test_run_follows_levels() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(r#"<a href="/level1">1</a>"#, "text/html"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/level1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(r#"<a href="/level2">2</a>"#, "text/html"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/level2"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
            .expect(0)
            .mount(&server)
            .await;

        let coordinator = Coordinator::new(CrawlerConfig::new(20, 4, 2.0, 1)).unwrap();
        let urls = coordinator.run(&server.uri()).await;

        assert_eq!(
            urls,
            vec![
                format!("{}/", server.uri()),
                format!("{}/level1", server.uri()),
            ]
        );
    }
}
