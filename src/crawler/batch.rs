//! Per-level batch execution
//!
//! One breadth-first level is dispatched as a batch of fetch tasks. Tasks run
//! in a `JoinSet` behind a semaphore sized to the worker cap, and their
//! outcomes are folded into the crawl state in completion order. The batch
//! stops early when the discovery budget is spent or the wall-clock ceiling
//! expires; outstanding fetches are then cancelled and their results dropped.

use crate::crawler::fetcher::{fetch_page, FailureKind, FetchOutcome};
use crate::state::{CrawlState, Credit};
use reqwest::Client;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Limits applied to one batch
#[derive(Debug, Clone, Copy)]
pub struct BatchLimits {
    /// Maximum fetches in flight at once
    pub max_workers: usize,

    /// Wall-clock ceiling for the whole batch
    pub ceiling: Duration,
}

/// Why a batch returned before every fetch settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutShort {
    /// The discovered set reached `max_links`
    BudgetExhausted,

    /// The batch ceiling expired
    Deadline,
}

/// Summary of one batch, plus the links it produced for the next level
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Links extracted from credited HTML pages
    pub candidates: BTreeSet<String>,

    /// HTML pages fetched
    pub succeeded: usize,

    /// Non-HTML responses fetched
    pub non_html: usize,

    /// Fetches that failed (including ones cancelled mid-flight)
    pub failed: usize,

    /// Outcomes dropped because the budget was already spent
    pub discarded: usize,

    /// Fetches still outstanding when the batch was cut short
    pub abandoned: usize,

    /// Set when the batch did not wait for every fetch
    pub cut_short: Option<CutShort>,
}

impl BatchReport {
    /// Folds one outcome into the crawl state
    ///
    /// This is the only place the discovered set grows during a crawl.
    /// Final URLs of 2xx responses (HTML or not) are credited to the budget;
    /// extracted links are kept only when their page was credited.
    pub fn fold(&mut self, outcome: FetchOutcome, state: &mut CrawlState) {
        match outcome {
            FetchOutcome::Success {
                final_url,
                extracted_links,
            } => match state.credit(&final_url) {
                Credit::Added | Credit::Duplicate => {
                    tracing::debug!(
                        "Fetched ({}/{}): {} (+{} links)",
                        state.discovered_count(),
                        state.discovered_count() + state.remaining_budget(),
                        final_url,
                        extracted_links.len()
                    );
                    self.succeeded += 1;
                    self.candidates.extend(extracted_links);
                }
                Credit::OverBudget => self.discarded += 1,
            },
            FetchOutcome::NonHtml {
                final_url,
                content_type,
            } => match state.credit(&final_url) {
                Credit::Added | Credit::Duplicate => {
                    tracing::debug!("Fetched non-HTML {} ({})", final_url, content_type);
                    self.non_html += 1;
                }
                Credit::OverBudget => self.discarded += 1,
            },
            FetchOutcome::Failed { url, reason } => {
                tracing::debug!("Fetch failed for {}: {}", url, reason);
                if reason == FailureKind::Cancelled {
                    self.discarded += 1;
                } else {
                    self.failed += 1;
                }
            }
        }
    }

    /// Total outcomes observed by the fold
    pub fn settled(&self) -> usize {
        self.succeeded + self.non_html + self.failed + self.discarded
    }
}

/// Runs one level's fetches and folds their outcomes into `state`
///
/// # Arguments
///
/// * `client` - The shared HTTP client (cloned into each task)
/// * `urls` - The level's URLs, already marked visited
/// * `state` - The crawl state; borrowed mutably for the whole batch so the
///   fold is the single writer
/// * `limits` - Worker cap and wall-clock ceiling
///
/// # Returns
///
/// The batch report, including the union of extracted links
pub async fn run_batch(
    client: &Client,
    urls: Vec<String>,
    state: &mut CrawlState,
    limits: BatchLimits,
) -> BatchReport {
    let mut report = BatchReport::default();
    if urls.is_empty() {
        return report;
    }

    let cancel = CancellationToken::new();
    let semaphore = Arc::new(Semaphore::new(limits.max_workers.max(1)));
    let mut tasks = JoinSet::new();

    for url in urls {
        let client = client.clone();
        let cancel = cancel.clone();
        let semaphore = Arc::clone(&semaphore);

        tasks.spawn(async move {
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                permit = semaphore.acquire_owned() => permit.ok(),
            };

            match permit {
                Some(_permit) => fetch_page(&client, &url, &cancel).await,
                None => FetchOutcome::Failed {
                    url,
                    reason: FailureKind::Cancelled,
                },
            }
        });
    }

    // No deadline when the ceiling is too large to represent
    let deadline = Instant::now().checked_add(limits.ceiling);

    loop {
        let next = match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, tasks.join_next()).await,
            None => Ok(tasks.join_next().await),
        };
        let joined = match next {
            Ok(Some(joined)) => joined,
            Ok(None) => break,
            Err(_) => {
                tracing::warn!(
                    "Batch ceiling of {:?} reached with {} fetches outstanding",
                    limits.ceiling,
                    tasks.len()
                );
                report.cut_short = Some(CutShort::Deadline);
                break;
            }
        };

        match joined {
            Ok(outcome) => report.fold(outcome, state),
            Err(e) => {
                tracing::warn!("Fetch task ended abnormally: {}", e);
                report.failed += 1;
            }
        }

        if state.is_budget_exhausted() {
            if !tasks.is_empty() {
                report.cut_short = Some(CutShort::BudgetExhausted);
            }
            break;
        }
    }

    if !tasks.is_empty() {
        report.abandoned = tasks.len();
        cancel.cancel();
        tasks.abort_all();
        tracing::debug!("Abandoned {} outstanding fetches", report.abandoned);
    }

    report
}
