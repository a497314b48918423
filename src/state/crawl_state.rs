use crate::state::CrawlPhase;
use crate::ScanError;
use std::collections::HashSet;

/// Result of crediting a fetched URL to the discovered set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credit {
    /// The URL was new and now counts toward the budget
    Added,

    /// The URL was already discovered; the budget is unchanged
    Duplicate,

    /// The budget was already spent; the URL was discarded
    OverBudget,
}

/// Mutable state of a single crawl invocation
///
/// `CrawlState` is created fresh for every crawl and owned by the frontier
/// coordinator. Fetch workers never see it: they return outcomes, and the
/// batch runner folds those outcomes in through `&mut self`, which gives the
/// fold exclusive access without holding any lock across network I/O.
///
/// Invariants:
/// - `discovered` only grows and never exceeds `max_links`
/// - `remaining_budget() == max_links - discovered.len()`
#[derive(Debug)]
pub struct CrawlState {
    discovered: HashSet<String>,
    visited: HashSet<String>,
    max_links: usize,
    phase: CrawlPhase,
}

impl CrawlState {
    /// Creates an empty state in the `Seeding` phase
    pub fn new(max_links: usize) -> Self {
        Self {
            discovered: HashSet::new(),
            visited: HashSet::new(),
            max_links,
            phase: CrawlPhase::Seeding,
        }
    }

    /// Returns the current phase
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Returns the current breadth-first depth (0 before the first level)
    pub fn depth(&self) -> u32 {
        self.phase.depth().unwrap_or(0)
    }

    /// Moves the state machine to `next`
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The transition was legal and applied
    /// * `Err(ScanError::InvalidTransition)` - The transition was rejected
    pub fn transition(&mut self, next: CrawlPhase) -> Result<(), ScanError> {
        if !self.phase.can_transition_to(next) {
            return Err(ScanError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }

        tracing::trace!("Crawl phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Number of URLs discovered so far
    pub fn discovered_count(&self) -> usize {
        self.discovered.len()
    }

    /// Number of URLs dispatched as fetch targets so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Number of URLs that can still be added before the budget is spent
    pub fn remaining_budget(&self) -> usize {
        self.max_links.saturating_sub(self.discovered.len())
    }

    /// Returns true once the discovered set has reached `max_links`
    pub fn is_budget_exhausted(&self) -> bool {
        self.remaining_budget() == 0
    }

    /// Returns true if the URL has already been dispatched
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Returns true if the URL is already in the discovered set
    pub fn is_discovered(&self, url: &str) -> bool {
        self.discovered.contains(url)
    }

    /// Selects the next batch from a frontier and marks it visited
    ///
    /// The batch is `frontier - visited`, deduplicated, in frontier order,
    /// truncated to the remaining budget.
    pub fn select_batch(&mut self, frontier: &[String]) -> Vec<String> {
        let budget = self.remaining_budget();
        let mut batch = Vec::new();

        for url in frontier {
            if batch.len() >= budget {
                break;
            }
            if self.visited.insert(url.clone()) {
                batch.push(url.clone());
            }
        }

        batch
    }

    /// Credits a successfully fetched final URL to the discovered set
    ///
    /// This is the only way `discovered` grows. Once the budget is spent,
    /// new URLs are discarded rather than exceeding it.
    pub fn credit(&mut self, final_url: &str) -> Credit {
        if self.discovered.contains(final_url) {
            return Credit::Duplicate;
        }
        if self.is_budget_exhausted() {
            return Credit::OverBudget;
        }

        self.discovered.insert(final_url.to_string());
        Credit::Added
    }

    /// Consumes the state and returns the discovered URLs
    ///
    /// The list is sorted for stable output; callers must not rely on any
    /// particular order.
    pub fn into_discovered(self) -> Vec<String> {
        let mut urls: Vec<String> = self.discovered.into_iter().collect();
        urls.sort();
        urls.truncate(self.max_links);
        urls
    }
}
