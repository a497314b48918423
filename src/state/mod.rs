//! State module for tracking crawl progress
//!
//! This module provides the state owned by one crawl invocation.
//!
//! # Components
//!
//! - `CrawlPhase`: The breadth-first state machine (seeding, active level, done)
//! - `CrawlState`: The discovered set, visited set and remaining budget

mod crawl_phase;
mod crawl_state;

// Re-export main types
pub use crawl_phase::CrawlPhase;
pub use crawl_state::{CrawlState, Credit};
