//! Ripple-Scan: a bounded site crawler feeding lightweight vulnerability probes
//!
//! This crate discovers the reachable pages of a single web domain with a
//! budgeted, depth-limited, concurrent breadth-first crawl, then hands the
//! discovered URLs to header, injection and SSRF probes.

pub mod config;
pub mod crawler;
pub mod output;
pub mod scanner;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Ripple-Scan operations
///
/// Crawling and probing never fail as a whole (they degrade to empty
/// results), so this type covers setup and output only.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid start URL '{url}': {source}")]
    StartUrl {
        url: String,
        source: ::url::ParseError,
    },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Ripple-Scan operations
pub type Result<T> = std::result::Result<T, ScanError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, crawl_domain};
pub use scanner::{Finding, Probe, Severity};
pub use state::{CrawlPhase, CrawlState};
pub use url::{is_eligible, normalize_url};
