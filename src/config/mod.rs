//! Configuration module for Ripple-Scan
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so running without a file is equivalent to loading
//! an empty one.
//!
//! # Example
//!
//! ```no_run
//! use ripple_scan::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("ripple-scan.toml")).unwrap();
//! println!("Crawler will stop after {} links", config.crawler.max_links);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, HttpConfig, OutputConfig, ScanConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::{validate, validate_crawler_config};
