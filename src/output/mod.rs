//! Output module for scan reports
//!
//! This module handles:
//! - Deduplicating findings into unique vulnerabilities
//! - Writing the JSON scan report
//! - Rendering a markdown report
//! - Printing a console summary

mod analysis;
mod markdown;
mod report;
pub mod stats;

pub use analysis::{analyze_vulnerabilities, UniqueFinding, VulnerabilityAnalysis};
pub use markdown::{format_markdown_report, generate_markdown_report};
pub use report::{load_json_report, write_json_report, ScanReport};
pub use stats::{format_summary, print_summary};
