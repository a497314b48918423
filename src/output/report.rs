//! The scan report and its JSON form

use crate::output::analysis::{analyze_vulnerabilities, VulnerabilityAnalysis};
use crate::scanner::Finding;
use crate::ScanError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Everything produced by one crawl-and-scan run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// The start URL as given by the user
    pub target: String,

    pub generated_at: DateTime<Utc>,

    /// URLs returned by the crawl, sorted
    pub discovered_urls: Vec<String>,

    pub total_vulnerabilities: usize,

    pub unique_vulnerabilities: usize,

    pub vulnerability_analysis: VulnerabilityAnalysis,

    /// Every finding, in probe order
    pub results: Vec<Finding>,
}

impl ScanReport {
    /// Builds a report, running the analysis over `results`
    pub fn new(target: impl Into<String>, discovered_urls: Vec<String>, results: Vec<Finding>) -> Self {
        let vulnerability_analysis = analyze_vulnerabilities(&results);

        Self {
            target: target.into(),
            generated_at: Utc::now(),
            discovered_urls,
            total_vulnerabilities: results.len(),
            unique_vulnerabilities: vulnerability_analysis.unique_count,
            vulnerability_analysis,
            results,
        }
    }

    /// Serializes the report as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, ScanError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Writes the report as JSON to `output_path`
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(ScanError)` - Failed to create the file or serialize
pub fn write_json_report(report: &ScanReport, output_path: &Path) -> Result<(), ScanError> {
    let mut writer = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::info!("JSON report written to {}", output_path.display());
    Ok(())
}

/// Reads a report previously written with [`write_json_report`]
pub fn load_json_report(path: &Path) -> Result<ScanReport, ScanError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
}
