//! Markdown report generation
//!
//! This module renders a scan report as a human-readable markdown document:
//! run information, severity breakdown, unique vulnerabilities with their
//! affected URLs, and the list of discovered URLs.

use crate::output::report::ScanReport;
use crate::scanner::Severity;
use crate::ScanError;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Affected URLs listed per vulnerability before truncating
const MAX_AFFECTED_URLS_SHOWN: usize = 10;

/// Discovered URLs listed before truncating
const MAX_DISCOVERED_URLS_SHOWN: usize = 100;

/// Generates a markdown report file
///
/// # Arguments
///
/// * `report` - The scan report
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown report
/// * `Err(ScanError)` - Failed to write the file
pub fn generate_markdown_report(report: &ScanReport, output_path: &Path) -> Result<(), ScanError> {
    let markdown = format_markdown_report(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    tracing::info!("Markdown report written to {}", output_path.display());
    Ok(())
}

/// Formats a scan report as markdown
pub fn format_markdown_report(report: &ScanReport) -> String {
    let analysis = &report.vulnerability_analysis;
    let mut md = String::new();

    // Title
    md.push_str("# Ripple-Scan Security Report\n\n");

    // Run metadata
    md.push_str("## Scan Information\n\n");
    md.push_str(&format!("- **Target**: {}\n", report.target));
    md.push_str(&format!(
        "- **Generated**: {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!(
        "- **URLs Discovered**: {}\n",
        report.discovered_urls.len()
    ));
    md.push_str(&format!(
        "- **Total Findings**: {}\n",
        report.total_vulnerabilities
    ));
    md.push_str(&format!(
        "- **Unique Vulnerabilities**: {}\n\n",
        report.unique_vulnerabilities
    ));

    // Severity breakdown
    md.push_str("## Severity Breakdown\n\n");
    md.push_str("| Severity | Unique | Total |\n");
    md.push_str("|----------|--------|-------|\n");
    for severity in Severity::ALL {
        md.push_str(&format!(
            "| {} | {} | {} |\n",
            severity,
            analysis.unique_severity_counts.get(&severity).unwrap_or(&0),
            analysis.total_severity_counts.get(&severity).unwrap_or(&0)
        ));
    }
    md.push('\n');

    // Unique vulnerabilities, most severe first
    if analysis.unique_results.is_empty() {
        md.push_str("## Vulnerabilities\n\nNo vulnerabilities found.\n\n");
    } else {
        md.push_str("## Vulnerabilities\n\n");
        for severity in Severity::ALL {
            for unique in analysis.unique_with_severity(severity) {
                let finding = &unique.finding;
                md.push_str(&format!("### [{}] {}\n\n", severity, finding.kind));

                if let Some(description) = &finding.description {
                    md.push_str(&format!("- **Description**: {}\n", description));
                }
                if let Some(header) = &finding.header {
                    md.push_str(&format!("- **Header**: `{}`\n", header));
                }
                if let Some(parameter) = &finding.parameter {
                    md.push_str(&format!("- **Parameter**: `{}`\n", parameter));
                }
                if let Some(payload) = &finding.payload {
                    md.push_str(&format!("- **Payload**: `{}`\n", code_span(payload)));
                }
                if let Some(location) = &finding.location {
                    md.push_str(&format!("- **Location**: {}\n", location));
                }
                if let Some(error) = &finding.error {
                    md.push_str(&format!("- **Error**: {}\n", error));
                }

                md.push_str(&format!(
                    "- **Affected URLs** ({}):\n",
                    unique.affected_urls_count
                ));
                for url in unique.affected_urls.iter().take(MAX_AFFECTED_URLS_SHOWN) {
                    md.push_str(&format!("  - {}\n", url));
                }
                if unique.affected_urls_count > MAX_AFFECTED_URLS_SHOWN {
                    md.push_str(&format!(
                        "  - ... and {} more\n",
                        unique.affected_urls_count - MAX_AFFECTED_URLS_SHOWN
                    ));
                }
                md.push('\n');
            }
        }
    }

    // Discovered URLs
    if !report.discovered_urls.is_empty() {
        md.push_str("## Discovered URLs\n\n");
        for url in report.discovered_urls.iter().take(MAX_DISCOVERED_URLS_SHOWN) {
            md.push_str(&format!("- {}\n", url));
        }
        if report.discovered_urls.len() > MAX_DISCOVERED_URLS_SHOWN {
            md.push_str(&format!(
                "\n... and {} more\n",
                report.discovered_urls.len() - MAX_DISCOVERED_URLS_SHOWN
            ));
        }
        md.push('\n');
    }

    md
}

/// Keeps a payload from breaking out of its inline code span
fn code_span(text: &str) -> String {
    text.replace('`', "'")
}
