//! Console summary of a scan
//!
//! This module prints a short overview of a scan report to stdout.

use crate::output::report::ScanReport;
use crate::scanner::Severity;

/// Unique vulnerabilities listed in the console summary
const MAX_LISTED: usize = 15;

/// Prints a scan summary to stdout in a formatted manner
///
/// # Arguments
///
/// * `report` - The report to summarize
pub fn print_summary(report: &ScanReport) {
    println!("{}", format_summary(report));
}

/// Builds the text printed by [`print_summary`]
pub fn format_summary(report: &ScanReport) -> String {
    let analysis = &report.vulnerability_analysis;
    let mut out = String::new();

    out.push_str("=== Scan Summary ===\n\n");

    out.push_str("Overview:\n");
    out.push_str(&format!("  Target: {}\n", report.target));
    out.push_str(&format!(
        "  URLs discovered: {}\n",
        report.discovered_urls.len()
    ));
    out.push_str(&format!(
        "  Findings: {} total, {} unique\n\n",
        report.total_vulnerabilities, report.unique_vulnerabilities
    ));

    out.push_str("Findings by Severity:\n");
    for severity in Severity::ALL {
        let total = analysis.total_severity_counts.get(&severity).copied().unwrap_or(0);
        let unique = analysis.unique_severity_counts.get(&severity).copied().unwrap_or(0);
        let percentage = if report.total_vulnerabilities > 0 {
            (total as f64 / report.total_vulnerabilities as f64) * 100.0
        } else {
            0.0
        };
        out.push_str(&format!(
            "  {:<6} {:>4} ({:.1}%), {} unique\n",
            severity, total, percentage, unique
        ));
    }

    if !analysis.unique_results.is_empty() {
        out.push_str("\nTop Vulnerabilities:\n");

        let mut ranked: Vec<_> = analysis.unique_results.iter().collect();
        ranked.sort_by(|a, b| {
            a.finding
                .severity
                .cmp(&b.finding.severity)
                .then(b.affected_urls_count.cmp(&a.affected_urls_count))
        });

        for unique in ranked.iter().take(MAX_LISTED) {
            let subject = unique
                .finding
                .header
                .as_deref()
                .or(unique.finding.parameter.as_deref())
                .map(|s| format!(" ({})", s))
                .unwrap_or_default();
            out.push_str(&format!(
                "  [{}] {}{}: {} URL(s)\n",
                unique.finding.severity, unique.finding.kind, subject, unique.affected_urls_count
            ));
        }
        if ranked.len() > MAX_LISTED {
            out.push_str(&format!("  ... and {} more\n", ranked.len() - MAX_LISTED));
        }
    }

    out
}
