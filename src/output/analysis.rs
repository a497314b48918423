//! Vulnerability deduplication and severity statistics
//!
//! Findings from different URLs that describe the same problem (same type and
//! description) are grouped into one unique vulnerability that lists every
//! affected URL.

use crate::scanner::{Finding, Severity};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A deduplicated vulnerability with the URLs it was seen on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueFinding {
    /// The first finding seen with this signature
    #[serde(flatten)]
    pub finding: Finding,

    /// Every URL reporting this signature, sorted
    pub affected_urls: Vec<String>,

    pub affected_urls_count: usize,
}

/// Aggregate view over all findings of a scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnerabilityAnalysis {
    pub total_count: usize,
    pub unique_count: usize,
    pub unique_results: Vec<UniqueFinding>,
    pub total_severity_counts: BTreeMap<Severity, usize>,
    pub unique_severity_counts: BTreeMap<Severity, usize>,
    pub affected_urls_per_vuln: BTreeMap<String, Vec<String>>,
}

impl VulnerabilityAnalysis {
    /// Unique vulnerabilities of one severity
    pub fn unique_with_severity(&self, severity: Severity) -> impl Iterator<Item = &UniqueFinding> {
        self.unique_results
            .iter()
            .filter(move |u| u.finding.severity == severity)
    }
}

/// Groups findings by signature and counts severities
///
/// Unique results keep the order in which each signature was first seen.
pub fn analyze_vulnerabilities(findings: &[Finding]) -> VulnerabilityAnalysis {
    let mut first_seen: Vec<(String, &Finding)> = Vec::new();
    let mut affected: HashMap<String, BTreeSet<&str>> = HashMap::new();

    for finding in findings {
        let signature = finding.signature();
        let urls = affected.entry(signature.clone()).or_insert_with(|| {
            first_seen.push((signature, finding));
            BTreeSet::new()
        });
        urls.insert(finding.url.as_str());
    }

    let mut affected_urls_per_vuln = BTreeMap::new();
    let unique_results: Vec<UniqueFinding> = first_seen
        .into_iter()
        .map(|(signature, finding)| {
            let affected_urls: Vec<String> = affected
                .get(&signature)
                .map(|urls| urls.iter().map(|u| u.to_string()).collect())
                .unwrap_or_default();
            affected_urls_per_vuln.insert(signature, affected_urls.clone());

            UniqueFinding {
                finding: finding.clone(),
                affected_urls_count: affected_urls.len(),
                affected_urls,
            }
        })
        .collect();

    VulnerabilityAnalysis {
        total_count: findings.len(),
        unique_count: unique_results.len(),
        total_severity_counts: count_severities(findings.iter()),
        unique_severity_counts: count_severities(unique_results.iter().map(|u| &u.finding)),
        unique_results,
        affected_urls_per_vuln,
    }
}

fn count_severities<'a>(findings: impl Iterator<Item = &'a Finding>) -> BTreeMap<Severity, usize> {
    let mut counts = BTreeMap::new();
    for finding in findings {
        *counts.entry(finding.severity).or_insert(0) += 1;
    }
    counts
}
