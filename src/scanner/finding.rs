use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// All severities, most serious first
    pub const ALL: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A single probe result
///
/// Only `kind`, `url` and `severity` are always present; each probe fills
/// in the optional fields that apply to it. Serialized with `type` as the
/// key for `kind`, and absent fields are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(rename = "type")]
    pub kind: String,

    pub url: String,

    pub severity: Severity,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Finding {
    /// Creates a finding with only the required fields set
    pub fn new(kind: impl Into<String>, url: impl Into<String>, severity: Severity) -> Self {
        Self {
            kind: kind.into(),
            url: url.into(),
            severity,
            header: None,
            description: None,
            payload: None,
            parameter: None,
            location: None,
            evidence: None,
            status_code: None,
            error: None,
        }
    }

    /// A Low-severity finding recording that a URL could not be probed
    pub fn scan_error(url: impl Into<String>, error: impl fmt::Display) -> Self {
        Self::new("Scan Error", url, Severity::Low).with_error(error.to_string())
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = Some(parameter.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence = Some(evidence.into());
        self
    }

    pub fn with_status_code(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Grouping key for deduplication across URLs
    ///
    /// Two findings share a signature when their type and description match
    /// case-insensitively; the URL is not part of it.
    pub fn signature(&self) -> String {
        format!(
            "{}|{}",
            self.kind,
            self.description.as_deref().unwrap_or_default()
        )
        .trim()
        .to_lowercase()
    }
}
