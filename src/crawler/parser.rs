//! HTML and script link extraction
//!
//! This module turns a fetched page into the set of in-scope URLs it points to:
//! - Links from `<a href>` and `<area href>` tags
//! - Form targets from `<form action>`
//! - URL literals embedded in inline script (`href: "..."`, `location.href = "..."`)
//!
//! Every candidate is resolved against the page's final URL, normalized, and
//! passed through the eligibility filter. Extraction is pure: no I/O.

use crate::url::{is_eligible, normalize_url};
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use std::sync::LazyLock;
use url::Url;

/// Maximum anchor/area links taken from one page
const MAX_ANCHOR_LINKS: usize = 30;

/// Maximum form actions taken from one page
const MAX_FORM_ACTIONS: usize = 5;

/// Maximum matches taken per script pattern on one page
const MAX_SCRIPT_MATCHES: usize = 10;

/// Href prefixes that never lead to a fetchable page
const PSEUDO_PROTOCOLS: &[&str] = &["#", "javascript:", "mailto:", "tel:"];

/// Prefixes a script literal must start with to be considered a URL
const SCRIPT_URL_PREFIXES: &[&str] = &["/", "http://", "https://"];

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href], area[href]").expect("hardcoded selector is valid"));

static FORM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("form[action]").expect("hardcoded selector is valid"));

static SCRIPT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"(?i)href\s*:\s*["']([^"']+)["']"#,
        r#"(?i)location\.href\s*=\s*["']([^"']+)["']"#,
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("hardcoded regex pattern is valid"))
    .collect()
});

/// Extracts every eligible link from a fetched HTML page
///
/// # Arguments
///
/// * `html` - The raw page text
/// * `final_url` - The page's canonical post-redirect URL, used both as the
///   base for relative links and as the eligibility reference
///
/// # Returns
///
/// The set of canonical, in-scope URLs reachable from the page
///
/// # Example
///
/// ```
/// use ripple_scan::crawler::extract_links;
///
/// let html = r#"<a href="/team/">Team</a><a href="https://other.org/">Elsewhere</a>"#;
/// let links = extract_links(html, "https://example.com/about");
/// assert!(links.contains("https://example.com/team"));
/// assert_eq!(links.len(), 1);
/// ```
pub fn extract_links(html: &str, final_url: &str) -> BTreeSet<String> {
    let Ok(base_url) = Url::parse(final_url) else {
        tracing::debug!("Cannot extract links: unparseable page URL {}", final_url);
        return BTreeSet::new();
    };

    let document = Html::parse_document(html);

    let mut links = extract_markup_links(&document, &base_url);
    links.extend(extract_script_links(html, &base_url));

    tracing::trace!("Extracted {} links from {}", links.len(), final_url);
    links
}

/// Extracts anchor, area and form links from a parsed document
pub fn extract_markup_links(document: &Html, base_url: &Url) -> BTreeSet<String> {
    let mut links = BTreeSet::new();

    for element in document.select(&ANCHOR_SELECTOR).take(MAX_ANCHOR_LINKS) {
        if let Some(href) = element.value().attr("href") {
            if let Some(url) = resolve_link(href, base_url, PSEUDO_PROTOCOLS) {
                links.insert(url);
            }
        }
    }

    for element in document.select(&FORM_SELECTOR).take(MAX_FORM_ACTIONS) {
        if let Some(action) = element.value().attr("action") {
            if let Some(url) = resolve_link(action, base_url, &["#"]) {
                links.insert(url);
            }
        }
    }

    links
}

/// Extracts URL literals from script-like assignments in raw page text
pub fn extract_script_links(text: &str, base_url: &Url) -> BTreeSet<String> {
    let mut links = BTreeSet::new();

    for pattern in SCRIPT_PATTERNS.iter() {
        let candidates = pattern
            .captures_iter(text)
            .filter_map(|cap| cap.get(1))
            .take(MAX_SCRIPT_MATCHES);

        for candidate in candidates {
            let value = candidate.as_str();
            if !SCRIPT_URL_PREFIXES
                .iter()
                .any(|prefix| value.starts_with(prefix))
            {
                continue;
            }
            if let Some(url) = resolve_link(value, base_url, &[]) {
                links.insert(url);
            }
        }
    }

    links
}

/// Resolves a raw link value to a canonical, eligible absolute URL
///
/// Returns None if the link should be excluded:
/// - empty after trimming
/// - starts with one of `skip_prefixes`
/// - cannot be resolved against the base URL
/// - is out of scope for the base URL
fn resolve_link(raw: &str, base_url: &Url, skip_prefixes: &[&str]) -> Option<String> {
    let raw = raw.trim();

    if raw.is_empty() {
        return None;
    }

    let lowered = raw.to_ascii_lowercase();
    if skip_prefixes
        .iter()
        .any(|prefix| lowered.starts_with(prefix))
    {
        return None;
    }

    let absolute = base_url.join(raw).ok()?;
    let normalized = normalize_url(absolute.as_str());

    if is_eligible(&normalized, base_url.as_str()) {
        Some(normalized)
    } else {
        None
    }
}
