//! URL handling module for Ripple-Scan
//!
//! This module provides the two pure functions every other component relies
//! on: canonical normalization (the crawl's deduplication key) and the static
//! eligibility filter deciding which URLs are in scope.

mod eligibility;
mod normalize;

use url::Url;

// Re-export main functions
pub use eligibility::is_eligible;
pub use normalize::normalize_url;

/// Conventionally guessed informational paths seeded alongside the start URL
pub const COMMON_PATHS: &[&str] = &[
    "/about",
    "/contact",
    "/services",
    "/products",
    "/blog",
    "/news",
    "/help",
    "/careers",
];

/// Builds the normalized conventional-path URLs for a site
///
/// Each path in [`COMMON_PATHS`] is placed directly under the base URL's
/// scheme and authority, regardless of the base URL's own path. Returns an
/// empty list when the base URL cannot be parsed or has no host.
///
/// # Examples
///
/// ```
/// use ripple_scan::url::common_path_urls;
///
/// let urls = common_path_urls("https://example.com/deep/page");
/// assert_eq!(urls[0], "https://example.com/about");
/// ```
pub fn common_path_urls(base_url: &str) -> Vec<String> {
    let Ok(base) = Url::parse(base_url) else {
        return Vec::new();
    };
    if base.host_str().is_none() {
        return Vec::new();
    }

    COMMON_PATHS
        .iter()
        .filter_map(|path| base.join(path).ok())
        .map(|url| normalize_url(url.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_paths_use_base_authority() {
        let urls = common_path_urls("http://127.0.0.1:4000/start/page?x=1");
        assert_eq!(urls.len(), COMMON_PATHS.len());
        assert_eq!(urls[0], "http://127.0.0.1:4000/about");
        assert!(urls.iter().all(|u| u.starts_with("http://127.0.0.1:4000/")));
    }

    #[test]
    fn test_common_paths_are_eligible() {
        let base = "https://example.com/";
        for url in common_path_urls(base) {
            assert!(is_eligible(&url, base), "{} should be eligible", url);
        }
    }

    #[test]
    fn test_common_paths_invalid_base() {
        assert!(common_path_urls("not a url").is_empty());
        assert!(common_path_urls("mailto:a@example.com").is_empty());
    }
}
