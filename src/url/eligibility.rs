use url::Url;

/// Path extensions that are never worth fetching as pages
const EXCLUDED_EXTENSIONS: &[&str] = &[
    ".pdf", ".doc", ".jpg", ".png", ".gif", ".mp4", ".zip", ".css", ".js",
];

/// Path fragments marking administrative or non-content endpoints
const EXCLUDED_PATH_PATTERNS: &[&str] = &["/wp-admin/", "/admin/login", ".xml", ".json"];

/// Checks whether a URL is in scope for fetching relative to a base URL
///
/// A URL is eligible when all of the following hold:
/// - its host (and port) exactly matches the base URL's, case-insensitively;
///   subdomains of the base are *not* in scope
/// - its lower-cased path does not end with an excluded extension
/// - its lower-cased path does not contain an excluded administrative pattern
///
/// This is a static filter; it never touches the network. URLs that cannot
/// be parsed are ineligible.
///
/// # Examples
///
/// ```
/// use ripple_scan::url::is_eligible;
///
/// assert!(is_eligible("https://example.com/about", "https://example.com/"));
/// assert!(!is_eligible("https://blog.example.com/", "https://example.com/"));
/// assert!(!is_eligible("https://example.com/brochure.pdf", "https://example.com/"));
/// ```
pub fn is_eligible(url: &str, base_url: &str) -> bool {
    let (Ok(candidate), Ok(base)) = (Url::parse(url), Url::parse(base_url)) else {
        return false;
    };

    if authority(&candidate) != authority(&base) {
        return false;
    }

    let path = candidate.path().to_lowercase();

    if EXCLUDED_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return false;
    }

    if EXCLUDED_PATH_PATTERNS
        .iter()
        .any(|pattern| path.contains(pattern))
    {
        return false;
    }

    true
}

/// Lower-cased `host[:port]` of a URL, or `None` for host-less URLs
fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}
