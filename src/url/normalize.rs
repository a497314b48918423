use url::Url;

/// Normalizes a URL to its canonical crawl form
///
/// # Normalization Steps
///
/// 1. Parse the URL; if it cannot be parsed, return the input unchanged
/// 2. Lowercase the host
/// 3. Strip trailing slashes from non-root paths (root stays `/`)
/// 4. Remove the fragment
///
/// Scheme, path case and query string are left untouched, so two URLs that
/// differ only in those parts remain distinct crawl units.
///
/// # Examples
///
/// ```
/// use ripple_scan::url::normalize_url;
///
/// assert_eq!(normalize_url("https://EXAMPLE.com/Page/#top"), "https://example.com/Page");
/// assert_eq!(normalize_url("not a url"), "not a url");
/// ```
pub fn normalize_url(url_str: &str) -> String {
    let mut url = match Url::parse(url_str) {
        Ok(url) => url,
        Err(e) => {
            tracing::trace!("Leaving unparseable URL {:?} as-is: {}", url_str, e);
            return url_str.to_string();
        }
    };

    // The url crate already lowercases special-scheme hosts; opaque hosts need it done here
    if let Some(host) = url.host_str() {
        let lowered = host.to_lowercase();
        if lowered != host && url.set_host(Some(&lowered)).is_err() {
            return url_str.to_string();
        }
    }

    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        // "/a//" and "/a/" both become "/a"
        let trimmed = match path.trim_end_matches('/') {
            "" => "/".to_string(),
            rest => rest.to_string(),
        };
        url.set_path(&trimmed);
    }

    url.set_fragment(None);

    url.to_string()
}
