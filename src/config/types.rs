use serde::Deserialize;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

/// Main configuration structure for Ripple-Scan
///
/// Every section is optional; a missing section takes its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub http: HttpConfig,
    pub scan: ScanConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Hard cap on the number of discovered URLs
    #[serde(rename = "max-links")]
    pub max_links: usize,

    /// Maximum number of concurrent page fetches
    #[serde(rename = "max-threads")]
    pub max_threads: usize,

    /// Per-request read timeout in seconds
    pub timeout: f64,

    /// Deepest breadth-first level explored (0 = seeds only)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// User agent sent with every crawl request
    #[serde(skip)]
    pub user_agent: String,
}

impl CrawlerConfig {
    /// Creates a crawler configuration with the default user agent
    pub fn new(max_links: usize, max_threads: usize, timeout: f64, max_depth: u32) -> Self {
        Self {
            max_links,
            max_threads,
            timeout,
            max_depth,
            ..Self::default()
        }
    }

    /// Per-request read timeout
    ///
    /// Negative or non-finite values fall back to the default of 8 seconds.
    pub fn read_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout).unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Connect timeout: a quarter of the read timeout, never below 500ms
    ///
    /// Connection failures should fail fast while slow servers get the
    /// full read timeout.
    pub fn connect_timeout(&self) -> Duration {
        (self.read_timeout() / 4).max(Duration::from_millis(500))
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_links: 50,
            max_threads: 15,
            timeout: DEFAULT_TIMEOUT.as_secs_f64(),
            max_depth: 2,
            user_agent: HttpConfig::default().user_agent,
        }
    }
}

/// HTTP identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User agent sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
        }
    }
}

/// Vulnerability probe configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Run the security header probe
    pub headers: bool,

    /// Run the SQL injection / reflected XSS probe
    pub injection: bool,

    /// Run the SSRF probe
    pub ssrf: bool,

    /// Number of URLs probed concurrently
    #[serde(rename = "max-concurrent-urls")]
    pub max_concurrent_urls: usize,

    /// Number of payload requests in flight per probe
    #[serde(rename = "probe-concurrency")]
    pub probe_concurrency: usize,

    /// Per-request probe timeout in seconds
    #[serde(rename = "probe-timeout")]
    pub probe_timeout: f64,
}

impl ScanConfig {
    /// Per-request probe timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.probe_timeout).unwrap_or(Duration::from_secs(10))
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            headers: true,
            injection: true,
            ssrf: true,
            max_concurrent_urls: 10,
            probe_concurrency: 20,
            probe_timeout: 10.0,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path for the JSON scan report
    #[serde(rename = "json-path")]
    pub json_path: Option<String>,

    /// Path for the markdown scan report
    #[serde(rename = "markdown-path")]
    pub markdown_path: Option<String>,
}
