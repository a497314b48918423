use crate::config::types::{Config, CrawlerConfig, HttpConfig, OutputConfig, ScanConfig};
use crate::ConfigError;

/// Upper bound for any timeout, in seconds
const MAX_TIMEOUT_SECS: f64 = 3600.0;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_scan_config(&config.scan)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
pub fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed

    if config.max_links < 1 {
        return Err(ConfigError::Validation(format!(
            "max_links must be >= 1, got {}",
            config.max_links
        )));
    }

    if config.max_threads < 1 || config.max_threads > 100 {
        return Err(ConfigError::Validation(format!(
            "max_threads must be between 1 and 100, got {}",
            config.max_threads
        )));
    }

    validate_seconds("timeout", config.timeout)?;

    Ok(())
}

/// Validates HTTP identification configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates probe configuration
fn validate_scan_config(config: &ScanConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_urls < 1 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_urls must be >= 1, got {}",
            config.max_concurrent_urls
        )));
    }

    if config.probe_concurrency < 1 {
        return Err(ConfigError::Validation(format!(
            "probe_concurrency must be >= 1, got {}",
            config.probe_concurrency
        )));
    }

    validate_seconds("probe_timeout", config.probe_timeout)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (name, path) in [
        ("json_path", &config.json_path),
        ("markdown_path", &config.markdown_path),
    ] {
        if matches!(path, Some(p) if p.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "{} cannot be empty when set",
                name
            )));
        }
    }

    Ok(())
}

/// Checks that a duration given in seconds is positive and at most `MAX_TIMEOUT_SECS`
fn validate_seconds(name: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "{} must be a positive number of seconds, got {}",
            name, value
        )));
    }

    if value > MAX_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "{} must be at most {} seconds, got {}",
            name, MAX_TIMEOUT_SECS, value
        )));
    }

    Ok(())
}
