//! Ripple-Scan main entry point
//!
//! This is the command-line interface for the Ripple-Scan site crawler and
//! vulnerability scanner.

use anyhow::Context;
use clap::Parser;
use ripple_scan::config::{load_config, validate, Config};
use ripple_scan::crawler::crawl;
use ripple_scan::output::{generate_markdown_report, print_summary, write_json_report, ScanReport};
use ripple_scan::scanner::{scan_urls, Probe, ProbeContext};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Ripple-Scan: a bounded site crawler with lightweight vulnerability probes
///
/// Ripple-Scan discovers the pages of one site with a budgeted, depth-limited
/// breadth-first crawl, then probes every discovered URL for missing security
/// headers, injection and SSRF.
#[derive(Parser, Debug)]
#[command(name = "ripple-scan")]
#[command(version = "1.0.0")]
#[command(about = "A bounded site crawler and vulnerability scanner", long_about = None)]
struct Cli {
    /// Start URL (https:// is assumed when no scheme is given)
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of URLs to discover
    #[arg(long)]
    max_links: Option<usize>,

    /// Maximum concurrent fetches during the crawl
    #[arg(long)]
    max_threads: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<f64>,

    /// Deepest breadth-first level to explore (0 = seeds only)
    #[arg(long)]
    max_depth: Option<u32>,

    /// Only crawl and print the discovered URLs
    #[arg(long)]
    crawl_only: bool,

    /// Show the effective configuration without crawling
    #[arg(long, conflicts_with = "crawl_only")]
    dry_run: bool,

    /// Write the JSON report to this path
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,

    /// Write the markdown report to this path
    #[arg(long, value_name = "FILE")]
    markdown: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    apply_overrides(&mut config, &cli);
    validate(&config).context("invalid configuration")?;

    let target = with_default_scheme(&cli.url);

    if cli.dry_run {
        handle_dry_run(&config, &target);
        return Ok(());
    }

    let discovered = crawl(&target, &config.crawler).await;
    tracing::info!("Discovered {} URLs", discovered.len());

    if cli.crawl_only {
        for url in &discovered {
            println!("{}", url);
        }
        return Ok(());
    }

    handle_scan(&config, &target, discovered).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ripple_scan=info,warn"),
            1 => EnvFilter::new("ripple_scan=debug,info"),
            2 => EnvFilter::new("ripple_scan=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies command-line values on top of the file configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(max_links) = cli.max_links {
        config.crawler.max_links = max_links;
    }
    if let Some(max_threads) = cli.max_threads {
        config.crawler.max_threads = max_threads;
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.timeout = timeout;
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if let Some(json) = &cli.json {
        config.output.json_path = Some(json.display().to_string());
    }
    if let Some(markdown) = &cli.markdown {
        config.output.markdown_path = Some(markdown.display().to_string());
    }
}

fn with_default_scheme(url: &str) -> String {
    let url = url.trim();
    if url.contains("://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Handles the --dry-run mode: shows what would be crawled and probed
fn handle_dry_run(config: &Config, target: &str) {
    println!("=== Ripple-Scan Dry Run ===\n");

    println!("Target: {}\n", target);

    println!("Crawler Configuration:");
    println!("  Max links: {}", config.crawler.max_links);
    println!("  Max threads: {}", config.crawler.max_threads);
    println!("  Timeout: {}s", config.crawler.timeout);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  User agent: {}", config.crawler.user_agent);

    println!("\nProbes:");
    let probes = Probe::enabled(config);
    if probes.is_empty() {
        println!("  (none)");
    }
    for probe in &probes {
        println!("  - {}", probe);
    }
    println!("  URLs in parallel: {}", config.scan.max_concurrent_urls);
    println!("  Requests per probe: {}", config.scan.probe_concurrency);
    println!("  Probe timeout: {}s", config.scan.probe_timeout);

    println!("\nOutput:");
    println!(
        "  JSON: {}",
        config.output.json_path.as_deref().unwrap_or("(none)")
    );
    println!(
        "  Markdown: {}",
        config.output.markdown_path.as_deref().unwrap_or("(none)")
    );

    println!("\n✓ Configuration is valid");
}

/// Handles the probe phase and report output
async fn handle_scan(config: &Config, target: &str, discovered: Vec<String>) -> anyhow::Result<()> {
    let probes = Probe::enabled(config);
    let ctx = ProbeContext::from_config(config).context("failed to build probe HTTP client")?;

    let findings = scan_urls(&ctx, &discovered, &probes, config.scan.max_concurrent_urls).await;
    let report = ScanReport::new(target, discovered, findings);

    print_summary(&report);

    if let Some(path) = &config.output.json_path {
        write_json_report(&report, Path::new(path))
            .with_context(|| format!("failed to write JSON report to {}", path))?;
        println!("✓ JSON report written to: {}", path);
    }

    if let Some(path) = &config.output.markdown_path {
        generate_markdown_report(&report, Path::new(path))
            .with_context(|| format!("failed to write markdown report to {}", path))?;
        println!("✓ Markdown report written to: {}", path);
    }

    Ok(())
}
