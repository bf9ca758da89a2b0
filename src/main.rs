//! BBS-Harvest main entry point
//!
//! This is the command-line interface for the BBS-Harvest media harvester.

use anyhow::Context;
use bbs_harvest::config::{load_config_with_hash, validate, Config};
use bbs_harvest::crawler::harvest;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// BBS-Harvest: a throttled media harvester
///
/// Crawls paginated boards and a linked archive concurrently and downloads
/// every referenced image into one directory, one download at a time per
/// source.
#[derive(Parser, Debug)]
#[command(name = "bbs-harvest")]
#[command(version)]
#[command(about = "A throttled media harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in sources when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Directory to save downloads into (overrides the config file)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using built-in sources");
            Config::default()
        }
    };

    if let Some(output) = cli.output {
        config.output.directory = output.to_string_lossy().to_string();
        validate(&config).context("invalid output directory")?;
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let summary = harvest(config).await.context("harvest could not start")?;
    tracing::info!(
        "Saved {} files ({} failed downloads, {} crawl errors)",
        summary.downloaded(),
        summary.failed(),
        summary.errors()
    );

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("bbs_harvest=info,warn"),
            1 => EnvFilter::new("bbs_harvest=debug,info"),
            2 => EnvFilter::new("bbs_harvest=trace,debug"),
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

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== BBS-Harvest Dry Run ===\n");

    println!("Queue:");
    println!("  Capacity: {}", config.queue.capacity);
    println!("  Download interval: {}ms", config.queue.download_interval_ms);

    println!("\nUser Agent:");
    println!("  {}", config.http.user_agent);

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);

    println!("\nListing Sources ({}):", config.listings.len());
    for source in &config.listings {
        let state = if source.enabled { "" } else { " [disabled]" };
        println!(
            "  - {}{}: {}{} ({} pages, {})",
            source.name,
            state,
            source.base_url,
            source.board,
            source.max_page,
            source.media_suffixes.join(" ")
        );
    }

    println!("\nArchive:");
    if config.archive.enabled {
        println!("  Seed: {}", config.archive.seed_url);
        println!("  Base: {}", config.archive.base_url);
        println!("  Page interval: {}ms", config.archive.page_interval_ms);
    } else {
        println!("  [disabled]");
    }

    let pages: usize = config
        .listings
        .iter()
        .filter(|s| s.enabled)
        .map(|s| s.max_page)
        .sum();
    println!("\n✓ Configuration is valid");
    println!("✓ Would crawl {} listing pages", pages);
}
