//! Critic-Scrape main entry point
//!
//! This is the command-line interface for the Critic-Scrape catalog scraper.

use anyhow::Context;
use clap::{Parser, Subcommand};
use critic_scrape::config::{load_or_default, Config};
use critic_scrape::crawler::{collect_details, collect_links, load_detail_targets};
use critic_scrape::logging::init_logging;
use critic_scrape::output::{print_record_summary, summarize_records};
use critic_scrape::storage::read_mapping;
use critic_scrape::url::listing_page_url;
use critic_scrape::Record;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Critic-Scrape: a patient catalog scraper
///
/// Collects item links from paginated listing pages, then visits every item
/// page and records its title, platforms, release date, genres and scores.
/// Requests are strictly sequential with randomized pauses, and throttled
/// requests back off before retrying.
#[derive(Parser, Debug)]
#[command(name = "critic-scrape")]
#[command(version = "1.0.0")]
#[command(about = "A patient catalog scraper", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (defaults apply when omitted)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect item links from the listing pages
    Links,

    /// Collect item details for every collected link
    Details {
        /// Seed from an existing output and checkpoint and skip what they cover
        #[arg(long)]
        resume: bool,
    },

    /// Summarize an item details output file and exit
    Stats {
        /// Details output file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Validate configuration and show what would run
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_or_default(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Invalid default configuration".to_string(),
    })?;

    let _log_guard = init_logging(&config.logging, cli.verbose, cli.quiet)
        .context("Failed to initialize logging")?;

    match cli.command {
        Command::Links => handle_links(&config).await,
        Command::Details { resume } => handle_details(&config, resume).await,
        Command::Stats { file } => handle_stats(&file),
        Command::Check => handle_check(&config),
    }
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn interrupted() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::warn!("Interrupt received, stopping after the current target"),
        Err(e) => {
            tracing::warn!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

/// Handles the `links` subcommand
async fn handle_links(config: &Config) -> anyhow::Result<()> {
    tracing::info!(
        "Collecting links from {} listing pages of {}",
        config.listing.page_count,
        config.site.base_url
    );

    let collection = collect_links(config, interrupted())
        .await
        .context("Listing phase failed")?;

    tracing::info!(
        "Collected {} links into {}",
        collection.accumulator.len(),
        config.listing.output_path.display()
    );
    Ok(())
}

/// Handles the `details` subcommand
async fn handle_details(config: &Config, resume: bool) -> anyhow::Result<()> {
    if resume {
        tracing::info!("Resuming detail collection");
    }

    let collection = collect_details(config, resume, interrupted())
        .await
        .context("Detail phase failed")?;

    tracing::info!(
        "Collected {} item records into {}",
        collection.accumulator.len(),
        config.details.output_path.display()
    );
    Ok(())
}

/// Handles the `stats` subcommand: field coverage of a details output file
fn handle_stats(file: &Path) -> anyhow::Result<()> {
    let records: BTreeMap<String, Record> =
        read_mapping(file).with_context(|| format!("Failed to read {}", file.display()))?;

    println!("File: {}\n", file.display());
    print_record_summary(&summarize_records(&records));
    Ok(())
}

/// Handles the `check` subcommand: shows the effective configuration
fn handle_check(config: &Config) -> anyhow::Result<()> {
    println!("=== Critic-Scrape Check ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Listing path: {}", config.site.listing_path);
    println!("  User agent: {}", config.site.user_agent);

    println!("\nFetching:");
    println!("  Max attempts: {}", config.fetch.max_retries);
    println!("  Rate-limit backoff: {}s x attempt", config.fetch.base_backoff);
    println!("  Retry delay: {}s", config.fetch.retry_delay);
    println!(
        "  Timeouts: {}s request, {}s connect",
        config.fetch.timeout, config.fetch.connect_timeout
    );

    let first = listing_page_url(&config.site, 1).context("Cannot build listing URL")?;
    println!("\nListing phase:");
    println!("  Pages: {} (first: {})", config.listing.page_count, first);
    println!(
        "  Pacing: {}-{}s",
        config.listing.min_delay, config.listing.max_delay
    );
    println!(
        "  Checkpoint every {} pages to {}",
        config.listing.checkpoint_interval,
        config.listing.checkpoint_path.display()
    );
    println!("  Output: {}", config.listing.output_path.display());

    println!("\nDetail phase:");
    println!("  Input: {}", config.details.input_path.display());
    match load_detail_targets(&config.details.input_path) {
        Ok(targets) => println!("  Targets: {}", targets.len()),
        Err(e) => println!("  Targets: unavailable ({})", e),
    }
    println!(
        "  Pacing: {}-{}s",
        config.details.min_delay, config.details.max_delay
    );
    println!(
        "  Checkpoint every {} items to {}",
        config.details.checkpoint_interval,
        config.details.checkpoint_path.display()
    );
    println!("  Output: {}", config.details.output_path.display());

    println!("\n✓ Configuration is valid");
    Ok(())
}
