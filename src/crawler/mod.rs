//! Crawler module for fetching and collecting pages
//!
//! This module contains the core collection logic, including:
//! - HTTP fetching with rate-limit backoff and bounded retries
//! - Randomized pacing between consecutive requests
//! - The sequential collect loop with periodic checkpoints
//! - Entry points for the listing and detail phases

mod collector;
mod delay;
mod fetcher;
mod pacer;

pub use collector::{CollectSettings, Collection, Collector};
pub use delay::{Sleeper, TokioSleeper};
pub use fetcher::{build_http_client, FailureKind, Fetch, FetchResult, Fetcher, RetryPolicy};
pub use pacer::Pacer;

use crate::config::Config;
use crate::extract::{DetailExtractor, ListingExtractor};
use crate::state::{Record, TargetSet};
use crate::storage::{load_resume, read_object};
use crate::url::listing_targets;
use crate::{ConfigError, ScrapeError};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use url::Url;

/// Runs the listing phase
///
/// Walks listing pages `1..=page_count` and writes the URL -> label mapping
/// to the listing output path. Stops early when `shutdown` resolves, still
/// writing what was collected.
pub async fn collect_links<S>(config: &Config, shutdown: S) -> Result<Collection<String>, ScrapeError>
where
    S: Future<Output = ()>,
{
    let base_url = Url::parse(&config.site.base_url)?;
    let targets = listing_targets(&config.site, config.listing.page_count)?;

    let fetcher = Fetcher::from_config(&config.site, &config.fetch)?;
    let pacer = Pacer::from_secs(
        config.listing.min_delay,
        config.listing.max_delay,
        Arc::new(TokioSleeper),
    );

    Collector::new(
        fetcher,
        ListingExtractor::new(base_url),
        pacer,
        CollectSettings::from(&config.listing),
    )
    .run_until(&targets, None, shutdown)
    .await
}

/// Runs the detail phase
///
/// Reads the listing output, fetches every item page in file order and
/// writes the title -> record mapping. With `resume`, an existing output
/// and checkpoint seed the accumulator and their targets are not refetched.
///
/// A missing input file is a configuration error raised before any fetch.
pub async fn collect_details<S>(
    config: &Config,
    resume: bool,
    shutdown: S,
) -> Result<Collection<Record>, ScrapeError>
where
    S: Future<Output = ()>,
{
    let targets = load_detail_targets(&config.details.input_path)?;

    let seed = if resume {
        Some(load_resume::<Record>(
            &config.details.output_path,
            &config.details.checkpoint_path,
        )?)
    } else {
        None
    };

    let fetcher = Fetcher::from_config(&config.site, &config.fetch)?;
    let pacer = Pacer::from_secs(
        config.details.min_delay,
        config.details.max_delay,
        Arc::new(TokioSleeper),
    );

    Collector::new(
        fetcher,
        DetailExtractor,
        pacer,
        CollectSettings::from(&config.details),
    )
    .run_until(&targets, seed, shutdown)
    .await
}

/// Loads the detail-phase targets from a listing output file
///
/// Keys are the target URLs, values their labels; key order is kept.
pub fn load_detail_targets(path: &Path) -> Result<TargetSet, ScrapeError> {
    if !path.exists() {
        return Err(ConfigError::MissingInput(path.display().to_string()).into());
    }

    let mapping = read_object(path)?;
    let targets = TargetSet::from_mapping(&mapping);
    tracing::info!("Loaded {} detail targets from {}", targets.len(), path.display());
    Ok(targets)
}
