//! Collection loop
//!
//! Drives one phase: for each target in input order, fetch it, extract
//! entries, merge them into the accumulator, checkpoint every N processed
//! targets and pace before the next request. Per-target failures never
//! leave this loop; only a failed final write does.

use crate::config::{DetailConfig, ListingConfig};
use crate::crawler::fetcher::{Fetch, FetchResult};
use crate::crawler::pacer::Pacer;
use crate::extract::Extractor;
use crate::output::RunStats;
use crate::state::{Accumulator, Merge, Target, TargetSet, TargetState};
use crate::storage::write_mapping_atomic;
use crate::ScrapeError;
use std::future::Future;
use std::path::PathBuf;

/// Where and how often a phase persists its accumulator
#[derive(Debug, Clone)]
pub struct CollectSettings {
    /// Name used in log lines
    pub phase: &'static str,
    pub checkpoint_interval: usize,
    pub output_path: PathBuf,
    pub checkpoint_path: PathBuf,
}

impl From<&ListingConfig> for CollectSettings {
    fn from(config: &ListingConfig) -> Self {
        Self {
            phase: "Listing",
            checkpoint_interval: config.checkpoint_interval,
            output_path: config.output_path.clone(),
            checkpoint_path: config.checkpoint_path.clone(),
        }
    }
}

impl From<&DetailConfig> for CollectSettings {
    fn from(config: &DetailConfig) -> Self {
        Self {
            phase: "Details",
            checkpoint_interval: config.checkpoint_interval,
            output_path: config.output_path.clone(),
            checkpoint_path: config.checkpoint_path.clone(),
        }
    }
}

/// What a finished run hands back
#[derive(Debug)]
pub struct Collection<T> {
    pub accumulator: Accumulator<T>,
    pub stats: RunStats,
}

/// Sequential fetch/extract/merge driver
pub struct Collector<F, E> {
    fetcher: F,
    extractor: E,
    pacer: Pacer,
    settings: CollectSettings,
}

impl<F: Fetch, E: Extractor> Collector<F, E> {
    pub fn new(fetcher: F, extractor: E, pacer: Pacer, settings: CollectSettings) -> Self {
        Self {
            fetcher,
            extractor,
            pacer,
            settings,
        }
    }

    /// Processes every target and writes the final output
    pub async fn run(
        &self,
        targets: &TargetSet,
        resume: Option<Accumulator<E::Item>>,
    ) -> Result<Collection<E::Item>, ScrapeError> {
        self.run_until(targets, resume, std::future::pending()).await
    }

    /// Like [`Collector::run`], but stops early once `shutdown` resolves
    ///
    /// Whatever was gathered before the stop is still written to the final
    /// output location.
    pub async fn run_until<S>(
        &self,
        targets: &TargetSet,
        resume: Option<Accumulator<E::Item>>,
        shutdown: S,
    ) -> Result<Collection<E::Item>, ScrapeError>
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let phase = self.settings.phase;
        let total = targets.len();
        let mut accumulator = resume.unwrap_or_default();
        let mut stats = RunStats::new();

        tracing::info!(
            "{}: {} targets, {} entries already collected",
            phase,
            total,
            accumulator.len()
        );

        for (index, target) in targets.iter().enumerate() {
            if accumulator.contains_target(target) {
                tracing::debug!("Already collected {}, skipping", target);
                stats.record(TargetState::AlreadyCollected);
                continue;
            }

            let outcome = tokio::select! {
                biased;
                _ = &mut shutdown => None,
                state = self.process(target, &mut accumulator, &mut stats) => Some(state),
            };
            let Some(state) = outcome else {
                stats.interrupted = true;
                break;
            };

            stats.processed += 1;
            stats.record(state);
            tracing::info!(
                "{}: {}/{} {} ({}), {} entries",
                phase,
                index + 1,
                total,
                target,
                state,
                accumulator.len()
            );

            if stats.processed % self.settings.checkpoint_interval.max(1) == 0 {
                self.checkpoint(&accumulator, &mut stats);
            }

            let more_to_fetch = targets
                .iter()
                .skip(index + 1)
                .any(|next| !accumulator.contains_target(next));
            if more_to_fetch {
                let paced = tokio::select! {
                    biased;
                    _ = &mut shutdown => false,
                    _ = self.pacer.wait() => true,
                };
                if !paced {
                    stats.interrupted = true;
                    break;
                }
            }
        }

        if stats.interrupted {
            tracing::warn!("{}: interrupted, writing what was collected so far", phase);
        }

        stats.finish();
        let output = &self.settings.output_path;
        write_mapping_atomic(output, accumulator.entries()).map_err(|source| {
            ScrapeError::FinalOutput {
                path: output.display().to_string(),
                source,
            }
        })?;
        tracing::info!(
            "{}: wrote {} entries to {}",
            phase,
            accumulator.len(),
            output.display()
        );
        stats.log_summary(phase, accumulator.len());

        Ok(Collection { accumulator, stats })
    }

    /// Fetches, extracts and merges one target, returning its terminal state
    async fn process(
        &self,
        target: &Target,
        accumulator: &mut Accumulator<E::Item>,
        stats: &mut RunStats,
    ) -> TargetState {
        let result = self.fetcher.fetch(target).await;
        stats.rate_limited += result.rate_limited();

        let body = match result {
            FetchResult::Success { body, .. } => body,
            FetchResult::GaveUp { last_failure, .. } => {
                tracing::warn!("Skipping {}: {}", target, last_failure);
                return TargetState::Skipped;
            }
        };

        let entries = self.extractor.extract(target, &body);
        if entries.is_empty() {
            tracing::warn!("No entries extracted from {}", target);
        }

        let policy = self.extractor.merge_policy();
        for (key, entry) in entries {
            match accumulator.insert(key.clone(), entry, policy) {
                Merge::Inserted => {}
                Merge::Replaced => {
                    stats.duplicate_keys += 1;
                    tracing::warn!("Duplicate key '{}' from {}, replacing earlier entry", key, target);
                }
                Merge::Kept => {
                    stats.duplicate_keys += 1;
                    tracing::debug!("Duplicate key '{}' from {}, keeping first entry", key, target);
                }
            }
        }
        accumulator.mark_collected(target);

        TargetState::Merged
    }

    /// Writes a checkpoint; a failure is logged and counted, never raised
    fn checkpoint(&self, accumulator: &Accumulator<E::Item>, stats: &mut RunStats) {
        let path = &self.settings.checkpoint_path;
        match write_mapping_atomic(path, accumulator.entries()) {
            Ok(()) => {
                stats.checkpoints_written += 1;
                tracing::info!(
                    "Checkpoint: {} entries written to {}",
                    accumulator.len(),
                    path.display()
                );
            }
            Err(e) => {
                stats.checkpoint_failures += 1;
                tracing::error!("Checkpoint write failed: {}", e);
            }
        }
    }
}
