//! Run statistics and output summaries
//!
//! `RunStats` is the process-lifetime tally of one collection run.
//! `RecordSummary` describes a detail output file after the fact.

use crate::state::{Record, TargetState};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Counters for a single run; never persisted
#[derive(Debug, Clone)]
pub struct RunStats {
    /// Targets fetched (successfully or not)
    pub processed: usize,

    /// Targets skipped because they were already collected
    pub skipped: usize,

    /// Targets whose entries were merged
    pub merged: usize,

    /// Targets that failed every attempt
    pub failures: usize,

    /// HTTP 429 responses seen across all attempts
    pub rate_limited: u32,

    /// Entries whose natural key was already present
    pub duplicate_keys: usize,

    /// Checkpoints written successfully
    pub checkpoints_written: usize,

    /// Checkpoint writes that failed
    pub checkpoint_failures: usize,

    /// The run stopped early on a shutdown signal
    pub interrupted: bool,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Default for RunStats {
    fn default() -> Self {
        Self {
            processed: 0,
            skipped: 0,
            merged: 0,
            failures: 0,
            rate_limited: 0,
            duplicate_keys: 0,
            checkpoints_written: 0,
            checkpoint_failures: 0,
            interrupted: false,
            started_at: Utc::now(),
            finished_at: None,
        }
    }
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tallies the terminal state a target ended in
    pub fn record(&mut self, state: TargetState) {
        debug_assert!(state.is_terminal(), "{} is not terminal", state);
        match state {
            TargetState::Merged => self.merged += 1,
            TargetState::Skipped => self.failures += 1,
            TargetState::AlreadyCollected => self.skipped += 1,
            _ => {}
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock duration in seconds, up to now if the run is still going
    pub fn duration_seconds(&self) -> i64 {
        let end = self.finished_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_seconds()
    }

    /// Share of processed targets that were merged, in percent
    pub fn success_rate(&self) -> f64 {
        if self.processed == 0 {
            return 0.0;
        }
        (self.merged as f64 / self.processed as f64) * 100.0
    }

    /// Logs the end-of-run summary
    pub fn log_summary(&self, phase: &str, entries: usize) {
        tracing::info!(
            "{} finished{}: {} entries, {} processed, {} merged, {} failed, {} already collected",
            phase,
            if self.interrupted { " (interrupted)" } else { "" },
            entries,
            self.processed,
            self.merged,
            self.failures,
            self.skipped
        );
        tracing::info!(
            "{}: {} rate-limit responses, {} duplicate keys, {} checkpoints ({} failed), {:.1}% success, {}s",
            phase,
            self.rate_limited,
            self.duplicate_keys,
            self.checkpoints_written,
            self.checkpoint_failures,
            self.success_rate(),
            self.duration_seconds()
        );
    }
}

/// Field coverage of a detail output file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSummary {
    pub entries: usize,

    /// Field -> number of records holding a placeholder
    pub unknown_by_field: BTreeMap<String, usize>,

    /// Field -> number of records with an empty list
    pub empty_by_field: BTreeMap<String, usize>,
}

/// Counts placeholders and empty lists per field
pub fn summarize_records(records: &BTreeMap<String, Record>) -> RecordSummary {
    let mut summary = RecordSummary {
        entries: records.len(),
        ..RecordSummary::default()
    };

    for record in records.values() {
        for (field, value) in record.fields() {
            if value.is_unknown() {
                *summary.unknown_by_field.entry(field.to_string()).or_insert(0) += 1;
            }
            if value.as_list().is_some_and(|items| items.is_empty()) {
                *summary.empty_by_field.entry(field.to_string()).or_insert(0) += 1;
            }
        }
    }

    summary
}

/// Prints a record summary to stdout
pub fn print_record_summary(summary: &RecordSummary) {
    println!("=== Output Summary ===\n");
    println!("Entries: {}", summary.entries);

    if summary.unknown_by_field.is_empty() && summary.empty_by_field.is_empty() {
        println!("\nEvery field was found on every page.");
        return;
    }

    if !summary.unknown_by_field.is_empty() {
        println!("\nMissing values:");
        for (field, count) in &summary.unknown_by_field {
            println!("  {}: {} ({:.1}%)", field, count, percent(*count, summary.entries));
        }
    }

    if !summary.empty_by_field.is_empty() {
        println!("\nEmpty lists:");
        for (field, count) in &summary.empty_by_field {
            println!("  {}: {} ({:.1}%)", field, count, percent(*count, summary.entries));
        }
    }
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (count as f64 / total as f64) * 100.0
    }
}
