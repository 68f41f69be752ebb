//! Output module for run statistics and summaries
//!
//! This module handles:
//! - Tallying what happened during a run
//! - Summarizing field coverage of a finished detail output file

pub mod stats;

pub use stats::{print_record_summary, summarize_records, RecordSummary, RunStats};
