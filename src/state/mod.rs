//! State module for tracking collection progress
//!
//! # Components
//!
//! - `Target` / `TargetSet`: what a run fetches, deduplicated by URL
//! - `Record` / `FieldValue`: what the detail extractor produces
//! - `Accumulator`: natural key -> entry mapping that grows over a run
//! - `TargetState`: where a single target is in its fetch/extract/merge cycle

mod accumulator;
mod record;
mod target;
mod target_state;

// Re-export main types
pub use accumulator::{Accumulator, Merge, MergePolicy};
pub use record::{
    Entry, FieldValue, Record, MERGED_SOURCES_FIELD, SOURCE_FIELD, UNKNOWN_RELEASE_DATE,
    UNKNOWN_SCORE, UNKNOWN_TITLE,
};
pub use target::{Target, TargetSet};
pub use target_state::TargetState;
