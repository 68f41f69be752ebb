//! Storage module for persisting collected data
//!
//! This module handles every file a run reads or writes:
//! - Loading the URL -> label mapping that feeds the detail phase
//! - Atomic writes of checkpoints and final output
//! - Loading earlier output to resume an interrupted run

mod error;
mod json;

pub use error::{StorageError, StorageResult};
pub use json::{load_resume, read_mapping, read_object, write_mapping_atomic};
