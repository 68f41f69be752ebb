//! Storage error types

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading or writing mapping files
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Serialization error for {path}: {source}")]
    Serialization {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl StorageError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// True when the underlying cause is a missing file
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
