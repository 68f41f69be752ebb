//! JSON mapping files
//!
//! Every durable artifact of a run is a single JSON object mapping a key to
//! a value. Writes go to a sibling temp file that is synced and renamed over
//! the destination, so a reader never sees a half-written object.

use crate::state::{Accumulator, Entry};
use crate::storage::error::{StorageError, StorageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Reads a JSON object, keeping its keys in file order
///
/// A key that appears twice keeps its first position and its last value.
pub fn read_object(path: &Path) -> StorageResult<Map<String, Value>> {
    let file = File::open(path).map_err(|e| StorageError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a JSON object into typed entries
pub fn read_mapping<T: DeserializeOwned>(path: &Path) -> StorageResult<BTreeMap<String, T>> {
    let file = File::open(path).map_err(|e| StorageError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `mapping` to `path` through a temp file and an atomic rename
pub fn write_mapping_atomic<T: Serialize>(
    path: &Path,
    mapping: &BTreeMap<String, T>,
) -> StorageResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
    }

    let tmp = temp_path(path);
    if let Err(e) = write_pretty(&tmp, mapping) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        StorageError::io(path, e)
    })
}

/// Loads whatever an earlier run left behind: the final output, then the
/// checkpoint on top of it. Missing files are skipped.
pub fn load_resume<T: Entry>(output: &Path, checkpoint: &Path) -> StorageResult<Accumulator<T>> {
    let mut accumulator = Accumulator::new();

    for path in [output, checkpoint] {
        match read_mapping::<T>(path) {
            Ok(entries) => {
                tracing::info!("Resuming with {} entries from {}", entries.len(), path.display());
                accumulator.absorb(Accumulator::from_entries(entries));
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!("No resume data at {}", path.display());
            }
            Err(e) => return Err(e),
        }
    }

    Ok(accumulator)
}

fn write_pretty<T: Serialize>(tmp: &Path, mapping: &BTreeMap<String, T>) -> StorageResult<()> {
    let file = File::create(tmp).map_err(|e| StorageError::io(tmp, e))?;
    let mut writer = BufWriter::new(file);

    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    mapping
        .serialize(&mut serializer)
        .map_err(|source| StorageError::Serialization {
            path: tmp.to_path_buf(),
            source,
        })?;

    writer.flush().map_err(|e| StorageError::io(tmp, e))?;
    let file = writer
        .into_inner()
        .map_err(|e| StorageError::io(tmp, e.into_error()))?;
    file.sync_all().map_err(|e| StorageError::io(tmp, e))
}

/// `dir/name.json` -> `dir/.name.json.tmp`
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mapping".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}
