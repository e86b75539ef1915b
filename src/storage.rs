use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use log::{debug, error, trace};
use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;

use crate::{MindlineError, Result};

/// A single persisted key-value slot holding one JSON array snapshot.
///
/// Every write replaces the whole file. Writes go through a temporary file in the
/// same directory that is atomically renamed over the target, so a failed write
/// leaves the previous snapshot untouched.
#[derive(Debug, Clone)]
pub struct JsonSlot {
    path: PathBuf,
}

impl JsonSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the snapshot stored in the slot.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when nothing was ever written, the decoded records otherwise, or an
    /// error when the file cannot be read or is not an array of the expected shape
    pub fn read<T: DeserializeOwned>(&self) -> Result<Option<Vec<T>>> {
        debug!("Reading slot: {}", self.path.display());

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                trace!("Slot {} does not exist yet", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                error!("Failed to open slot {}: {}", self.path.display(), e);
                return Err(MindlineError::Io(e));
            }
        };

        let records: Vec<T> = serde_json::from_str(&content)?;
        trace!(
            "Decoded {} records from {}",
            records.len(),
            self.path.display()
        );
        Ok(Some(records))
    }

    /// Replaces the slot content with `records` using an atomic rename
    pub fn write<T: Serialize>(&self, records: &[T]) -> Result<()> {
        debug!(
            "Writing {} records to slot: {}",
            records.len(),
            self.path.display()
        );

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        if !dir.exists() {
            debug!("Creating slot directory: {}", dir.display());
            fs::create_dir_all(dir).map_err(|e| {
                error!("Failed to create directory {}: {}", dir.display(), e);
                MindlineError::DirectoryError {
                    path: dir.to_path_buf(),
                }
            })?;
        }

        let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| {
            error!("Failed to create temporary file: {}", e);
            MindlineError::Io(e)
        })?;

        trace!("Serializing snapshot to JSON");
        let json = serde_json::to_string_pretty(records).map_err(|e| {
            error!("Failed to serialize snapshot: {}", e);
            MindlineError::Serialization(e)
        })?;

        temp_file.write_all(json.as_bytes()).map_err(|e| {
            error!("Failed to write to temporary file: {}", e);
            MindlineError::Io(e)
        })?;

        temp_file.flush().map_err(|e| {
            error!("Failed to flush temporary file: {}", e);
            MindlineError::Io(e)
        })?;

        temp_file.persist(&self.path).map_err(|e| {
            error!(
                "Failed to persist file {}: {}",
                self.path.display(),
                e.error
            );
            MindlineError::Io(e.error)
        })?;

        trace!("Slot {} written", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        name: String,
        value: u32,
    }

    #[test]
    fn missing_slot_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let slot = JsonSlot::new(dir.path().join("absent.json"));

        let records: Option<Vec<Record>> = slot.read().unwrap();
        assert!(records.is_none());
    }

    #[test]
    fn write_creates_parent_directories_and_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let slot = JsonSlot::new(dir.path().join("nested").join("slot.json"));

        let first = vec![Record { name: "a".into(), value: 1 }];
        slot.write(&first).unwrap();
        let second = vec![
            Record { name: "b".into(), value: 2 },
            Record { name: "c".into(), value: 3 },
        ];
        slot.write(&second).unwrap();

        let back: Vec<Record> = slot.read().unwrap().unwrap();
        assert_eq!(back, second);
    }

    #[test]
    fn non_array_payload_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slot.json");
        fs::write(&path, r#"{"name": "a", "value": 1}"#).unwrap();

        let result: Result<Option<Vec<Record>>> = JsonSlot::new(path).read();
        assert!(matches!(result, Err(MindlineError::Serialization(_))));
    }
}
