//! JSON file slot storage.
//!
//! Each slot is one file, `<data_dir>/<slot>.json`. Writes go to a sibling
//! temp file first and are renamed into place, so a crash mid-write leaves
//! either the old payload or the new one.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fx_types::{SlotStorage, StorageError};
use tracing::{debug, warn};

/// File-backed slot storage rooted at a data directory.
#[derive(Debug, Clone)]
pub struct FileSlotStorage {
    root: PathBuf,
}

impl FileSlotStorage {
    /// Opens (creating if needed) the data directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "Opened slot storage");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `slot`.
    pub fn slot_path(&self, slot: &str) -> Result<PathBuf, StorageError> {
        let valid = !slot.is_empty()
            && slot
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::Unavailable(format!(
                "invalid slot name: {slot:?}"
            )));
        }
        Ok(self.root.join(format!("{slot}.json")))
    }
}

impl SlotStorage for FileSlotStorage {
    fn read(&self, slot: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(slot)?;
        match fs::read_to_string(&path) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, slot: &str, payload: &str) -> Result<(), StorageError> {
        let path = self.slot_path(slot)?;
        let tmp = path.with_extension("json.tmp");

        if let Err(e) = replace_file(&tmp, &path, payload) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    warn!(path = %tmp.display(), error = %cleanup, "Unable to remove temp file");
                }
            }
            return Err(e.into());
        }

        debug!(slot, bytes = payload.len(), "Wrote slot");
        Ok(())
    }
}

/// Writes `payload` to `tmp`, flushes it and renames it over `path`.
fn replace_file(tmp: &Path, path: &Path, payload: &str) -> io::Result<()> {
    let mut file = fs::File::create(tmp)?;
    file.write_all(payload.as_bytes())?;
    file.sync_all()?;
    drop(file);
    fs::rename(tmp, path)
}
