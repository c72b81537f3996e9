//! In-memory slot storage, for tests and ephemeral sessions.

use std::collections::HashMap;
use std::sync::Mutex;

use fx_types::{SlotStorage, StorageError};

/// Slot map held in process memory. Lost on exit.
#[derive(Debug, Default)]
pub struct MemorySlotStorage {
    slots: Mutex<HashMap<String, String>>,
    writes: Mutex<usize>,
}

impl MemorySlotStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with one slot.
    pub fn with_slot(slot: &str, payload: impl Into<String>) -> Self {
        let storage = Self::new();
        storage
            .slots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(slot.to_string(), payload.into());
        storage
    }

    /// Number of successful writes since creation.
    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SlotStorage for MemorySlotStorage {
    fn read(&self, slot: &str) -> Result<Option<String>, StorageError> {
        let slots = self
            .slots
            .lock()
            .map_err(|_| StorageError::Unavailable("slot map poisoned".into()))?;
        Ok(slots.get(slot).cloned())
    }

    fn write(&self, slot: &str, payload: &str) -> Result<(), StorageError> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| StorageError::Unavailable("slot map poisoned".into()))?;
        slots.insert(slot.to_string(), payload.to_string());
        *self.writes.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_slot_reads_none() {
        let storage = MemorySlotStorage::new();
        assert!(storage.read("currency-favorites").unwrap().is_none());
    }

    #[test]
    fn test_write_overwrites() {
        let storage = MemorySlotStorage::with_slot("s", "old");
        storage.write("s", "new").unwrap();
        assert_eq!(storage.read("s").unwrap().as_deref(), Some("new"));
        assert_eq!(storage.write_count(), 1);
    }
}
