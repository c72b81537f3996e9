//! Durable slot storage port.
//!
//! Modeled on a browser-style key/value store: each named slot holds one
//! string payload that is read whole and overwritten whole.

use crate::error::StorageError;

/// Port trait for durable local storage.
///
/// Calls are synchronous from the caller's perspective and unbatched.
pub trait SlotStorage: Send + Sync + 'static {
    /// Reads a slot. `Ok(None)` when the slot was never written.
    fn read(&self, slot: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the slot's entire payload.
    fn write(&self, slot: &str, payload: &str) -> Result<(), StorageError>;
}
