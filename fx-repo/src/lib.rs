//! # FX Repository
//!
//! Concrete slot storage implementations (adapters) for the currency converter.
//! This crate provides the backends that implement the `SlotStorage` port.

use std::path::Path;

use fx_types::StorageError;

pub mod file;
pub mod memory;


pub use file::FileSlotStorage;
pub use memory::MemorySlotStorage;

/// Build file-backed storage rooted at `data_dir`.
///
/// This function:
/// 1. Creates the directory (and parents) if missing
/// 2. Returns a ready-to-use `FileSlotStorage`
///
/// # Examples
///
/// ```ignore
/// let storage = build_storage(Path::new(".fx"))?;
/// ```
pub fn build_storage(data_dir: &Path) -> Result<FileSlotStorage, StorageError> {
    FileSlotStorage::new(data_dir)
}
