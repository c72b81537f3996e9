//! Favorites Store
//!
//! An ordered list of directional currency pairs, mirrored to one durable
//! storage slot. The whole list is rewritten after every change.

use std::sync::{Mutex, MutexGuard};

use fx_types::{CurrencyCode, FavoritePair, SlotStorage, StorageError};
use tracing::{debug, error, warn};

/// Durable slot holding the serialized favorites.
pub const FAVORITES_SLOT: &str = "currency-favorites";

/// Persistent favorites, generic over the storage adapter.
pub struct FavoritesStore<S: SlotStorage> {
    storage: S,
    favorites: Mutex<Vec<FavoritePair>>,
}

impl<S: SlotStorage> FavoritesStore<S> {
    /// Loads favorites from storage.
    ///
    /// Best-effort: a missing slot, a read failure or an unparsable payload
    /// all start from an empty list.
    pub fn load(storage: S) -> Self {
        let favorites = match storage.read(FAVORITES_SLOT) {
            Ok(Some(payload)) => match decode(&payload) {
                Ok(favorites) => favorites,
                Err(e) => {
                    warn!(error = %e, "Stored favorites are corrupt, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => {
                debug!("No stored favorites");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "Unable to read stored favorites, starting empty");
                Vec::new()
            }
        };

        Self {
            storage,
            favorites: Mutex::new(favorites),
        }
    }

    fn favorites(&self) -> MutexGuard<'_, Vec<FavoritePair>> {
        self.favorites.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a reference to the underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Appends the pair unless that exact ordered pair is already present.
    ///
    /// Returns whether the list changed. Storage is written only on change.
    pub fn add(&self, from: &CurrencyCode, to: &CurrencyCode) -> Result<bool, StorageError> {
        let mut favorites = self.favorites();
        if favorites.iter().any(|f| f.matches(from, to)) {
            return Ok(false);
        }
        favorites.push(FavoritePair::new(from.clone(), to.clone()));
        self.persist(&favorites)?;
        Ok(true)
    }

    /// Removes the exact ordered pair if present. Absent pairs are not an error.
    pub fn remove(&self, from: &CurrencyCode, to: &CurrencyCode) -> Result<bool, StorageError> {
        let mut favorites = self.favorites();
        let before = favorites.len();
        favorites.retain(|f| !f.matches(from, to));
        if favorites.len() == before {
            return Ok(false);
        }
        self.persist(&favorites)?;
        Ok(true)
    }

    /// Adds the pair if absent, removes it if present.
    ///
    /// Returns whether the pair is a favorite afterwards.
    pub fn toggle(&self, from: &CurrencyCode, to: &CurrencyCode) -> Result<bool, StorageError> {
        if self.is_favorite(from, to) {
            self.remove(from, to).map(|_| false)
        } else {
            self.add(from, to).map(|_| true)
        }
    }

    pub fn is_favorite(&self, from: &CurrencyCode, to: &CurrencyCode) -> bool {
        self.favorites().iter().any(|f| f.matches(from, to))
    }

    /// Favorites in insertion order.
    pub fn list(&self) -> Vec<FavoritePair> {
        self.favorites().clone()
    }

    pub fn len(&self) -> usize {
        self.favorites().len()
    }

    pub fn is_empty(&self) -> bool {
        self.favorites().is_empty()
    }

    fn persist(&self, favorites: &[FavoritePair]) -> Result<(), StorageError> {
        let payload = encode(favorites)?;
        self.storage
            .write(FAVORITES_SLOT, &payload)
            .inspect_err(|e| error!(error = %e, "Failed to persist favorites"))
    }
}

/// Serializes favorites as a JSON array of `{from, to, name}` records.
pub fn encode(favorites: &[FavoritePair]) -> Result<String, serde_json::Error> {
    serde_json::to_string(favorites)
}

/// Parses a stored payload, collapsing repeated ordered pairs.
pub fn decode(payload: &str) -> Result<Vec<FavoritePair>, serde_json::Error> {
    let stored: Vec<FavoritePair> = serde_json::from_str(payload)?;
    let mut favorites: Vec<FavoritePair> = Vec::with_capacity(stored.len());
    for pair in stored {
        if !favorites.contains(&pair) {
            favorites.push(pair);
        }
    }
    Ok(favorites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fx_repo::MemorySlotStorage;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::new(s).unwrap()
    }

    fn empty_store() -> FavoritesStore<MemorySlotStorage> {
        FavoritesStore::load(MemorySlotStorage::new())
    }

    #[test]
    fn test_add_then_is_favorite() {
        let store = empty_store();
        assert!(store.add(&code("USD"), &code("EUR")).unwrap());
        assert!(store.is_favorite(&code("USD"), &code("EUR")));
    }

    #[test]
    fn test_add_twice_keeps_one_entry() {
        let store = empty_store();
        store.add(&code("USD"), &code("EUR")).unwrap();
        assert!(!store.add(&code("USD"), &code("EUR")).unwrap());
        assert_eq!(store.len(), 1);
        assert_eq!(store.storage().write_count(), 1);
    }

    #[test]
    fn test_remove_after_add() {
        let store = empty_store();
        store.add(&code("USD"), &code("EUR")).unwrap();
        assert!(store.remove(&code("USD"), &code("EUR")).unwrap());
        assert!(!store.is_favorite(&code("USD"), &code("EUR")));
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let store = empty_store();
        assert!(!store.remove(&code("USD"), &code("EUR")).unwrap());
        assert_eq!(store.storage().write_count(), 0);
    }

    #[test]
    fn test_both_directions_coexist() {
        let store = empty_store();
        store.add(&code("USD"), &code("EUR")).unwrap();
        store.add(&code("EUR"), &code("USD")).unwrap();
        assert_eq!(store.len(), 2);

        store.remove(&code("EUR"), &code("USD")).unwrap();
        assert!(store.is_favorite(&code("USD"), &code("EUR")));
        assert!(!store.is_favorite(&code("EUR"), &code("USD")));
    }

    #[test]
    fn test_toggle() {
        let store = empty_store();
        assert!(store.toggle(&code("GBP"), &code("JPY")).unwrap());
        assert!(!store.toggle(&code("GBP"), &code("JPY")).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_every_mutation_writes_full_list() {
        let store = empty_store();
        store.add(&code("USD"), &code("EUR")).unwrap();
        store.add(&code("GBP"), &code("INR")).unwrap();

        let payload = store.storage().read(FAVORITES_SLOT).unwrap().unwrap();
        let stored: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(
            stored,
            serde_json::json!([
                {"from": "USD", "to": "EUR", "name": "USD/EUR"},
                {"from": "GBP", "to": "INR", "name": "GBP/INR"}
            ])
        );
    }

    #[test]
    fn test_reload_preserves_order() {
        let store = empty_store();
        store.add(&code("USD"), &code("EUR")).unwrap();
        store.add(&code("CAD"), &code("USD")).unwrap();
        store.add(&code("EUR"), &code("USD")).unwrap();
        let payload = store.storage().read(FAVORITES_SLOT).unwrap().unwrap();

        let reloaded = FavoritesStore::load(MemorySlotStorage::with_slot(FAVORITES_SLOT, payload));
        assert_eq!(reloaded.list(), store.list());
    }

    #[test]
    fn test_encode_decode_preserves_order() {
        let favorites = vec![
            FavoritePair::new(code("JPY"), code("USD")),
            FavoritePair::new(code("USD"), code("JPY")),
            FavoritePair::new(code("AUD"), code("NZD")),
        ];
        let decoded = decode(&encode(&favorites).unwrap()).unwrap();
        assert_eq!(decoded, favorites);
    }

    #[test]
    fn test_corrupt_storage_starts_empty() {
        let storage = MemorySlotStorage::with_slot(FAVORITES_SLOT, "{not valid json");
        let store = FavoritesStore::load(storage);
        assert!(store.is_empty());
    }

    #[test]
    fn test_wrong_shape_starts_empty() {
        let storage = MemorySlotStorage::with_slot(FAVORITES_SLOT, r#"{"from":"USD"}"#);
        assert!(FavoritesStore::load(storage).is_empty());
    }

    #[test]
    fn test_duplicate_stored_pairs_collapse() {
        let payload = r#"[
            {"from":"USD","to":"EUR","name":"USD/EUR"},
            {"from":"usd","to":"eur","name":"USD/EUR"}
        ]"#;
        let store = FavoritesStore::load(MemorySlotStorage::with_slot(FAVORITES_SLOT, payload));
        assert_eq!(store.len(), 1);
    }

    struct FailingStorage;

    impl SlotStorage for FailingStorage {
        fn read(&self, _slot: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disk gone".into()))
        }

        fn write(&self, _slot: &str, _payload: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk gone".into()))
        }
    }

    #[test]
    fn test_unreadable_storage_starts_empty() {
        assert!(FavoritesStore::load(FailingStorage).is_empty());
    }

    #[test]
    fn test_write_failure_is_reported_and_mutation_stands() {
        let store = FavoritesStore::load(FailingStorage);
        let result = store.add(&code("USD"), &code("EUR"));
        assert!(matches!(result, Err(StorageError::Unavailable(_))));
        assert!(store.is_favorite(&code("USD"), &code("EUR")));
    }
}
