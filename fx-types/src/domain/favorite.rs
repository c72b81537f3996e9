//! Favorite currency pairs.

use serde::{Deserialize, Serialize};

use super::currency::CurrencyCode;

/// A directional bookmark of a (from, to) combination.
///
/// `USD/EUR` and `EUR/USD` are different pairs. The display name is always
/// derived from the codes, including when a stored record is read back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "StoredPair")]
pub struct FavoritePair {
    from: CurrencyCode,
    to: CurrencyCode,
    name: String,
}

impl FavoritePair {
    pub fn new(from: CurrencyCode, to: CurrencyCode) -> Self {
        let name = format!("{from}/{to}");
        Self { from, to, name }
    }

    pub fn from(&self) -> &CurrencyCode {
        &self.from
    }

    pub fn to(&self) -> &CurrencyCode {
        &self.to
    }

    /// Display name, `FROM/TO`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True for the exact ordered pair.
    pub fn matches(&self, from: &CurrencyCode, to: &CurrencyCode) -> bool {
        &self.from == from && &self.to == to
    }
}

/// Wire shape of a stored favorite. A stored `name` is ignored on read.
#[derive(Deserialize)]
struct StoredPair {
    from: CurrencyCode,
    to: CurrencyCode,
}

impl From<StoredPair> for FavoritePair {
    fn from(stored: StoredPair) -> Self {
        FavoritePair::new(stored.from, stored.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::new(s).unwrap()
    }

    #[test]
    fn test_name_is_derived() {
        let pair = FavoritePair::new(code("usd"), code("eur"));
        assert_eq!(pair.name(), "USD/EUR");
    }

    #[test]
    fn test_direction_matters() {
        let pair = FavoritePair::new(code("USD"), code("EUR"));
        assert!(pair.matches(&code("USD"), &code("EUR")));
        assert!(!pair.matches(&code("EUR"), &code("USD")));
        assert_ne!(pair, FavoritePair::new(code("EUR"), code("USD")));
    }

    #[test]
    fn test_serializes_as_record() {
        let pair = FavoritePair::new(code("GBP"), code("JPY"));
        let json = serde_json::to_value(&pair).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"from": "GBP", "to": "JPY", "name": "GBP/JPY"})
        );
    }

    #[test]
    fn test_stored_name_is_recomputed() {
        let pair: FavoritePair =
            serde_json::from_str(r#"{"from":"usd","to":"eur","name":"bogus"}"#).unwrap();
        assert_eq!(pair.name(), "USD/EUR");

        let without_name: FavoritePair =
            serde_json::from_str(r#"{"from":"USD","to":"CAD"}"#).unwrap();
        assert_eq!(without_name.name(), "USD/CAD");
    }
}
