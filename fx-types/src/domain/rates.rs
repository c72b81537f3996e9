//! Rate snapshots and the conversions derived from them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use super::currency::CurrencyCode;
use crate::error::DomainError;

/// One complete set of quotes against a single base currency.
///
/// All rates read "1 unit of `base` = rate units of target". Every rate is a
/// positive finite number; a snapshot is built whole and never patched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateSnapshot {
    base: CurrencyCode,
    rates: BTreeMap<CurrencyCode, f64>,
    as_of: String,
    updated_at: DateTime<Utc>,
}

impl RateSnapshot {
    /// Builds a snapshot, rejecting any rate that is not positive and finite.
    pub fn new(
        base: CurrencyCode,
        rates: impl IntoIterator<Item = (CurrencyCode, f64)>,
        as_of: impl Into<String>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let mut table = BTreeMap::new();
        for (code, rate) in rates {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(DomainError::InvalidRate { code, rate });
            }
            table.insert(code, rate);
        }

        Ok(Self {
            base,
            rates: table,
            as_of: as_of.into(),
            updated_at,
        })
    }

    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    pub fn rates(&self) -> &BTreeMap<CurrencyCode, f64> {
        &self.rates
    }

    /// Textual "as-of" date reported by the provider.
    pub fn as_of(&self) -> &str {
        &self.as_of
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Last-update time as unix seconds.
    pub fn timestamp(&self) -> i64 {
        self.updated_at.timestamp()
    }

    pub fn rate_for(&self, target: &str) -> Option<f64> {
        self.rates.get(target).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Converts `amount` units of the base currency into `to`.
    ///
    /// The output is `amount * rate` with no rounding; formatting is left to
    /// display code.
    pub fn convert(&self, amount: f64, to: &CurrencyCode) -> Result<ConversionResult, DomainError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(DomainError::InvalidAmount(amount));
        }

        let rate = self
            .rate_for(to.as_str())
            .ok_or_else(|| DomainError::RateNotFound(to.clone()))?;

        Ok(ConversionResult {
            from: self.base.clone(),
            to: to.clone(),
            amount,
            result: amount * rate,
            rate,
            as_of: self.as_of.clone(),
            updated_at: self.updated_at,
        })
    }
}

/// The outcome of one conversion. Superseded, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionResult {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub amount: f64,
    pub result: f64,
    pub rate: f64,
    /// "As-of" date of the snapshot the rate came from.
    pub as_of: String,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::new(s).unwrap()
    }

    fn usd_snapshot() -> RateSnapshot {
        RateSnapshot::new(
            code("USD"),
            [(code("USD"), 1.0), (code("EUR"), 0.9), (code("JPY"), 151.37)],
            "2024-01-01",
            DateTime::from_timestamp(1_704_067_200, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_snapshot_creation() {
        let snapshot = usd_snapshot();
        assert_eq!(snapshot.base(), &code("USD"));
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.rate_for("EUR"), Some(0.9));
        assert_eq!(snapshot.as_of(), "2024-01-01");
        assert_eq!(snapshot.timestamp(), 1_704_067_200);
    }

    #[test]
    fn test_non_positive_rate_fails() {
        let result = RateSnapshot::new(
            code("USD"),
            [(code("EUR"), 0.0)],
            "2024-01-01",
            Utc::now(),
        );
        assert!(matches!(result, Err(DomainError::InvalidRate { .. })));
    }

    #[test]
    fn test_non_finite_rate_fails() {
        let result = RateSnapshot::new(
            code("USD"),
            [(code("EUR"), f64::NAN)],
            "2024-01-01",
            Utc::now(),
        );
        assert!(matches!(result, Err(DomainError::InvalidRate { .. })));
    }

    #[test]
    fn test_convert_is_amount_times_rate() {
        let snapshot = usd_snapshot();
        let conversion = snapshot.convert(100.0, &code("EUR")).unwrap();
        assert_eq!(conversion.result, 100.0 * 0.9);
        assert_eq!(conversion.rate, 0.9);
        assert_eq!(conversion.from, code("USD"));
        assert_eq!(conversion.to, code("EUR"));
        assert_eq!(conversion.as_of, "2024-01-01");
    }

    #[test]
    fn test_convert_missing_rate() {
        let snapshot = usd_snapshot();
        let result = snapshot.convert(10.0, &code("XYZ"));
        assert!(matches!(result, Err(DomainError::RateNotFound(c)) if c == "XYZ"));
    }

    #[test]
    fn test_convert_rejects_bad_amount() {
        let snapshot = usd_snapshot();
        assert!(matches!(
            snapshot.convert(0.0, &code("EUR")),
            Err(DomainError::InvalidAmount(_))
        ));
        assert!(matches!(
            snapshot.convert(f64::INFINITY, &code("EUR")),
            Err(DomainError::InvalidAmount(_))
        ));
    }
}
