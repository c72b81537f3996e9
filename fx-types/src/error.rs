//! Error types for the currency converter.

use crate::domain::CurrencyCode;

/// Message shown to the user for any failed rate fetch.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch exchange rates. Please try again later.";

/// Domain-level errors (invariant violations).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid currency code: {0:?}")]
    InvalidCurrencyCode(String),

    #[error("Invalid rate for {code}: {rate}")]
    InvalidRate { code: CurrencyCode, rate: f64 },

    #[error("Amount must be a positive number, got {0}")]
    InvalidAmount(f64),

    #[error("Exchange rate not found for {0}")]
    RateNotFound(CurrencyCode),
}

/// Rate fetcher errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The rate service answered with a non-success status.
    #[error("HTTP error! status: {status}")]
    Transport { status: u16 },

    /// Network failure or a body that could not be understood.
    /// `reason` is for logs; the display text is the user-facing message.
    #[error("Failed to fetch exchange rates. Please try again later.")]
    Failed { reason: String },
}

impl FetchError {
    pub fn failed(reason: impl Into<String>) -> Self {
        FetchError::Failed {
            reason: reason.into(),
        }
    }
}

/// Durable storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Store-level errors, the ones that land in the dismissible error slot.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FxError {
    #[error("Transport error: HTTP status {status}")]
    Transport { status: u16 },

    #[error("Fetch failed: {reason}")]
    FetchFailed { reason: String },

    #[error("Exchange rate not found for {0}")]
    RateNotFound(CurrencyCode),

    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),

    #[error("Amount is not a number: {0:?}")]
    UnparsableAmount(String),

    #[error("Invalid currency code: {0:?}")]
    InvalidCurrency(String),
}

impl FxError {
    /// Text for the error banner.
    ///
    /// Transport and fetch failures read the same to the user.
    pub fn user_message(&self) -> String {
        match self {
            FxError::Transport { .. } | FxError::FetchFailed { .. } => {
                FETCH_FAILED_MESSAGE.to_string()
            }
            FxError::RateNotFound(code) => format!("Exchange rate not found for {code}"),
            FxError::InvalidAmount(_) | FxError::UnparsableAmount(_) => {
                "Please enter a positive amount.".to_string()
            }
            FxError::InvalidCurrency(raw) => format!("Unknown currency code: {raw}"),
        }
    }

    /// Whether trying the same thing again later could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FxError::Transport { .. } | FxError::FetchFailed { .. })
    }
}

impl From<FetchError> for FxError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Transport { status } => FxError::Transport { status },
            FetchError::Failed { reason } => FxError::FetchFailed { reason },
        }
    }
}

impl From<DomainError> for FxError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::RateNotFound(code) => FxError::RateNotFound(code),
            DomainError::InvalidAmount(amount) => FxError::InvalidAmount(amount),
            DomainError::InvalidCurrencyCode(raw) => FxError::InvalidCurrency(raw),
            DomainError::InvalidRate { code, rate } => FxError::FetchFailed {
                reason: format!("invalid rate for {code}: {rate}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_failures_share_user_message() {
        let transport: FxError = FetchError::Transport { status: 503 }.into();
        let failed: FxError = FetchError::failed("connection reset").into();
        assert_eq!(transport.user_message(), failed.user_message());
        assert_eq!(transport.user_message(), FETCH_FAILED_MESSAGE);
        assert!(transport.is_retryable());
    }

    #[test]
    fn test_rate_not_found_names_currency() {
        let err: FxError = DomainError::RateNotFound(CurrencyCode::new("XYZ").unwrap()).into();
        assert_eq!(err.user_message(), "Exchange rate not found for XYZ");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_unparsable_amount_names_the_text() {
        let err = FxError::UnparsableAmount("10x".to_string());
        assert_eq!(err.to_string(), "Amount is not a number: \"10x\"");
        assert_eq!(err.user_message(), "Please enter a positive amount.");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_fetch_failed_display_is_user_facing() {
        let err = FetchError::failed("expected value at line 1 column 1");
        assert_eq!(err.to_string(), FETCH_FAILED_MESSAGE);
    }
}
