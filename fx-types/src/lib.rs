//! # FX Types
//!
//! Domain types and port traits for the currency converter.
//! This crate has ZERO external IO dependencies - only data structures,
//! invariants, and trait definitions.
//!
//! ## Architecture
//!
//! This crate is the **innermost core** of the hexagonal layout:
//! - `domain/` - Currency codes, rate snapshots, conversion results, favorite pairs
//! - `ports/` - Traits the rate fetcher and the durable slot storage implement
//! - `error/` - Domain, fetch, storage, and store-level error types

pub mod domain;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{ConversionResult, CurrencyCode, FavoritePair, RateSnapshot};
pub use error::{DomainError, FETCH_FAILED_MESSAGE, FetchError, FxError, StorageError};
pub use fx_catalog::{self as catalog, Currency};
pub use ports::{RateFetcher, SlotStorage};
