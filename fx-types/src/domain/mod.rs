//! Domain models for the currency converter.

pub mod currency;
pub mod favorite;
pub mod rates;

pub use currency::CurrencyCode;
pub use favorite::FavoritePair;
pub use rates::{ConversionResult, RateSnapshot};
