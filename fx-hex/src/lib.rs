//! # FX Hex
//!
//! Application layer of the currency converter.
//!
//! ## Architecture
//!
//! - `rate_store` - Holds the current rate snapshot and the last conversion
//! - `favorites` - Persistent set of directional currency pairs
//! - `debounce` - Quiet-period scheduler for keystroke-driven conversions
//! - `session` - Converter form state wired to the stores above
//!
//! The stores are generic over the `RateFetcher` and `SlotStorage` ports, so
//! the HTTP client and the storage backend are injected by the binary and
//! replaced by in-memory doubles in tests. Nothing here is a global: each
//! running session owns its stores.

pub mod debounce;
pub mod favorites;
pub mod rate_store;
pub mod session;


pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use favorites::{FAVORITES_SLOT, FavoritesStore};
pub use rate_store::{ConvertOutcome, FetchOutcome, RateStore};
pub use session::{ConverterSession, FormState, SessionEvent, parse_amount};
