//! Port traits (interfaces for adapters).
//!
//! The stores in `fx-hex` depend on these traits, not on concrete
//! HTTP clients or storage backends.

mod fetcher;
mod storage;

pub use fetcher::RateFetcher;
pub use storage::SlotStorage;
