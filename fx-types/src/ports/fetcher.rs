//! Rate fetcher port.
//!
//! Implementations can be HTTP clients, canned providers for tests, etc.

use std::sync::Arc;

use crate::domain::{CurrencyCode, RateSnapshot};
use crate::error::FetchError;

/// Port trait for the remote rate-quote service.
///
/// One call is one outbound request. Implementations do not cache and do not
/// retry; the code is not checked against the catalog.
#[async_trait::async_trait]
pub trait RateFetcher: Send + Sync + 'static {
    /// Fetches every quote against `base`.
    async fn fetch(&self, base: &CurrencyCode) -> Result<RateSnapshot, FetchError>;
}

#[async_trait::async_trait]
impl<F: RateFetcher + ?Sized> RateFetcher for Arc<F> {
    async fn fetch(&self, base: &CurrencyCode) -> Result<RateSnapshot, FetchError> {
        (**self).fetch(base).await
    }
}
