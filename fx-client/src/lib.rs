//! # FX Client
//!
//! A typed Rust client for the external rate-quote service, implementing the
//! `RateFetcher` port.

use std::collections::HashMap;
use std::time::Duration;

use chrono::DateTime;
use fx_types::{CurrencyCode, FetchError, RateFetcher, RateSnapshot};
use reqwest::Client;
use tracing::{info, instrument, warn};

/// Rate service endpoint; the base currency code is appended as a path segment.
pub const DEFAULT_ENDPOINT: &str = "https://api.exchangerate-api.com/v4/latest";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Rate service client.
#[derive(Debug, Clone)]
pub struct ExchangeRateClient {
    base_url: String,
    http: Client,
}

impl ExchangeRateClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Creates a client whose requests give up after `timeout`.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::failed(format!("unable to build http client: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Returns the configured endpoint.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full request URL for one base currency.
    pub fn rates_url(&self, base: &CurrencyCode) -> String {
        format!("{}/{}", self.base_url, base)
    }

    /// Fetches the latest quotes against `base`.
    #[instrument(skip(self), fields(base = %base))]
    pub async fn latest(&self, base: &CurrencyCode) -> Result<RateSnapshot, FetchError> {
        let url = self.rates_url(base);
        let result = self.request(&url).await;
        match &result {
            Ok(snapshot) => info!(quotes = snapshot.len(), "Fetched exchange rates"),
            Err(FetchError::Transport { status }) => {
                warn!(status, "Rate service returned an error status")
            }
            Err(FetchError::Failed { reason }) => {
                warn!(%reason, "Error fetching exchange rates")
            }
        }
        result
    }

    async fn request(&self, url: &str) -> Result<RateSnapshot, FetchError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::failed(format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Transport {
                status: status.as_u16(),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::failed(format!("unable to read body: {e}")))?;
        parse_body(&body)
    }
}

#[async_trait::async_trait]
impl RateFetcher for ExchangeRateClient {
    async fn fetch(&self, base: &CurrencyCode) -> Result<RateSnapshot, FetchError> {
        self.latest(base).await
    }
}

/// Maps a provider response body onto a [`RateSnapshot`].
///
/// Both the v4 field names (`base`, `date`, `time_last_updated`, `rates`) and
/// the v6 ones (`base_code`, `time_last_update_utc`, `time_last_update_unix`,
/// `conversion_rates`) are understood. Anything else is a parse failure.
pub fn parse_body(body: &str) -> Result<RateSnapshot, FetchError> {
    let raw: api::LatestResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::failed(format!("unable to parse as json: {e}")))?;

    if raw.result.as_deref() == Some("error") {
        let kind = raw.error_type.as_deref().unwrap_or("unknown");
        return Err(FetchError::failed(format!("provider error: {kind}")));
    }

    let base = raw
        .base_code
        .ok_or_else(|| FetchError::failed("missing base code"))?;
    let base = CurrencyCode::new(&base).map_err(|e| FetchError::failed(e.to_string()))?;

    let unix = raw
        .time_last_update_unix
        .ok_or_else(|| FetchError::failed("missing last-update timestamp"))?;
    let updated_at = DateTime::from_timestamp(unix, 0)
        .ok_or_else(|| FetchError::failed(format!("timestamp out of range: {unix}")))?;

    let as_of = raw
        .time_last_update_utc
        .ok_or_else(|| FetchError::failed("missing last-update date"))?;

    let rates = raw
        .conversion_rates
        .ok_or_else(|| FetchError::failed("missing rates"))?
        .into_iter()
        .map(|(code, rate)| {
            CurrencyCode::new(&code)
                .map(|code| (code, rate))
                .map_err(|e| FetchError::failed(e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    RateSnapshot::new(base, rates, as_of, updated_at).map_err(|e| FetchError::failed(e.to_string()))
}

mod api {
    use super::HashMap;
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct LatestResponse {
        #[serde(default)]
        pub result: Option<String>,
        #[serde(rename = "error-type", default)]
        pub error_type: Option<String>,
        #[serde(alias = "base", default)]
        pub base_code: Option<String>,
        #[serde(alias = "time_last_updated", default)]
        pub time_last_update_unix: Option<i64>,
        #[serde(alias = "date", default)]
        pub time_last_update_utc: Option<String>,
        #[serde(alias = "rates", default)]
        pub conversion_rates: Option<HashMap<String, f64>>,
    }
}
