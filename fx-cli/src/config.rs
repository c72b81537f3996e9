//! Configuration loading from environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use fx_client::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
use fx_hex::DEFAULT_DEBOUNCE;

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub data_dir: PathBuf,
    pub debounce: Duration,
    pub http_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, applying defaults for unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let api_url = lookup("FX_API_URL").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let data_dir = lookup("FX_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".fx"));

        let debounce = match lookup("FX_DEBOUNCE_MS") {
            Some(raw) => Duration::from_millis(
                raw.trim()
                    .parse()
                    .with_context(|| format!("FX_DEBOUNCE_MS must be milliseconds, got {raw:?}"))?,
            ),
            None => DEFAULT_DEBOUNCE,
        };

        let http_timeout = match lookup("FX_HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().with_context(|| {
                    format!("FX_HTTP_TIMEOUT_SECS must be seconds, got {raw:?}")
                })?;
                if secs == 0 {
                    anyhow::bail!("FX_HTTP_TIMEOUT_SECS must be greater than zero");
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            api_url,
            data_dir,
            debounce,
            http_timeout,
        })
    }
}
