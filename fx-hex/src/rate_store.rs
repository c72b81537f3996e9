//! Rate/Conversion Store
//!
//! Owns the current rate snapshot, the loading flag, the error slot and the
//! last conversion. Fetching goes through the `RateFetcher` port.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use fx_types::{ConversionResult, CurrencyCode, FxError, RateFetcher, RateSnapshot};
use tokio::sync::watch;
use tracing::{Span, debug, field, instrument, warn};

/// What a conversion request ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertOutcome {
    /// A result was computed and stored as the last conversion.
    Converted(ConversionResult),
    /// The held snapshot had another base; a fetch was issued instead and
    /// the conversion is left to the next call.
    RatesRequested,
    /// A newer fetch replaced the rates with another base, so no
    /// conversion for this request's `from` was possible.
    Superseded,
}

/// What a fetch request ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A snapshot with the requested base was already held; no request made.
    Cached,
    /// The fetched snapshot replaced the held one.
    Applied,
    /// A newer request was issued before this one completed; result dropped.
    Superseded,
}

#[derive(Debug, Default)]
struct StoreState {
    snapshot: Option<Arc<RateSnapshot>>,
    loading: bool,
    error: Option<FxError>,
    last_conversion: Option<ConversionResult>,
}

/// Application service for rates and conversions.
///
/// Generic over `F: RateFetcher` - the adapter is injected at compile time.
/// Every fetch is tagged with a sequence number; only the most recently
/// issued fetch may touch the state when it completes.
pub struct RateStore<F: RateFetcher> {
    fetcher: F,
    state: Mutex<StoreState>,
    issued: AtomicU64,
    /// Highest sequence number whose fetch has finished (or been dropped).
    settled: watch::Sender<u64>,
}

/// Marks a fetch as settled when its future completes or is dropped.
struct SettleOnDrop<'a> {
    settled: &'a watch::Sender<u64>,
    seq: u64,
}

impl Drop for SettleOnDrop<'_> {
    fn drop(&mut self) {
        let seq = self.seq;
        self.settled.send_if_modified(|settled| {
            if *settled < seq {
                *settled = seq;
                true
            } else {
                false
            }
        });
    }
}

impl<F: RateFetcher> RateStore<F> {
    /// Creates an empty store around the given fetcher.
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            state: Mutex::new(StoreState::default()),
            issued: AtomicU64::new(0),
            settled: watch::Sender::new(0),
        }
    }

    /// Returns a reference to the underlying fetcher.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        // Poisoning is ignored: the state is plain data.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Read Accessors
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Option<Arc<RateSnapshot>> {
        self.state().snapshot.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    pub fn last_error(&self) -> Option<FxError> {
        self.state().error.clone()
    }

    /// Banner text for the current error, if any.
    pub fn error_message(&self) -> Option<String> {
        self.state().error.as_ref().map(FxError::user_message)
    }

    pub fn last_conversion(&self) -> Option<ConversionResult> {
        self.state().last_conversion.clone()
    }

    /// Dismisses the error. Snapshot and last conversion are untouched.
    pub fn clear_error(&self) {
        self.state().error = None;
    }

    /// Puts an error raised outside the store into the error slot.
    pub fn record_error(&self, err: FxError) {
        self.state().error = Some(err);
    }

    /// Sequence number of the most recently issued fetch (0 before any).
    pub fn latest_request(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Fetch Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Makes sure a snapshot based on `base` is held, fetching only if not.
    pub async fn ensure_rates(&self, base: &CurrencyCode) -> Result<FetchOutcome, FxError> {
        let cached = self
            .state()
            .snapshot
            .as_ref()
            .is_some_and(|s| s.base() == base);
        if cached {
            debug!(%base, "Rates already cached");
            return Ok(FetchOutcome::Cached);
        }
        self.fetch_and_apply(base).await
    }

    /// Fetches `base` regardless of what is cached.
    pub async fn refresh(&self, base: &CurrencyCode) -> Result<FetchOutcome, FxError> {
        self.fetch_and_apply(base).await
    }

    #[instrument(skip(self, base), fields(base = %base, seq = field::Empty))]
    async fn fetch_and_apply(&self, base: &CurrencyCode) -> Result<FetchOutcome, FxError> {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Span::current().record("seq", seq);
        let _settle = SettleOnDrop {
            settled: &self.settled,
            seq,
        };
        {
            let mut state = self.state();
            state.loading = true;
            state.error = None;
        }

        let result = self.fetcher.fetch(base).await;

        let mut state = self.state();
        if self.issued.load(Ordering::SeqCst) != seq {
            debug!("Discarding superseded rate fetch");
            return Ok(FetchOutcome::Superseded);
        }

        state.loading = false;
        match result {
            Ok(snapshot) => {
                state.snapshot = Some(Arc::new(snapshot));
                Ok(FetchOutcome::Applied)
            }
            Err(e) => {
                let err = FxError::from(e);
                warn!(error = %err, "Keeping previous rates after failed fetch");
                state.error = Some(err.clone());
                Err(err)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Conversion Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Converts with the held snapshot, or requests rates if it has another base.
    ///
    /// When the snapshot's base is not `from`, this call only fetches and
    /// returns [`ConvertOutcome::RatesRequested`]; the caller converts again
    /// once rates arrive.
    pub async fn convert(
        &self,
        amount: f64,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<ConvertOutcome, FxError> {
        self.check_amount(amount)?;

        match self.snapshot() {
            Some(snapshot) if snapshot.base() == from => self.convert_with(&snapshot, amount, to),
            _ => {
                self.ensure_rates(from).await?;
                Ok(ConvertOutcome::RatesRequested)
            }
        }
    }

    /// Ensures rates for `from`, then converts, in one call.
    ///
    /// If a newer fetch overtook ours, waits for the latest fetch to finish
    /// and converts with its snapshot when that has the same base. Never
    /// returns [`ConvertOutcome::RatesRequested`].
    pub async fn convert_fresh(
        &self,
        amount: f64,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<ConvertOutcome, FxError> {
        self.check_amount(amount)?;

        if self.ensure_rates(from).await? == FetchOutcome::Superseded {
            debug!(%from, "Own fetch overtaken, waiting for the latest one");
            self.wait_settled().await;
        }

        match self.snapshot() {
            Some(snapshot) if snapshot.base() == from => self.convert_with(&snapshot, amount, to),
            _ => match self.last_error() {
                Some(err) => Err(err),
                None => Ok(ConvertOutcome::Superseded),
            },
        }
    }

    /// Resolves once every fetch issued so far has finished.
    async fn wait_settled(&self) {
        let mut settled = self.settled.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = settled
            .wait_for(|&seq| seq >= self.issued.load(Ordering::SeqCst))
            .await;
    }

    fn check_amount(&self, amount: f64) -> Result<(), FxError> {
        if amount.is_finite() && amount > 0.0 {
            return Ok(());
        }
        let err = FxError::InvalidAmount(amount);
        self.state().error = Some(err.clone());
        Err(err)
    }

    fn convert_with(
        &self,
        snapshot: &RateSnapshot,
        amount: f64,
        to: &CurrencyCode,
    ) -> Result<ConvertOutcome, FxError> {
        let mut state = self.state();
        match snapshot.convert(amount, to) {
            Ok(conversion) => {
                debug!(
                    from = %conversion.from,
                    to = %conversion.to,
                    rate = conversion.rate,
                    "Converted"
                );
                state.last_conversion = Some(conversion.clone());
                Ok(ConvertOutcome::Converted(conversion))
            }
            Err(e) => {
                let err = FxError::from(e);
                state.error = Some(err.clone());
                Err(err)
            }
        }
    }
}
