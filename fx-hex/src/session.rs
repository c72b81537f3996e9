//! Converter Session
//!
//! The state behind a converter form: the amount text, the currency pair and
//! the auto-convert switch. Edits schedule a debounced conversion; results
//! and failures are reported on an event channel so the presentation layer
//! only has to render them.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use fx_types::catalog::currencies;
use fx_types::{
    ConversionResult, CurrencyCode, FavoritePair, FxError, RateFetcher, SlotStorage, StorageError,
};
use tokio::sync::mpsc;
use tracing::debug;

use crate::debounce::Debouncer;
use crate::favorites::FavoritesStore;
use crate::rate_store::{ConvertOutcome, FetchOutcome, RateStore};

/// Form state at one moment.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    /// Raw amount text as typed.
    pub amount: String,
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub auto_convert: bool,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            amount: "100".to_string(),
            from: CurrencyCode::from(&currencies::USD),
            to: CurrencyCode::from(&currencies::EUR),
            auto_convert: true,
        }
    }
}

/// Something the presentation layer should render.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Converted(ConversionResult),
    Failed(FxError),
    /// Rates for another base replaced the ones this conversion needed.
    Skipped { from: CurrencyCode, to: CurrencyCode },
}

/// Parses user-typed amount text. Only positive finite numbers are accepted.
pub fn parse_amount(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|a| a.is_finite() && *a > 0.0)
}

/// One running converter, owning its stores for the session's lifetime.
pub struct ConverterSession<F: RateFetcher, S: SlotStorage> {
    rates: Arc<RateStore<F>>,
    favorites: Arc<FavoritesStore<S>>,
    form: Mutex<FormState>,
    debouncer: Debouncer,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl<F: RateFetcher, S: SlotStorage> ConverterSession<F, S> {
    /// Creates a session with the default form and the given debounce delay.
    ///
    /// The receiver yields every debounced conversion result or failure.
    pub fn new(
        rates: Arc<RateStore<F>>,
        favorites: Arc<FavoritesStore<S>>,
        delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let session = Self {
            rates,
            favorites,
            form: Mutex::new(FormState::default()),
            debouncer: Debouncer::new(delay),
            events,
        };
        (session, rx)
    }

    pub fn rates(&self) -> &Arc<RateStore<F>> {
        &self.rates
    }

    pub fn favorites(&self) -> &Arc<FavoritesStore<S>> {
        &self.favorites
    }

    fn form_mut(&self) -> MutexGuard<'_, FormState> {
        self.form.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn form(&self) -> FormState {
        self.form_mut().clone()
    }

    /// Loads rates for the current source currency.
    pub async fn warm_up(&self) -> Result<FetchOutcome, FxError> {
        let from = self.form().from;
        self.rates.ensure_rates(&from).await
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Form Edits
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn set_amount(&self, text: impl Into<String>) {
        self.form_mut().amount = text.into();
        self.schedule_conversion();
    }

    pub fn set_from(&self, code: CurrencyCode) {
        self.form_mut().from = code;
        self.schedule_conversion();
    }

    pub fn set_to(&self, code: CurrencyCode) {
        self.form_mut().to = code;
        self.schedule_conversion();
    }

    /// Exchanges the source and destination currencies.
    pub fn swap(&self) {
        {
            let mut form = self.form_mut();
            let form = &mut *form;
            std::mem::swap(&mut form.from, &mut form.to);
        }
        self.schedule_conversion();
    }

    /// Loads a favorite pair into the form.
    pub fn select_favorite(&self, pair: &FavoritePair) {
        {
            let mut form = self.form_mut();
            form.from = pair.from().clone();
            form.to = pair.to().clone();
        }
        self.schedule_conversion();
    }

    /// Turning auto-convert off drops any pending conversion; turning it on
    /// schedules one for the current form.
    pub fn set_auto_convert(&self, enabled: bool) {
        self.form_mut().auto_convert = enabled;
        if enabled {
            self.schedule_conversion();
        } else {
            self.debouncer.cancel();
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Actions
    // ─────────────────────────────────────────────────────────────────────────────

    /// Converts the current form immediately, bypassing the debounce.
    ///
    /// Text that is not a number is reported as
    /// [`FxError::UnparsableAmount`]; numbers that are not positive and
    /// finite are left to the store's own check.
    pub async fn convert_now(&self) -> Result<ConvertOutcome, FxError> {
        let form = self.form();
        let Ok(amount) = form.amount.trim().parse::<f64>() else {
            let err = FxError::UnparsableAmount(form.amount);
            self.rates.record_error(err.clone());
            return Err(err);
        };
        self.rates.convert_fresh(amount, &form.from, &form.to).await
    }

    /// Forces a fetch for the current source currency.
    pub async fn refresh(&self) -> Result<FetchOutcome, FxError> {
        let from = self.form().from;
        self.rates.refresh(&from).await
    }

    /// Adds or removes the current pair. Returns whether it is now a favorite.
    pub fn toggle_favorite(&self) -> Result<bool, StorageError> {
        let form = self.form();
        self.favorites.toggle(&form.from, &form.to)
    }

    /// Whether a debounced conversion is waiting or in flight.
    pub fn is_converting(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn is_current_favorite(&self) -> bool {
        let form = self.form();
        self.favorites.is_favorite(&form.from, &form.to)
    }

    fn schedule_conversion(&self) {
        let form = self.form();
        if !form.auto_convert {
            return;
        }
        let Some(amount) = parse_amount(&form.amount) else {
            debug!(amount = %form.amount, "Skipping conversion for invalid amount");
            self.debouncer.cancel();
            return;
        };

        let rates = Arc::clone(&self.rates);
        let events = self.events.clone();
        self.debouncer.schedule(async move {
            let event = match rates.convert_fresh(amount, &form.from, &form.to).await {
                Ok(ConvertOutcome::Converted(result)) => SessionEvent::Converted(result),
                Ok(outcome) => {
                    debug!(?outcome, from = %form.from, to = %form.to, "Conversion skipped");
                    SessionEvent::Skipped {
                        from: form.from,
                        to: form.to,
                    }
                }
                Err(e) => SessionEvent::Failed(e),
            };
            // Receiver gone means the session is shutting down.
            let _ = events.send(event);
        });
    }
}
