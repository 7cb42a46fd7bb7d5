//! Exchange rate provider: keeps a conversion selection supplied with a
//! current rate, using the time-boxed [`RateCache`] before the network.
//!
//! State changes are published through a [`tokio::sync::watch`] channel.
//! Each [`RateConverter::ensure_rate`] call stamps a new generation; results
//! of calls that were superseded while awaiting the network are dropped
//! instead of overwriting the newer selection.

use anyhow::{Result, bail};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, watch};
use tracing::{debug, instrument, warn};

use super::cache::{DEFAULT_CACHE_TTL_MINUTES, RateCache};
use super::currency::CurrencyCode;
use super::rates::{ExchangeRateSnapshot, RateSource};
use super::store::KeyValueStore;

#[derive(Debug, Clone)]
pub struct ConverterSettings {
    pub cache_ttl: Duration,
    pub amount: f64,
    pub from_currency: CurrencyCode,
    pub to_currency: CurrencyCode,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::minutes(DEFAULT_CACHE_TTL_MINUTES as i64),
            amount: 1.0,
            from_currency: "USD".to_string(),
            to_currency: "EUR".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionState {
    pub amount: f64,
    pub from_currency: CurrencyCode,
    pub to_currency: CurrencyCode,
    pub current_rate: Option<f64>,
    pub is_loading: bool,
    pub last_error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl ConversionState {
    fn new(settings: &ConverterSettings) -> Self {
        Self {
            amount: settings.amount,
            from_currency: settings.from_currency.clone(),
            to_currency: settings.to_currency.clone(),
            current_rate: None,
            is_loading: false,
            last_error: None,
            last_updated: None,
        }
    }

    /// `amount * current_rate` rounded to two decimals, or 0 without a rate.
    pub fn converted_amount(&self) -> f64 {
        match self.current_rate {
            Some(rate) => (self.amount * rate * 100.0).round() / 100.0,
            None => 0.0,
        }
    }

    /// Converted amount with two decimals, "0" without a rate.
    pub fn formatted_converted_amount(&self) -> String {
        match self.current_rate {
            Some(_) => format!("{:.2}", self.converted_amount()),
            None => "0".to_string(),
        }
    }
}

pub struct RateConverter {
    source: Arc<dyn RateSource>,
    store: Arc<dyn KeyValueStore>,
    cache: Mutex<RateCache>,
    state: watch::Sender<ConversionState>,
    generation: AtomicU64,
    cache_ttl: Duration,
}

impl RateConverter {
    /// Creates a converter with the cache rehydrated from `store`. No rates
    /// are fetched until [`RateConverter::ensure_rate`] runs.
    pub fn new(
        source: Arc<dyn RateSource>,
        store: Arc<dyn KeyValueStore>,
        settings: ConverterSettings,
    ) -> Self {
        let cache = RateCache::load(store.as_ref());
        let (state, _) = watch::channel(ConversionState::new(&settings));
        Self {
            source,
            store,
            cache: Mutex::new(cache),
            state,
            generation: AtomicU64::new(0),
            cache_ttl: settings.cache_ttl,
        }
    }

    /// Creates a converter and resolves the rate for the configured pair.
    pub async fn start(
        source: Arc<dyn RateSource>,
        store: Arc<dyn KeyValueStore>,
        settings: ConverterSettings,
    ) -> Self {
        let converter = Self::new(source, store, settings);
        converter.refresh().await;
        converter
    }

    pub fn state(&self) -> ConversionState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<ConversionState> {
        self.state.subscribe()
    }

    pub fn converted_amount(&self) -> f64 {
        self.state.borrow().converted_amount()
    }

    pub fn set_amount(&self, amount: f64) -> Result<()> {
        if !amount.is_finite() || amount < 0.0 {
            bail!("Amount must be a non-negative number, got {amount}");
        }
        self.state.send_modify(|s| s.amount = amount);
        Ok(())
    }

    pub async fn set_from_currency(&self, from: &str) {
        let to = self.state.borrow().to_currency.clone();
        self.ensure_rate(from, &to).await;
    }

    pub async fn set_to_currency(&self, to: &str) {
        let from = self.state.borrow().from_currency.clone();
        self.ensure_rate(&from, to).await;
    }

    /// Resolves the rate for the current selection.
    pub async fn refresh(&self) {
        let (from, to) = {
            let state = self.state.borrow();
            (state.from_currency.clone(), state.to_currency.clone())
        };
        self.ensure_rate(&from, &to).await;
    }

    /// Exchanges both currencies in one update, then resolves the new pair.
    pub async fn swap(&self) {
        let (from, to) = {
            let state = self.state.borrow();
            (state.to_currency.clone(), state.from_currency.clone())
        };
        self.ensure_rate(&from, &to).await;
    }

    /// Cached rate table for `base`, regardless of its age.
    pub async fn cached_snapshot(&self, base: &str) -> Option<ExchangeRateSnapshot> {
        let cache = self.cache.lock().await;
        cache.get(base).map(|entry| entry.snapshot.clone())
    }

    /// Selects `from`/`to` and supplies the state with a rate for it, from
    /// a fresh cache entry or else from the rate source.
    ///
    /// Fetch failures end up in `last_error` with the rate cleared; nothing
    /// is returned to the caller.
    #[instrument(name = "EnsureRate", skip(self), fields(from = %from, to = %to))]
    pub async fn ensure_rate(&self, from: &str, to: &str) {
        // No await between stamping the generation and arming the loading guard
        let mut generation = 0;
        let cached = {
            let cache = self.cache.lock().await;
            self.state.send_modify(|s| {
                generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
                s.from_currency = from.to_string();
                s.to_currency = to.to_string();
            });
            cache
                .fresh(from, Utc::now(), self.cache_ttl)
                .map(|entry| entry.snapshot.clone())
        };
        if let Some(snapshot) = cached {
            let rate = snapshot.rate(to);
            if rate.is_none() {
                debug!("Cached table for {} has no rate for {}", from, to);
            }
            self.apply(generation, |s| {
                s.current_rate = rate;
                s.last_updated = Some(snapshot.fetched_at);
                s.last_error = None;
                s.is_loading = false;
            });
            return;
        }

        self.apply(generation, |s| {
            s.current_rate = None;
            s.last_updated = None;
            s.is_loading = true;
            s.last_error = None;
        });
        let _loading = LoadingGuard {
            converter: self,
            generation,
        };

        match self.source.fetch_rates(from).await {
            Ok(snapshot) => {
                let rate = snapshot.rate(to);
                let fetched_at = snapshot.fetched_at;
                self.remember(from, snapshot).await;
                self.apply(generation, |s| {
                    s.current_rate = rate;
                    s.last_updated = Some(fetched_at);
                    s.last_error = None;
                });
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch exchange rates");
                let message = e.to_string();
                self.apply(generation, |s| {
                    s.current_rate = None;
                    s.last_updated = None;
                    s.last_error = Some(message);
                });
            }
        }
    }

    async fn remember(&self, base: &str, mut snapshot: ExchangeRateSnapshot) {
        snapshot.base = base.to_string();
        let mut cache = self.cache.lock().await;
        cache.insert(snapshot, Utc::now());
        if let Err(e) = cache.persist(self.store.as_ref()) {
            warn!(error = %e, "Rates cached in memory only");
        }
    }

    /// Runs `update` only if `generation` is still the latest issued. The
    /// check happens under the channel's write lock.
    fn apply(&self, generation: u64, update: impl FnOnce(&mut ConversionState)) -> bool {
        self.state.send_if_modified(|s| {
            if self.generation.load(Ordering::SeqCst) != generation {
                debug!(generation, "Discarding superseded rate result");
                return false;
            }
            update(s);
            true
        })
    }
}

/// Clears the loading flag when a fetch ends, however it ends.
struct LoadingGuard<'a> {
    converter: &'a RateConverter,
    generation: u64,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.converter.apply(self.generation, |s| s.is_loading = false);
    }
}
