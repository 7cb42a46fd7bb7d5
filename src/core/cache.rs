//! Time-boxed cache of rate tables keyed by base currency

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use super::currency::CurrencyCode;
use super::rates::ExchangeRateSnapshot;
use super::store::KeyValueStore;

/// Store key holding the serialized rate cache.
pub const CACHE_KEY: &str = "currencyExchangeRatesCache";

/// Default time-to-live for cached rate tables, in minutes (4 hours).
pub const DEFAULT_CACHE_TTL_MINUTES: u64 = 240;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub snapshot: ExchangeRateSnapshot,
    /// Client receipt time, used for expiry.
    pub cached_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.cached_at
    }

    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.age(now) < ttl
    }
}

/// Rate tables for every base currency fetched so far.
///
/// Entries are only ever inserted or overwritten. Expired entries stay in
/// place and are ignored by [`RateCache::fresh`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateCache {
    entries: HashMap<CurrencyCode, CacheEntry>,
}

impl RateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrates the cache from the store.
    ///
    /// A stored value that fails to parse is removed and an empty cache is
    /// returned. Store failures are logged and also yield an empty cache.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let stored = match store.get(CACHE_KEY) {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                debug!("No stored rate cache");
                return Self::new();
            }
            Err(e) => {
                warn!(error = %e, "Failed to read stored rate cache");
                return Self::new();
            }
        };

        match serde_json::from_str::<RateCache>(&stored) {
            Ok(cache) => {
                debug!(entries = cache.len(), "Rehydrated rate cache");
                cache
            }
            Err(e) => {
                warn!(error = %e, "Discarding unreadable rate cache");
                if let Err(e) = store.remove(CACHE_KEY) {
                    warn!(error = %e, "Failed to remove unreadable rate cache");
                }
                Self::new()
            }
        }
    }

    /// Writes the whole cache to the store.
    pub fn persist(&self, store: &dyn KeyValueStore) -> Result<()> {
        let json = serde_json::to_string(self).context("Failed to serialize rate cache")?;
        store
            .set(CACHE_KEY, &json)
            .context("Failed to persist rate cache")
    }

    pub fn get(&self, base: &str) -> Option<&CacheEntry> {
        self.entries.get(base)
    }

    /// Entry for `base` if it was cached less than `ttl` before `now`.
    pub fn fresh(&self, base: &str, now: DateTime<Utc>, ttl: Duration) -> Option<&CacheEntry> {
        match self.entries.get(base) {
            Some(entry) if entry.is_fresh(now, ttl) => {
                debug!(
                    "Cache HIT for {} (age: {} min)",
                    base,
                    entry.age(now).num_minutes()
                );
                Some(entry)
            }
            Some(_) => {
                debug!("Cache entry expired for {}", base);
                None
            }
            None => {
                debug!("Cache MISS for {}", base);
                None
            }
        }
    }

    /// Stores `snapshot` under its base currency, replacing any older entry.
    pub fn insert(&mut self, snapshot: ExchangeRateSnapshot, cached_at: DateTime<Utc>) {
        debug!("Cache PUT for {}", snapshot.base);
        self.entries.insert(
            snapshot.base.clone(),
            CacheEntry {
                snapshot,
                cached_at,
            },
        );
    }

    pub fn bases(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
