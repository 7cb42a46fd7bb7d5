//! Conversion history persisted in the key-value store

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use super::currency::CurrencyCode;
use super::store::KeyValueStore;

/// Store key holding the serialized history.
pub const HISTORY_KEY: &str = "conversionHistory";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRecord {
    /// Creation time in milliseconds, unique within the history.
    pub id: i64,
    pub amount: f64,
    pub from_currency: CurrencyCode,
    pub to_currency: CurrencyCode,
    pub converted_amount: String,
}

/// Newest-first list of conversions. Every mutation is written back to the
/// store.
pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    records: Vec<ConversionRecord>,
}

impl HistoryStore {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let records = match store.get(HISTORY_KEY) {
            Ok(Some(stored)) => match serde_json::from_str(&stored) {
                Ok(records) => records,
                Err(e) => {
                    warn!(error = %e, "Failed to parse stored history, discarding it");
                    if let Err(e) = store.remove(HISTORY_KEY) {
                        warn!(error = %e, "Failed to remove unreadable history");
                    }
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read stored history");
                Vec::new()
            }
        };
        debug!(records = records.len(), "Loaded conversion history");
        Self { store, records }
    }

    pub fn records(&self) -> &[ConversionRecord] {
        &self.records
    }

    pub fn add_record(
        &mut self,
        amount: f64,
        from_currency: &str,
        to_currency: &str,
        converted_amount: &str,
    ) -> Result<ConversionRecord> {
        let mut id = Utc::now().timestamp_millis();
        if let Some(newest) = self.records.iter().map(|r| r.id).max() {
            id = id.max(newest + 1);
        }

        let record = ConversionRecord {
            id,
            amount,
            from_currency: from_currency.to_string(),
            to_currency: to_currency.to_string(),
            converted_amount: converted_amount.to_string(),
        };
        self.records.insert(0, record.clone());
        self.save()?;
        Ok(record)
    }

    /// Removes the record with `id`, returning whether one was found.
    pub fn remove_record(&mut self, id: i64) -> Result<bool> {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        if self.records.len() == before {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.records.clear();
        self.save()
    }

    fn save(&self) -> Result<()> {
        let json =
            serde_json::to_string(&self.records).context("Failed to serialize history")?;
        self.store
            .set(HISTORY_KEY, &json)
            .context("Failed to persist history")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_add_record_prepends_and_persists() -> Result<()> {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut history = HistoryStore::load(store.clone());

        let first = history.add_record(1.0, "USD", "EUR", "0.92")?;
        let second = history.add_record(2.0, "GBP", "EUR", "2.30")?;

        assert!(second.id > first.id);
        assert_eq!(history.records()[0], second);
        assert_eq!(history.records()[1], first);

        let reloaded = HistoryStore::load(store);
        assert_eq!(reloaded.records(), history.records());
        Ok(())
    }

    #[test]
    fn test_stored_format_uses_camel_case() -> Result<()> {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut history = HistoryStore::load(store.clone());
        history.add_record(1.0, "USD", "EUR", "0.92")?;

        let stored = store.get(HISTORY_KEY)?.unwrap();
        assert!(stored.contains("\"fromCurrency\":\"USD\""));
        assert!(stored.contains("\"convertedAmount\":\"0.92\""));
        Ok(())
    }

    #[test]
    fn test_remove_record() -> Result<()> {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut history = HistoryStore::load(store.clone());
        let record = history.add_record(1.0, "USD", "EUR", "0.92")?;

        assert!(!history.remove_record(record.id + 1000)?);
        assert!(history.remove_record(record.id)?);
        assert!(history.records().is_empty());
        assert!(HistoryStore::load(store).records().is_empty());
        Ok(())
    }

    #[test]
    fn test_clear() -> Result<()> {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut history = HistoryStore::load(store.clone());
        history.add_record(1.0, "USD", "EUR", "0.92")?;
        history.add_record(5.0, "EUR", "USD", "5.44")?;

        history.clear()?;
        assert!(history.records().is_empty());
        assert_eq!(store.get(HISTORY_KEY)?.as_deref(), Some("[]"));
        Ok(())
    }

    #[test]
    fn test_corrupted_history_is_discarded() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store.set(HISTORY_KEY, "[{broken").unwrap();

        let history = HistoryStore::load(store.clone());
        assert!(history.records().is_empty());
        assert!(store.get(HISTORY_KEY).unwrap().is_none());
    }
}
