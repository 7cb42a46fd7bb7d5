//! Exchange rate abstractions and core types

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use super::currency::CurrencyCode;

/// One full rate table for a base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateSnapshot {
    pub base: CurrencyCode,
    pub rates: HashMap<CurrencyCode, f64>,
    /// Update time reported by the rate provider.
    pub fetched_at: DateTime<Utc>,
}

impl ExchangeRateSnapshot {
    /// Rate from `base` to `to`, if the table has it.
    pub fn rate(&self, to: &str) -> Option<f64> {
        self.rates.get(to).copied()
    }
}

#[derive(Debug, Error)]
pub enum RateError {
    #[error("Request error for base currency {base}: {source}")]
    Network {
        base: CurrencyCode,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP error: {status} for base currency {base}")]
    Status { base: CurrencyCode, status: u16 },
    #[error("Rate provider rejected base currency {base}: {}", .reason.as_deref().unwrap_or("unknown error"))]
    Api {
        base: CurrencyCode,
        reason: Option<String>,
    },
    #[error("Failed to parse rate response for {base}: {message}")]
    Malformed { base: CurrencyCode, message: String },
}

#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetches the full rate table for `base`.
    async fn fetch_rates(&self, base: &str) -> Result<ExchangeRateSnapshot, RateError>;
}
