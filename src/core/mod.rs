//! Core business logic abstractions

pub mod cache;
pub mod config;
pub mod converter;
pub mod currency;
pub mod history;
pub mod log;
pub mod rates;
pub mod store;

// Re-export main types for cleaner imports
pub use cache::{CacheEntry, RateCache};
pub use converter::{ConversionState, ConverterSettings, RateConverter};
pub use currency::{Currency, CurrencyCode};
pub use history::{ConversionRecord, HistoryStore};
pub use rates::{ExchangeRateSnapshot, RateError, RateSource};
pub use store::KeyValueStore;
