use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::rates::{ExchangeRateSnapshot, RateError, RateSource};
use crate::providers::util::with_retry;

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Rate source for the exchangerate-api.com v6 `latest` endpoint.
pub struct ExchangeRateApiProvider {
    base_url: String,
    retries: usize,
    retry_delay_ms: u64,
}

impl ExchangeRateApiProvider {
    /// `base_url` is the endpoint prefix the base currency is appended to,
    /// e.g. `https://v6.exchangerate-api.com/v6/<key>/latest`.
    pub fn new(base_url: &str, retries: usize) -> Self {
        ExchangeRateApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            retries,
            retry_delay_ms: 500,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    result: String,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    #[serde(default)]
    conversion_rates: Option<HashMap<String, f64>>,
    time_last_update_utc: Option<String>,
}

fn parse_update_time(base: &str, value: Option<&str>) -> DateTime<Utc> {
    value
        .and_then(|v| DateTime::parse_from_rfc2822(v).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| {
            debug!(
                "Could not parse update time for {}: {:?}. Falling back to current time.",
                base, value
            );
            Utc::now()
        })
}

#[async_trait]
impl RateSource for ExchangeRateApiProvider {
    #[instrument(
        name = "ExchangeRateApiFetch",
        skip(self),
        fields(base = %base)
    )]
    async fn fetch_rates(&self, base: &str) -> Result<ExchangeRateSnapshot, RateError> {
        let url = format!("{}/{}", self.base_url, base);
        debug!("Requesting exchange rates from {}", url);

        let network = |source| RateError::Network {
            base: base.to_string(),
            source,
        };

        let client = reqwest::Client::builder()
            .user_agent("xrate/1.0")
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(network)?;
        let response = with_retry(
            || async { client.get(&url).send().await },
            self.retries,
            self.retry_delay_ms,
        )
        .await
        .map_err(network)?;

        let status = response.status();
        debug!(%status, "Received exchange rate response");
        let text = response.text().await.map_err(network)?;

        let data: LatestRatesResponse = match serde_json::from_str(&text) {
            Ok(data) => data,
            Err(_) if !status.is_success() => {
                return Err(RateError::Status {
                    base: base.to_string(),
                    status: status.as_u16(),
                });
            }
            Err(e) => {
                return Err(RateError::Malformed {
                    base: base.to_string(),
                    message: e.to_string(),
                });
            }
        };

        if data.result != "success" {
            return Err(RateError::Api {
                base: base.to_string(),
                reason: data.error_type,
            });
        }
        if !status.is_success() {
            return Err(RateError::Status {
                base: base.to_string(),
                status: status.as_u16(),
            });
        }

        let rates = data.conversion_rates.ok_or_else(|| RateError::Malformed {
            base: base.to_string(),
            message: "missing conversion_rates".to_string(),
        })?;
        let fetched_at = parse_update_time(base, data.time_last_update_utc.as_deref());
        debug!(rates = rates.len(), "Parsed exchange rates for {}", base);

        Ok(ExchangeRateSnapshot {
            base: base.to_string(),
            rates,
            fetched_at,
        })
    }
}
