use anyhow::{Context, Result};
use chrono::Duration;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

use super::cache::DEFAULT_CACHE_TTL_MINUTES;
use super::converter::ConverterSettings;

pub const DEFAULT_EXCHANGERATE_API_URL: &str =
    "https://v6.exchangerate-api.com/v6/YOUR-API-KEY/latest";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExchangeRateApiConfig {
    /// Prefix that the base currency code is appended to.
    pub base_url: String,
    #[serde(default = "default_retries")]
    pub retries: usize,
}

fn default_retries() -> usize {
    2
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub exchangerate_api: Option<ExchangeRateApiConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            exchangerate_api: Some(ExchangeRateApiConfig {
                base_url: DEFAULT_EXCHANGERATE_API_URL.to_string(),
                retries: default_retries(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_from_currency")]
    pub from_currency: String,
    #[serde(default = "default_to_currency")]
    pub to_currency: String,
    #[serde(default = "default_cache_ttl_minutes")]
    pub cache_ttl_minutes: u64,
    pub data_path: Option<String>,
}

fn default_from_currency() -> String {
    "USD".to_string()
}

fn default_to_currency() -> String {
    "EUR".to_string()
}

fn default_cache_ttl_minutes() -> u64 {
    DEFAULT_CACHE_TTL_MINUTES
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            from_currency: default_from_currency(),
            to_currency: default_to_currency(),
            cache_ttl_minutes: default_cache_ttl_minutes(),
            data_path: None,
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, or the built-in defaults
    /// when no config file exists yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "codito", "xrate")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("in", "codito", "xrate")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn exchangerate_api(&self) -> ExchangeRateApiConfig {
        self.providers
            .exchangerate_api
            .clone()
            .unwrap_or_else(|| ExchangeRateApiConfig {
                base_url: DEFAULT_EXCHANGERATE_API_URL.to_string(),
                retries: default_retries(),
            })
    }

    pub fn converter_settings(&self) -> Result<ConverterSettings> {
        let cache_ttl = i64::try_from(self.cache_ttl_minutes)
            .ok()
            .and_then(Duration::try_minutes)
            .context("cache_ttl_minutes out of range")?;
        Ok(ConverterSettings {
            cache_ttl,
            amount: 1.0,
            from_currency: self.from_currency.to_ascii_uppercase(),
            to_currency: self.to_currency.to_ascii_uppercase(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
providers:
  exchangerate_api:
    base_url: "http://example.com/v6/key/latest"
    retries: 0
from_currency: "gbp"
to_currency: "JPY"
cache_ttl_minutes: 60
data_path: "/tmp/xrate"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        let api = config.exchangerate_api();
        assert_eq!(api.base_url, "http://example.com/v6/key/latest");
        assert_eq!(api.retries, 0);
        assert_eq!(config.cache_ttl_minutes, 60);
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/xrate")
        );

        let settings = config.converter_settings().unwrap();
        assert_eq!(settings.from_currency, "GBP");
        assert_eq!(settings.to_currency, "JPY");
        assert_eq!(settings.cache_ttl, Duration::hours(1));
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str("data_path: ~").unwrap();
        assert_eq!(config.from_currency, "USD");
        assert_eq!(config.to_currency, "EUR");
        assert_eq!(config.cache_ttl_minutes, 240);
        assert_eq!(config.exchangerate_api().retries, 2);
        assert_eq!(
            config.exchangerate_api().base_url,
            DEFAULT_EXCHANGERATE_API_URL
        );
    }

    #[test]
    fn test_converter_settings_rejects_huge_ttl() {
        let config: AppConfig =
            serde_yaml::from_str("cache_ttl_minutes: 1000000000000000").unwrap();
        let err = config.converter_settings().unwrap_err();
        assert!(err.to_string().contains("cache_ttl_minutes out of range"), "{err}");

        let config: AppConfig =
            serde_yaml::from_str("cache_ttl_minutes: 18446744073709551615").unwrap();
        assert!(config.converter_settings().is_err());
    }

    #[test]
    fn test_provider_retries_default() {
        let yaml_str = r#"
providers:
  exchangerate_api:
    base_url: "http://example.com"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert_eq!(config.exchangerate_api().retries, 2);
    }

    #[test]
    fn test_load_from_path_reports_missing_file() {
        let err = AppConfig::load_from_path("/nonexistent/xrate/config.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
