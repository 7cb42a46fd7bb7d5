pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::cli::convert::ConvertOptions;
use crate::cli::history::HistoryAction;
use crate::core::cache::CACHE_KEY;
use crate::core::config::AppConfig;
use crate::core::{KeyValueStore, RateSource, currency};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Convert(ConvertOptions),
    Rates { base: Option<String> },
    Currencies,
    History(HistoryAction),
    ClearCache,
}

fn open_store(config: &AppConfig) -> Arc<dyn KeyValueStore> {
    let data_path = config.default_data_path().ok();
    store::open(data_path.as_deref())
}

fn rate_source(config: &AppConfig) -> Arc<dyn RateSource> {
    let api = config.exchangerate_api();
    Arc::new(providers::ExchangeRateApiProvider::new(
        &api.base_url,
        api.retries,
    ))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("xrate starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Convert(options) => {
            cli::convert::run(
                rate_source(&config),
                open_store(&config),
                config.converter_settings()?,
                options,
            )
            .await
        }
        AppCommand::Rates { base } => {
            let settings = config.converter_settings()?;
            let base = base.map_or_else(
                || settings.from_currency.clone(),
                |b| currency::normalize(&b),
            );
            cli::rates::run(
                rate_source(&config),
                open_store(&config),
                settings,
                &base,
            )
            .await
        }
        AppCommand::Currencies => {
            cli::currencies::run();
            Ok(())
        }
        AppCommand::History(action) => cli::history::run(open_store(&config), action),
        AppCommand::ClearCache => {
            open_store(&config)
                .remove(CACHE_KEY)
                .context("Failed to clear rate cache")?;
            println!("Rate cache cleared");
            Ok(())
        }
    }
}
