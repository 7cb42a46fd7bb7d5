use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use xrate::cli::convert::ConvertOptions;
use xrate::cli::history::HistoryAction;

// Mock rate provider helpers
mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const USD_RATES: &str = r#"{
        "result": "success",
        "base_code": "USD",
        "time_last_update_utc": "Fri, 01 Mar 2024 00:00:01 +0000",
        "conversion_rates": { "USD": 1, "EUR": 0.92, "GBP": 0.79 }
    }"#;

    pub async fn create_mock_server(
        base: &str,
        status: u16,
        mock_response: &str,
        expected_calls: impl Into<wiremock::Times>,
    ) -> MockServer {
        let mock_server = MockServer::start().await;
        let url_path = format!("/latest/{base}");

        Mock::given(method("GET"))
            .and(path(&url_path))
            .respond_with(ResponseTemplate::new(status).set_body_string(mock_response))
            .expect(expected_calls)
            .mount(&mock_server)
            .await;

        mock_server
    }
}

fn write_config(dir: &TempDir, base_url: &str) -> String {
    let config_path = dir.path().join("config.yaml");
    let config_content = format!(
        r#"
        providers:
          exchangerate_api:
            base_url: "{}/latest"
            retries: 0
        from_currency: "USD"
        to_currency: "EUR"
        cache_ttl_minutes: 240
        data_path: "{}"
    "#,
        base_url,
        dir.path().join("data").display()
    );
    fs::write(&config_path, config_content).expect("Failed to write config file");
    config_path.to_string_lossy().to_string()
}

fn convert(amount: f64) -> xrate::AppCommand {
    xrate::AppCommand::Convert(ConvertOptions {
        amount,
        from: None,
        to: None,
        swap: false,
        save_history: true,
    })
}

#[test_log::test(tokio::test)]
async fn test_full_convert_flow_with_mock() {
    // The rates command may be served from the persisted cache
    let mock_server =
        test_utils::create_mock_server("USD", 200, test_utils::USD_RATES, 1..=2).await;
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(&dir, &mock_server.uri());

    let result = xrate::run_command(convert(25.0), Some(&config_path)).await;
    assert!(
        result.is_ok(),
        "Convert command failed with: {:?}",
        result.err()
    );

    let result = xrate::run_command(
        xrate::AppCommand::Rates {
            base: Some("usd".to_string()),
        },
        Some(&config_path),
    )
    .await;
    assert!(result.is_ok(), "Rates command failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_convert_reports_provider_error() {
    let mock_response = r#"{"result": "error", "error-type": "invalid-key"}"#;
    let mock_server = test_utils::create_mock_server("USD", 403, mock_response, 1).await;
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(&dir, &mock_server.uri());

    let result = xrate::run_command(convert(1.0), Some(&config_path)).await;
    let err = result.expect_err("Convert should fail on provider error");
    assert!(err.to_string().contains("invalid-key"), "{err}");
}

#[test_log::test(tokio::test)]
async fn test_history_commands() {
    let mock_server = test_utils::create_mock_server("USD", 200, test_utils::USD_RATES, 1).await;
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(&dir, &mock_server.uri());

    xrate::run_command(convert(10.0), Some(&config_path))
        .await
        .expect("Convert failed");
    xrate::run_command(
        xrate::AppCommand::History(HistoryAction::List),
        Some(&config_path),
    )
    .await
    .expect("History list failed");
    xrate::run_command(
        xrate::AppCommand::History(HistoryAction::Clear),
        Some(&config_path),
    )
    .await
    .expect("History clear failed");

    let result = xrate::run_command(
        xrate::AppCommand::History(HistoryAction::Remove(1)),
        Some(&config_path),
    )
    .await;
    assert!(result.is_err());
}

#[test_log::test(tokio::test)]
async fn test_converter_with_http_provider_and_memory_store() {
    use xrate::core::{ConverterSettings, RateConverter};
    use xrate::providers::ExchangeRateApiProvider;
    use xrate::store::MemoryStore;

    let mock_server = test_utils::create_mock_server("USD", 200, test_utils::USD_RATES, 1).await;
    let source = Arc::new(ExchangeRateApiProvider::new(
        &format!("{}/latest", mock_server.uri()),
        0,
    ));
    let store = Arc::new(MemoryStore::new());

    let converter =
        RateConverter::start(source.clone(), store.clone(), ConverterSettings::default()).await;
    converter.set_amount(100.0).unwrap();
    assert_eq!(converter.state().formatted_converted_amount(), "92.00");

    // Changing the target keeps using the cached USD table
    converter.set_to_currency("GBP").await;
    assert_eq!(converter.state().current_rate, Some(0.79));

    // A new converter over the same store is rehydrated without a fetch
    let rehydrated = RateConverter::start(source, store, ConverterSettings::default()).await;
    assert_eq!(rehydrated.state().current_rate, Some(0.92));
}

#[test_log::test(tokio::test)]
async fn test_currencies_without_config_file_contents() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = dir.path().join("config.yaml");
    fs::write(&config_path, "data_path: ~\n").expect("Failed to write config file");

    let result = xrate::run_command(
        xrate::AppCommand::Currencies,
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok());
}

#[test_log::test(tokio::test)]
async fn test_convert_rejects_out_of_range_cache_ttl() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = dir.path().join("config.yaml");
    fs::write(&config_path, "cache_ttl_minutes: 1000000000000000\n")
        .expect("Failed to write config file");

    let result = xrate::run_command(convert(1.0), Some(config_path.to_str().unwrap())).await;
    let err = result.expect_err("Convert should fail on a bad cache ttl");
    assert!(err.to_string().contains("cache_ttl_minutes"), "{err}");
}
