use super::ui;
use crate::core::currency::display_name;
use crate::core::{ConverterSettings, ExchangeRateSnapshot, KeyValueStore, RateConverter, RateSource};
use anyhow::{Context, Result, bail};
use comfy_table::Cell;
use std::sync::Arc;

fn display_rates(snapshot: &ExchangeRateSnapshot) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Code"),
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Rate (1 {})", snapshot.base)),
    ]);

    let mut rates: Vec<_> = snapshot.rates.iter().collect();
    rates.sort_by(|a, b| a.0.cmp(b.0));
    for (code, rate) in rates {
        table.add_row(vec![
            Cell::new(code),
            Cell::new(display_name(code)),
            ui::number_cell(format!("{rate:.4}")),
        ]);
    }

    format!(
        "Rates for: {}\n{}\n\n{}",
        ui::style_text(&snapshot.base, ui::StyleType::Title),
        ui::style_text(
            &format!(
                "Last updated {}",
                snapshot.fetched_at.format("%Y-%m-%d %H:%M UTC")
            ),
            ui::StyleType::Subtle
        ),
        table
    )
}

pub async fn run(
    source: Arc<dyn RateSource>,
    store: Arc<dyn KeyValueStore>,
    mut settings: ConverterSettings,
    base: &str,
) -> Result<()> {
    settings.from_currency = base.to_string();

    let pb = ui::new_spinner("Fetching exchange rates...");
    let converter = RateConverter::start(source, store, settings).await;
    pb.finish_and_clear();

    if let Some(error) = converter.state().last_error {
        bail!("{error}");
    }

    let snapshot = converter
        .cached_snapshot(base)
        .await
        .with_context(|| format!("No rates available for {base}"))?;
    println!("{}", display_rates(&snapshot));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;

    #[test]
    fn test_display_rates_sorted_with_names() {
        let snapshot = ExchangeRateSnapshot {
            base: "USD".to_string(),
            rates: HashMap::from([
                ("JPY".to_string(), 151.2),
                ("EUR".to_string(), 0.92),
                ("XAU".to_string(), 0.0004),
            ]),
            fetched_at: Utc::now(),
        };

        let output = display_rates(&snapshot);
        let eur = output.find("Euro").unwrap();
        let jpy = output.find("Japanese Yen").unwrap();
        assert!(eur < jpy);
        assert!(output.contains("151.2000"));
        assert!(output.contains("XAU"));
    }
}
