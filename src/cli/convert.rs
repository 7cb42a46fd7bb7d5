use super::ui;
use crate::core::currency::{self, display_name};
use crate::core::{
    ConversionState, ConverterSettings, HistoryStore, KeyValueStore, RateConverter, RateSource,
};
use anyhow::{Result, bail};
use comfy_table::Cell;
use std::sync::Arc;
use tracing::info;

pub struct ConvertOptions {
    pub amount: f64,
    pub from: Option<String>,
    pub to: Option<String>,
    pub swap: bool,
    pub save_history: bool,
}

impl ConversionState {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Currency"),
            ui::header_cell("Name"),
            ui::header_cell("Amount"),
        ]);

        table.add_row(vec![
            Cell::new(&self.from_currency),
            Cell::new(display_name(&self.from_currency)),
            ui::number_cell(format!("{:.2}", self.amount)),
        ]);
        let converted = self.current_rate.map(|_| self.formatted_converted_amount());
        table.add_row(vec![
            Cell::new(&self.to_currency),
            Cell::new(display_name(&self.to_currency)),
            ui::format_optional_cell(converted, |c| c),
        ]);

        let mut output = format!(
            "Conversion: {}\n\n",
            ui::style_text(
                &format!("{} → {}", self.from_currency, self.to_currency),
                ui::StyleType::Title
            )
        );
        output.push_str(&table.to_string());

        let rate = self.current_rate.map_or("N/A".to_string(), |r| {
            format!("1 {} = {r:.4} {}", self.from_currency, self.to_currency)
        });
        output.push_str(&format!(
            "\n\n{} {}",
            ui::style_text("Rate:", ui::StyleType::Label),
            ui::style_text(&rate, ui::StyleType::Value)
        ));
        if let Some(updated) = self.last_updated {
            output.push_str(&format!(
                "\n{}",
                ui::style_text(
                    &format!("Last updated {}", updated.format("%Y-%m-%d %H:%M UTC")),
                    ui::StyleType::Subtle
                )
            ));
        }
        output
    }
}

pub async fn run(
    source: Arc<dyn RateSource>,
    store: Arc<dyn KeyValueStore>,
    mut settings: ConverterSettings,
    options: ConvertOptions,
) -> Result<()> {
    if let Some(from) = &options.from {
        settings.from_currency = currency::normalize(from);
    }
    if let Some(to) = &options.to {
        settings.to_currency = currency::normalize(to);
    }

    let converter = RateConverter::new(source, store.clone(), settings);
    converter.set_amount(options.amount)?;

    let pb = ui::new_spinner("Fetching exchange rates...");
    if options.swap {
        converter.swap().await;
    } else {
        converter.refresh().await;
    }
    pb.finish_and_clear();

    let state = converter.state();
    if let Some(error) = &state.last_error {
        bail!("{error}");
    }

    println!("{}", state.display_as_table());

    if state.current_rate.is_none() {
        bail!(
            "No exchange rate from {} to {}",
            state.from_currency,
            state.to_currency
        );
    }

    if options.save_history {
        let mut history = HistoryStore::load(store);
        let record = history.add_record(
            state.amount,
            &state.from_currency,
            &state.to_currency,
            &state.formatted_converted_amount(),
        )?;
        info!(id = record.id, "Saved conversion to history");
    }

    Ok(())
}
