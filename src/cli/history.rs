use super::ui;
use crate::core::{ConversionRecord, HistoryStore, KeyValueStore};
use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use comfy_table::Cell;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryAction {
    List,
    Remove(i64),
    Clear,
}

fn display_history(records: &[ConversionRecord]) -> String {
    if records.is_empty() {
        return ui::style_text("No conversions yet.", ui::StyleType::Subtle);
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Id"),
        ui::header_cell("Date"),
        ui::header_cell("Amount"),
        ui::header_cell("Converted"),
    ]);
    for record in records {
        let date = DateTime::<Utc>::from_timestamp_millis(record.id)
            .map_or("N/A".to_string(), |d| d.format("%Y-%m-%d %H:%M").to_string());
        table.add_row(vec![
            Cell::new(record.id),
            Cell::new(date),
            ui::number_cell(format!("{:.2} {}", record.amount, record.from_currency)),
            ui::number_cell(format!("{} {}", record.converted_amount, record.to_currency)),
        ]);
    }
    table.to_string()
}

pub fn run(store: Arc<dyn KeyValueStore>, action: HistoryAction) -> Result<()> {
    let mut history = HistoryStore::load(store);
    match action {
        HistoryAction::List => println!("{}", display_history(history.records())),
        HistoryAction::Remove(id) => {
            if !history.remove_record(id)? {
                bail!("No history record with id {id}");
            }
            println!("Removed history record {id}");
        }
        HistoryAction::Clear => {
            history.clear()?;
            println!("History cleared");
        }
    }
    Ok(())
}
