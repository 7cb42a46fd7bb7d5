use super::ui;
use crate::core::currency::{CURRENCIES, Currency};
use comfy_table::Cell;

fn display_currencies(currencies: &[Currency]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Code"), ui::header_cell("Currency")]);
    for currency in currencies {
        table.add_row(vec![Cell::new(currency.code), Cell::new(currency.name)]);
    }
    table.to_string()
}

pub fn run() {
    println!("{}", display_currencies(CURRENCIES));
}
