//! `history` command: list, prune or clear recent conversions.

use anyhow::Result;
use chrono::Local;

use crate::cli::ui::{self, StyleType};
use crate::core::config::AppConfig;
use crate::store;

pub fn run(config: &AppConfig, remove: Option<usize>, clear: bool) -> Result<()> {
    let history = store::open_history(config)?;

    if clear {
        history.clear()?;
        println!("{}", ui::style_text("History cleared", StyleType::Subtle));
        return Ok(());
    }
    if let Some(index) = remove {
        history.remove(index)?;
    }

    let records = history.load();
    if records.is_empty() {
        println!(
            "{}",
            ui::style_text("No conversions yet — run `kursy convert`", StyleType::Subtle)
        );
        return Ok(());
    }

    println!("{}", ui::style_text("Recent conversions", StyleType::Title));
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("#"),
        ui::header_cell("Pair"),
        ui::header_cell("Amount"),
        ui::header_cell("Result"),
        ui::header_cell("Rate"),
        ui::header_cell("When"),
    ]);
    for (index, record) in records.iter().enumerate() {
        let pair = format!(
            "{} {} → {} {}",
            record.base_flag, record.base_code, record.quote_flag, record.quote_code
        );
        let when = record
            .timestamp
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M");
        table.add_row(vec![
            comfy_table::Cell::new(index),
            comfy_table::Cell::new(pair),
            ui::value_cell(record.amount_base, 2),
            ui::value_cell(record.amount_quote, 2),
            ui::value_cell(record.rate, 4),
            comfy_table::Cell::new(when),
        ]);
    }
    println!("{table}");
    Ok(())
}
