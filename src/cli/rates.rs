//! `rates` command: official fiat rates and the top-rates strip.

use anyhow::Result;
use chrono::Local;

use crate::cli::ui::{self, StyleType};
use crate::core::config::AppConfig;
use crate::core::metadata;
use crate::core::pivot::SETTLEMENT;
use crate::core::rate::Rate;
use crate::service::RateService;

pub async fn run(config: &AppConfig) -> Result<()> {
    let service = RateService::from_config(config)?;
    service.refresh().await?;

    println!("{}", ui::style_text("Top rates", StyleType::Title));
    print_rates_table(&service.top_rates());

    println!("{}", ui::style_text("Official rates", StyleType::Title));
    print_rates_table(&service.fiat_rates());

    if !service.change_available() {
        println!(
            "{}",
            ui::style_text(
                "Previous-day rates unavailable; day changes not shown",
                StyleType::Subtle
            )
        );
    }
    if let Some(updated) = service.updated_at() {
        let local = updated.with_timezone(&Local);
        println!(
            "{}",
            ui::style_text(
                &format!("Updated {}", local.format("%Y-%m-%d %H:%M:%S")),
                StyleType::Subtle
            )
        );
    }
    Ok(())
}

fn print_rates_table(rates: &[Rate]) {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell(""),
        ui::header_cell("Code"),
        ui::header_cell("Name"),
        ui::header_cell(&format!("{SETTLEMENT} per unit")),
        ui::header_cell("Day"),
    ]);
    for rate in rates {
        let name = metadata::fiat_name(&rate.currency).unwrap_or(&rate.currency);
        table.add_row(vec![
            comfy_table::Cell::new(&rate.flag),
            comfy_table::Cell::new(&rate.currency),
            comfy_table::Cell::new(name),
            ui::value_cell(rate.value, 4),
            ui::change_cell(rate.change),
        ]);
    }
    println!("{table}\n");
}
