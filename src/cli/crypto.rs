//! `crypto` command: top assets by market cap, priced in USD.

use anyhow::Result;

use crate::cli::ui::{self, StyleType};
use crate::core::config::AppConfig;
use crate::core::metadata;
use crate::service::RateService;

pub async fn run(config: &AppConfig) -> Result<()> {
    let service = RateService::from_config(config)?;
    service.refresh().await?;

    let rates = service.crypto_rates();
    if rates.is_empty() {
        println!(
            "{}",
            ui::style_text("Crypto rates are unavailable right now", StyleType::Subtle)
        );
        return Ok(());
    }

    println!("{}", ui::style_text("Top crypto", StyleType::Title));
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Symbol"),
        ui::header_cell("Name"),
        ui::header_cell("USD"),
        ui::header_cell("24h"),
    ]);
    for rate in &rates {
        let name = metadata::crypto_name(&rate.currency).unwrap_or(&rate.currency);
        table.add_row(vec![
            comfy_table::Cell::new(&rate.currency),
            comfy_table::Cell::new(name),
            ui::value_cell(rate.value, 2),
            ui::change_cell(rate.change),
        ]);
    }
    println!("{table}");
    Ok(())
}
