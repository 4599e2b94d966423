//! `convert` command: one conversion through the pivot table, recorded in
//! the history.

use anyhow::{Context, Result};
use chrono::Utc;
use rust_decimal::Decimal;

use crate::cli::ui::{self, StyleType};
use crate::core::config::AppConfig;
use crate::core::convert::{ConverterPreview, parse_amount};
use crate::core::history::ConversionRecord;
use crate::service::RateService;
use crate::store;

pub async fn run(config: &AppConfig, amount: &str, from: &str, to: &str) -> Result<()> {
    let amount = parse_amount(amount)
        .with_context(|| format!("'{amount}' is not a valid amount"))?;
    let from = from.to_uppercase();
    let to = to.to_uppercase();

    let service = RateService::from_config(config)?;
    service.refresh().await?;

    let Some(rate) = service.exchange_rate(&from, &to) else {
        println!(
            "{}",
            ui::style_text(
                &format!("No rate available for {from} → {to}"),
                StyleType::Error
            )
        );
        return Ok(());
    };

    let mut preview = ConverterPreview::new(amount, rate.clone());
    println!(
        "{} {} {} = {} {} {}",
        ui::format_value(preview.amount_base(), 2),
        rate.base.flag,
        rate.base.code,
        ui::format_value(preview.amount_quote(), 2),
        rate.quote.flag,
        rate.quote.code,
    );

    let forward = format!(
        "1 {} = {} {}",
        rate.base.code,
        ui::format_value(rate.rate, 4),
        rate.quote.code
    );
    preview.swap();
    let backward = format!(
        "1 {} = {} {}",
        preview.rate().base.code,
        ui::format_value(preview.rate().rate, 4),
        preview.rate().quote.code
    );
    println!("{}", ui::style_text(&format!("{forward}  ·  {backward}"), StyleType::Subtle));

    // Only completed conversions with a real amount enter the history.
    if amount > Decimal::ZERO {
        let history = store::open_history(config)?;
        history.add(ConversionRecord {
            base_code: rate.base.code.clone(),
            base_flag: rate.base.flag.clone(),
            quote_code: rate.quote.code.clone(),
            quote_flag: rate.quote.flag.clone(),
            amount_base: amount,
            amount_quote: amount * rate.rate,
            rate: rate.rate,
            timestamp: Utc::now(),
        })?;
    }
    Ok(())
}
