//! Rate abstractions and core types

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A currency as shown to the user. Equality is by `code` only; the
/// display fields come from the metadata catalog and may differ between
/// builds without making two currencies distinct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    pub name: String,
    pub symbol: String,
    pub flag: String,
}

impl PartialEq for Currency {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for Currency {}

/// A quoted rate for one currency: the value of a single unit expressed
/// in the settlement currency (or in USD for crypto rows before they are
/// projected into the pivot table).
#[derive(Debug, Clone)]
pub struct Rate {
    pub currency: String,
    pub value: Decimal,
    pub change: f64,
    pub flag: String,
}

/// A pairwise exchange rate: `rate` quote units are received per one base
/// unit. Kept in the decimal domain so chained edits and inversions do not
/// accumulate binary rounding error.
#[derive(Debug, Clone)]
pub struct ExchangeRate {
    pub base: Currency,
    pub quote: Currency,
    pub rate: Decimal,
    pub updated_at: DateTime<Utc>,
}

/// Day-over-day change in percent. A zero or missing reference value
/// yields `0` rather than a division fault.
pub fn change_percent(today: Decimal, yesterday: Decimal) -> f64 {
    if yesterday.is_zero() {
        return 0.0;
    }
    let t = today.to_f64().unwrap_or(0.0);
    let y = yesterday.to_f64().unwrap_or(0.0);
    (t - y) / y * 100.0
}

/// Result of one fiat fetch cycle.
#[derive(Debug, Clone)]
pub struct FiatSnapshot {
    /// Unit values keyed by currency code, settlement row included.
    pub rates: HashMap<String, Rate>,
    /// Value of 1 USD in the settlement currency, when the source quoted it.
    pub usd_unit: Option<Decimal>,
    pub fetched_at: DateTime<Utc>,
    /// False when the previous-day fetch failed and every `change` field
    /// degraded to zero. Callers can surface this instead of showing a
    /// silent flat day.
    pub change_available: bool,
}

#[async_trait]
pub trait FiatRateSource: Send + Sync {
    /// Errs only when today's rates are unavailable; a missing previous
    /// day degrades to `change_available = false`.
    async fn fetch_snapshot(&self) -> Result<FiatSnapshot>;
}

#[async_trait]
pub trait CryptoRateSource: Send + Sync {
    /// Top assets by market cap, priced in USD. Transport and decode
    /// failures degrade to an empty list.
    async fn fetch_top(&self, count: usize) -> Vec<Rate>;
}

/// Per-ounce USD prices for the tracked metals.
#[derive(Debug, Clone, Copy)]
pub struct MetalPrices {
    pub xau_usd: Decimal,
    pub xag_usd: Decimal,
}

#[async_trait]
pub trait MetalsSource: Send + Sync {
    /// Best effort: implementations fall back to fixed constants rather
    /// than failing.
    async fn fetch_usd_prices(&self) -> MetalPrices;
}
