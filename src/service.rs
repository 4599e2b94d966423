//! Aggregates fiat, crypto and metal rates into one pivot table and
//! answers conversion queries against it.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

use crate::core::config::AppConfig;
use crate::core::metadata;
use crate::core::pivot::{PivotTable, SETTLEMENT};
use crate::core::rate::{
    CryptoRateSource, Currency, ExchangeRate, FiatRateSource, MetalsSource, Rate,
};
use crate::providers::coingecko::CoinGeckoProvider;
use crate::providers::goldapi::GoldApiProvider;
use crate::providers::nbrb::NbrbProvider;

/// Everything one refresh produces. Swapped in wholesale so queries never
/// observe rates from two different cycles.
struct ServiceState {
    table: PivotTable,
    fiat_rates: Vec<Rate>,
    top_rates: Vec<Rate>,
    crypto_rates: Vec<Rate>,
    currencies: Vec<Currency>,
    change_available: bool,
    updated_at: Option<DateTime<Utc>>,
}

impl ServiceState {
    fn empty() -> Self {
        ServiceState {
            table: PivotTable::new(),
            fiat_rates: Vec::new(),
            top_rates: Vec::new(),
            crypto_rates: Vec::new(),
            currencies: Vec::new(),
            change_available: false,
            updated_at: None,
        }
    }
}

pub struct RateService {
    fiat: Box<dyn FiatRateSource>,
    crypto: Box<dyn CryptoRateSource>,
    metals: Box<dyn MetalsSource>,
    top_fiat: Vec<String>,
    wanted_fiat: Vec<String>,
    crypto_count: usize,
    state: RwLock<Arc<ServiceState>>,
    generation: AtomicU64,
}

impl RateService {
    pub fn new(
        fiat: Box<dyn FiatRateSource>,
        crypto: Box<dyn CryptoRateSource>,
        metals: Box<dyn MetalsSource>,
        wanted_fiat: Vec<String>,
        top_fiat: Vec<String>,
        crypto_count: usize,
    ) -> Self {
        RateService {
            fiat,
            crypto,
            metals,
            top_fiat,
            wanted_fiat,
            crypto_count,
            state: RwLock::new(Arc::new(ServiceState::empty())),
            generation: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let nbrb_base = config
            .providers
            .nbrb
            .as_ref()
            .map_or("https://api.nbrb.by", |p| &p.base_url);
        let gecko_base = config
            .providers
            .coingecko
            .as_ref()
            .map_or("https://api.coingecko.com", |p| &p.base_url);
        let (gold_base, gold_key) = config
            .providers
            .goldapi
            .as_ref()
            .map_or(("https://www.goldapi.io", ""), |p| {
                (p.base_url.as_str(), p.api_key.as_str())
            });

        let fiat = NbrbProvider::new(
            nbrb_base,
            &config.currencies.wanted_fiat,
            &config.currencies.top_fiat,
        )
        .context("Failed to construct fiat rates provider")?;
        let crypto = CoinGeckoProvider::new(gecko_base)
            .context("Failed to construct crypto rates provider")?;
        let metals = GoldApiProvider::new(gold_base, gold_key)
            .context("Failed to construct metals provider")?;

        Ok(Self::new(
            Box::new(fiat),
            Box::new(crypto),
            Box::new(metals),
            config.currencies.wanted_fiat.clone(),
            config.currencies.top_fiat.clone(),
            config.crypto_count,
        ))
    }

    /// Fetches fiat and crypto concurrently and swaps a fresh state in.
    /// Errs only when today's fiat rates are unavailable. A refresh that
    /// was superseded by a newer one discards its result instead of
    /// clobbering fresher data.
    pub async fn refresh(&self) -> Result<()> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let (snapshot, crypto_rates) = tokio::join!(
            self.fiat.fetch_snapshot(),
            self.crypto.fetch_top(self.crypto_count)
        );
        let snapshot = snapshot.context("No rates available")?;

        let table = PivotTable::build(&snapshot, &crypto_rates);

        let mut fiat_rates = Vec::new();
        for code in &self.wanted_fiat {
            if let Some(rate) = snapshot.rates.get(code) {
                fiat_rates.push(rate.clone());
            }
        }

        let mut top_rates = Vec::new();
        for code in &self.top_fiat {
            if let Some(rate) = snapshot.rates.get(code) {
                top_rates.push(rate.clone());
            }
        }
        let metal_row = |code: &str, value: Decimal, flag: &str| Rate {
            currency: code.to_string(),
            value,
            change: 0.0,
            flag: flag.to_string(),
        };
        match snapshot.usd_unit {
            Some(usd_unit) => {
                let prices = self.metals.fetch_usd_prices().await;
                top_rates.push(metal_row(
                    "XAU",
                    prices.xau_usd * usd_unit,
                    metadata::GOLD_GLYPH,
                ));
                top_rates.push(metal_row(
                    "XAG",
                    prices.xag_usd * usd_unit,
                    metadata::SILVER_GLYPH,
                ));
            }
            None => {
                // No USD pivot: metal rows stay visible but unpriced.
                top_rates.push(metal_row("XAU", Decimal::ZERO, metadata::GOLD_GLYPH));
                top_rates.push(metal_row("XAG", Decimal::ZERO, metadata::SILVER_GLYPH));
            }
        }

        let mut currencies = vec![metadata::fiat_currency(SETTLEMENT)];
        for rate in &fiat_rates {
            currencies.push(metadata::fiat_currency(&rate.currency));
        }
        for rate in &crypto_rates {
            currencies.push(metadata::crypto_currency(&rate.currency));
        }
        let mut seen = std::collections::HashSet::new();
        currencies.retain(|c| seen.insert(c.code.clone()));

        let state = Arc::new(ServiceState {
            table,
            fiat_rates,
            top_rates,
            crypto_rates,
            currencies,
            change_available: snapshot.change_available,
            updated_at: Some(Utc::now()),
        });

        let mut guard = self.state.write().unwrap();
        if self.generation.load(Ordering::SeqCst) == generation {
            info!(entries = state.table.len(), "Pivot table refreshed");
            *guard = state;
        } else {
            debug!("Refresh superseded by a newer one, discarding result");
        }
        Ok(())
    }

    fn state(&self) -> Arc<ServiceState> {
        self.state.read().unwrap().clone()
    }

    /// Quote units per one base unit, or `None` when either currency is
    /// absent from the current pivot table.
    pub fn cross_rate(&self, base: &str, quote: &str) -> Option<Decimal> {
        self.state().table.cross_rate(base, quote)
    }

    /// Full exchange rate with display currencies attached.
    pub fn exchange_rate(&self, base: &str, quote: &str) -> Option<ExchangeRate> {
        let state = self.state();
        let rate = state.table.cross_rate(base, quote)?;
        Some(ExchangeRate {
            base: currency_for(&state, base),
            quote: currency_for(&state, quote),
            rate,
            updated_at: state.updated_at.unwrap_or_else(Utc::now),
        })
    }

    /// Wanted-fiat rates in configured order.
    pub fn fiat_rates(&self) -> Vec<Rate> {
        self.state().fiat_rates.clone()
    }

    /// Top fiat rates plus the gold and silver rows.
    pub fn top_rates(&self) -> Vec<Rate> {
        self.state().top_rates.clone()
    }

    pub fn crypto_rates(&self) -> Vec<Rate> {
        self.state().crypto_rates.clone()
    }

    /// Deduplicated pickable currencies: settlement, then fiat, then crypto.
    pub fn currencies(&self) -> Vec<Currency> {
        self.state().currencies.clone()
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.state().updated_at
    }

    /// False when day-over-day changes degraded to zero because the
    /// previous-day fetch failed.
    pub fn change_available(&self) -> bool {
        self.state().change_available
    }
}

fn currency_for(state: &ServiceState, code: &str) -> Currency {
    if let Some(currency) = state.currencies.iter().find(|c| c.code == code) {
        return currency.clone();
    }
    if metadata::crypto_name(code).is_some() {
        metadata::crypto_currency(code)
    } else {
        metadata::fiat_currency(code)
    }
}
