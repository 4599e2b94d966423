//! Pivot table: every currency priced in the settlement currency, used to
//! derive cross-rates between arbitrary pairs.

use crate::core::rate::{FiatSnapshot, Rate};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// The settlement currency. It is the common denominator of every pivot
/// table and always maps to exactly 1.
pub const SETTLEMENT: &str = "BYN";

/// Immutable mapping from currency code to the value of one unit in the
/// settlement currency. Rebuilt wholesale on every refresh; never patched
/// in place, so readers cannot observe a half-populated table.
#[derive(Debug, Clone)]
pub struct PivotTable {
    units: HashMap<String, Decimal>,
}

impl PivotTable {
    pub fn new() -> Self {
        let mut units = HashMap::new();
        units.insert(SETTLEMENT.to_string(), Decimal::ONE);
        Self { units }
    }

    /// Merges a fiat snapshot (unit values already in the settlement
    /// currency) with crypto rates (priced in USD). Crypto entries are
    /// projected through the USD pivot unit; when the snapshot carries no
    /// USD unit they are left out entirely rather than guessed.
    pub fn build(fiat: &FiatSnapshot, crypto: &[Rate]) -> Self {
        let mut units = HashMap::new();
        for (code, rate) in &fiat.rates {
            units.insert(code.clone(), rate.value);
        }
        if let Some(usd_unit) = fiat.usd_unit {
            for rate in crypto {
                units.insert(rate.currency.clone(), rate.value * usd_unit);
            }
        }
        // The settlement invariant wins over anything upstream sent.
        units.insert(SETTLEMENT.to_string(), Decimal::ONE);
        Self { units }
    }

    pub fn unit(&self, code: &str) -> Option<Decimal> {
        self.units.get(code).copied()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.units.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Quote units received per one base unit, or `None` when either code
    /// is unknown or the quote value is zero. Absence is an expected
    /// answer here, not an error.
    pub fn cross_rate(&self, base: &str, quote: &str) -> Option<Decimal> {
        let base_unit = self.unit(base)?;
        let quote_unit = self.unit(quote)?;
        base_unit.checked_div(quote_unit)
    }
}

impl Default for PivotTable {
    fn default() -> Self {
        Self::new()
    }
}
