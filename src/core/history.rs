//! Bounded, deduplicated history of completed conversions.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Storage key for the serialized history blob.
pub const HISTORY_KEY: &str = "conversion_history_v1";

const MAX_RECORDS: usize = 50;

fn amount_tolerance() -> Decimal {
    // 0.0001
    Decimal::new(1, 4)
}

/// One completed conversion, immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRecord {
    pub base_code: String,
    pub base_flag: String,
    pub quote_code: String,
    pub quote_flag: String,
    pub amount_base: Decimal,
    pub amount_quote: Decimal,
    pub rate: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// Backing storage for the history: a single opaque blob under a fixed
/// key. Reads signal absence with `None` and never fail.
pub trait HistoryStore: Send + Sync {
    fn read(&self) -> Option<Vec<u8>>;
    fn write(&self, blob: &[u8]) -> Result<()>;
    fn delete(&self) -> Result<()>;
}

/// Ordered (newest first) conversion history, persisted synchronously on
/// every mutation. Volumes are small enough that each mutation rewrites
/// the whole blob.
pub struct ConversionHistory {
    store: Box<dyn HistoryStore>,
}

impl ConversionHistory {
    pub fn new(store: Box<dyn HistoryStore>) -> Self {
        Self { store }
    }

    /// Loads all records, newest first. A missing or unreadable blob is
    /// an empty history, not an error.
    pub fn load(&self) -> Vec<ConversionRecord> {
        self.store
            .read()
            .and_then(|blob| match serde_json::from_slice(&blob) {
                Ok(records) => Some(records),
                Err(e) => {
                    debug!("discarding unreadable history blob: {e}");
                    None
                }
            })
            .unwrap_or_default()
    }

    /// Prepends a record, dropping it when the most recent entry is the
    /// same pair with both amounts within tolerance (rapid re-triggers of
    /// the same conversion). The list is then truncated to the newest 50.
    pub fn add(&self, record: ConversionRecord) -> Result<()> {
        let mut records = self.load();
        if let Some(last) = records.first() {
            if near_equal(last, &record) {
                debug!(
                    base = %record.base_code,
                    quote = %record.quote_code,
                    "skipping duplicate conversion record"
                );
                return Ok(());
            }
        }
        records.insert(0, record);
        records.truncate(MAX_RECORDS);
        self.save(&records)
    }

    /// Removes the record at `index`; out-of-range indices are ignored.
    pub fn remove(&self, index: usize) -> Result<()> {
        let mut records = self.load();
        if index >= records.len() {
            return Ok(());
        }
        records.remove(index);
        self.save(&records)
    }

    pub fn clear(&self) -> Result<()> {
        self.store.delete()
    }

    fn save(&self, records: &[ConversionRecord]) -> Result<()> {
        let blob = serde_json::to_vec(records)?;
        self.store.write(&blob)
    }
}

fn near_equal(a: &ConversionRecord, b: &ConversionRecord) -> bool {
    if a.base_code != b.base_code || b.quote_code != a.quote_code {
        return false;
    }
    let close = |x: Decimal, y: Decimal| (x - y).abs() < amount_tolerance();
    close(a.amount_base, b.amount_base) && close(a.amount_quote, b.amount_quote)
}
