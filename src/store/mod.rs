pub mod disk;
pub mod memory;

use crate::core::config::AppConfig;
use crate::core::history::ConversionHistory;
use anyhow::{Context, Result};
use disk::FjallHistoryStore;

/// Opens the persisted conversion history under the configured data path.
pub fn open_history(config: &AppConfig) -> Result<ConversionHistory> {
    let path = config
        .default_data_path()
        .context("Could not determine history location")?
        .join("history");
    let store = FjallHistoryStore::open(&path)?;
    Ok(ConversionHistory::new(Box::new(store)))
}
