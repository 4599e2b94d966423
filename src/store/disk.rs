use crate::core::history::{HISTORY_KEY, HistoryStore};
use anyhow::{Context, Result};
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

/// History blob persisted in a fjall partition. Every mutation is synced
/// to disk before returning; volumes are a single small blob, so the cost
/// is negligible.
pub struct FjallHistoryStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl FjallHistoryStore {
    pub fn open(path: &Path) -> Result<Self> {
        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open history store at {}", path.display()))?;
        let partition = keyspace
            .open_partition("history", PartitionCreateOptions::default())
            .context("Failed to open history partition")?;
        Ok(FjallHistoryStore {
            keyspace,
            partition,
        })
    }

    fn persist(&self) -> Result<()> {
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to sync history store")
    }
}

impl HistoryStore for FjallHistoryStore {
    fn read(&self) -> Option<Vec<u8>> {
        match self.partition.get(HISTORY_KEY) {
            Ok(Some(blob)) => Some(blob.to_vec()),
            Ok(None) => None,
            Err(e) => {
                debug!("History read failed: {e}");
                None
            }
        }
    }

    fn write(&self, blob: &[u8]) -> Result<()> {
        self.partition
            .insert(HISTORY_KEY, blob)
            .context("Failed to write history blob")?;
        self.persist()
    }

    fn delete(&self) -> Result<()> {
        self.partition
            .remove(HISTORY_KEY)
            .context("Failed to delete history blob")?;
        self.persist()
    }
}
