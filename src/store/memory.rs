use crate::core::history::HistoryStore;
use anyhow::Result;
use std::sync::RwLock;

/// In-memory history storage, used in tests and wherever persistence is
/// not wanted.
#[derive(Default)]
pub struct MemoryHistoryStore {
    blob: RwLock<Option<Vec<u8>>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn read(&self) -> Option<Vec<u8>> {
        self.blob.read().unwrap().clone()
    }

    fn write(&self, blob: &[u8]) -> Result<()> {
        *self.blob.write().unwrap() = Some(blob.to_vec());
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        *self.blob.write().unwrap() = None;
        Ok(())
    }
}
