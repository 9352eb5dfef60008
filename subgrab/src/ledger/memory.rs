use std::sync::Arc;

use parking_lot::Mutex;

use super::LedgerStore;
use crate::Result;
use crate::domain::LedgerEntry;

/// Ledger store kept in memory, in insertion order.
///
/// Clones share rows, so a caller can keep a handle to inspect what a run
/// wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedgerStore {
    rows: Arc<Mutex<Vec<LedgerEntry>>>,
}

impl MemoryLedgerStore {
    pub fn with_entries(entries: Vec<LedgerEntry>) -> Self {
        Self {
            rows: Arc::new(Mutex::new(entries)),
        }
    }

    /// Snapshot of the current rows.
    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.rows.lock().clone()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn load(&mut self) -> Result<Vec<LedgerEntry>> {
        Ok(self.entries())
    }

    fn upsert(&mut self, entry: &LedgerEntry) -> Result<()> {
        let mut rows = self.rows.lock();
        match rows.iter_mut().find(|r| r.video_id == entry.video_id) {
            Some(row) => *row = entry.clone(),
            None => rows.push(entry.clone()),
        }
        Ok(())
    }
}
