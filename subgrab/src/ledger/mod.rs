//! Resume ledger: the durable record of videos already processed.
//!
//! The ledger is loaded once when a run starts. Membership checks go through
//! an in-memory id set; every append hits the store first and only then the
//! set, so a failed write leaves both unchanged.

mod csv;
mod memory;

pub use self::csv::{CsvLedgerStore, LEDGER_FILE_NAME};
pub use self::memory::MemoryLedgerStore;

use rustc_hash::FxHashSet;
use tracing::{debug, info};

use crate::domain::LedgerEntry;
use crate::{Error, Result};

/// Persistence backend for ledger rows.
///
/// Stores merge by `video_id`: writing an id that already exists replaces
/// its row.
pub trait LedgerStore: Send {
    /// All rows, at most one per `video_id`. A missing store loads as empty.
    fn load(&mut self) -> Result<Vec<LedgerEntry>>;

    /// Insert or replace the row for `entry.video_id`.
    fn upsert(&mut self, entry: &LedgerEntry) -> Result<()>;
}

/// Membership view plus write path over a [`LedgerStore`].
pub struct ResumeLedger {
    store: Box<dyn LedgerStore>,
    known: FxHashSet<String>,
}

impl std::fmt::Debug for ResumeLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResumeLedger")
            .field("entries", &self.known.len())
            .finish()
    }
}

impl ResumeLedger {
    /// Load the store and index its ids.
    pub fn open(mut store: Box<dyn LedgerStore>) -> Result<Self> {
        let entries = store.load().map_err(Error::storage)?;
        let known: FxHashSet<String> = entries.into_iter().map(|e| e.video_id).collect();
        info!(entries = known.len(), "Resume ledger loaded");
        Ok(Self { store, known })
    }

    /// A ledger backed by nothing durable.
    pub fn in_memory() -> Self {
        Self {
            store: Box::new(MemoryLedgerStore::default()),
            known: FxHashSet::default(),
        }
    }

    pub fn contains(&self, video_id: &str) -> bool {
        self.known.contains(video_id)
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    /// Persist `entry`, replacing any earlier row for the same video.
    ///
    /// Failures are [`Error::Storage`].
    pub fn append(&mut self, entry: LedgerEntry) -> Result<()> {
        self.store.upsert(&entry).map_err(Error::storage)?;
        let replaced = !self.known.insert(entry.video_id.clone());
        debug!(
            video_id = %entry.video_id,
            source = %entry.source_or_none(),
            replaced,
            "Ledger entry written"
        );
        Ok(())
    }
}
