//! CSV-backed ledger store (`subtitles_summary.csv`).

use rustc_hash::FxHashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::LedgerStore;
use crate::domain::LedgerEntry;
use crate::domain::entry::LEDGER_COLUMNS;
use crate::utils::fs;
use crate::{Error, Result};

pub const LEDGER_FILE_NAME: &str = "subtitles_summary.csv";

/// Superseded lines tolerated before a replacing upsert compacts the file.
const COMPACT_MIN_STALE: usize = 64;

/// Ledger rows in a CSV file with a header line.
///
/// Every upsert appends one fsynced line; a replaced id leaves its older line
/// behind, and loading keeps the last line per id. Once superseded lines
/// outnumber both `COMPACT_MIN_STALE` and the live rows, the next replacement
/// rewrites the file through a temporary file and an atomic rename. The first
/// write to a file with an older header is also a rewrite.
#[derive(Debug)]
pub struct CsvLedgerStore {
    path: PathBuf,
    rows: Vec<LedgerEntry>,
    index: FxHashMap<String, usize>,
    /// Lines in the file superseded by a later line for the same id.
    stale: usize,
    legacy_header: bool,
    loaded: bool,
}

impl CsvLedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            rows: Vec::new(),
            index: FxHashMap::default(),
            stale: 0,
            legacy_header: false,
            loaded: false,
        }
    }

    /// Store at `<dir>/subtitles_summary.csv`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(LEDGER_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&mut self) -> Result<()> {
        self.rows.clear();
        self.index.clear();
        self.stale = 0;
        self.legacy_header = false;
        self.loaded = true;

        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No ledger file yet");
                return Ok(());
            }
            Err(e) => return Err(Error::io_path("opening ledger", &self.path, e)),
        };

        let mut reader = ::csv::ReaderBuilder::new().flexible(true).from_reader(file);
        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Ok(());
        }
        self.legacy_header = !headers.iter().eq(LEDGER_COLUMNS.iter().copied());
        if self.legacy_header {
            info!(
                path = %self.path.display(),
                columns = headers.len(),
                "Ledger uses an older column layout; it will be upgraded on the next write"
            );
        }

        for row in reader.deserialize::<LedgerEntry>() {
            let entry = row?;
            if entry.video_id.is_empty() {
                warn!(path = %self.path.display(), "Skipping ledger row without video_id");
                continue;
            }
            if !self.insert_row(entry) {
                self.stale += 1;
            }
        }
        if self.stale > 0 {
            debug!(path = %self.path.display(), stale = self.stale, "Ledger has superseded rows");
        }
        Ok(())
    }

    /// Insert into the in-memory rows; a repeated id keeps its position and
    /// takes the newer content.
    fn insert_row(&mut self, entry: LedgerEntry) -> bool {
        match self.index.get(&entry.video_id) {
            Some(&i) => {
                self.rows[i] = entry;
                false
            }
            None => {
                self.index.insert(entry.video_id.clone(), self.rows.len());
                self.rows.push(entry);
                true
            }
        }
    }

    fn append_row(&self, entry: &LedgerEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::ensure_dir_all_sync_with_op("creating ledger directory", parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::io_path("opening ledger", &self.path, e))?;
        let empty = file
            .metadata()
            .map_err(|e| Error::io_path("reading ledger metadata", &self.path, e))?
            .len()
            == 0;

        let mut writer = ::csv::WriterBuilder::new()
            .has_headers(empty)
            .from_writer(&mut file);
        writer.serialize(entry)?;
        writer
            .flush()
            .map_err(|e| Error::io_path("appending to ledger", &self.path, e))?;
        drop(writer);

        file.sync_all()
            .map_err(|e| Error::io_path("syncing ledger", &self.path, e))
    }

    fn rewrite(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::ensure_dir_all_sync_with_op("creating ledger directory", &dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)
            .map_err(|e| Error::io_path("creating temporary ledger", &dir, e))?;
        let tmp_path = tmp.path().to_path_buf();
        {
            let mut writer = ::csv::Writer::from_writer(tmp.as_file_mut());
            for row in &self.rows {
                writer.serialize(row)?;
            }
            // An empty ledger still gets its header.
            if self.rows.is_empty() {
                writer.write_record(LEDGER_COLUMNS)?;
            }
            writer
                .flush()
                .map_err(|e| Error::io_path("writing temporary ledger", &tmp_path, e))?;
        }
        tmp.as_file_mut()
            .flush()
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| Error::io_path("syncing temporary ledger", &tmp_path, e))?;
        tmp.persist(&self.path)
            .map_err(|e| Error::io_path("replacing ledger", &self.path, e.error))?;

        debug!(path = %self.path.display(), rows = self.rows.len(), "Ledger rewritten");
        Ok(())
    }
}

impl LedgerStore for CsvLedgerStore {
    fn load(&mut self) -> Result<Vec<LedgerEntry>> {
        self.read_file()?;
        Ok(self.rows.clone())
    }

    fn upsert(&mut self, entry: &LedgerEntry) -> Result<()> {
        if !self.loaded {
            self.read_file()?;
        }

        let previous = self.index.get(&entry.video_id).map(|&i| self.rows[i].clone());
        let is_new = self.insert_row(entry.clone());

        let compact = self.legacy_header
            || (!is_new && self.stale >= COMPACT_MIN_STALE.max(self.rows.len()));
        let written = if compact {
            self.rewrite()
        } else {
            self.append_row(entry)
        };

        match written {
            Ok(()) => {
                self.legacy_header = false;
                if compact {
                    self.stale = 0;
                } else if !is_new {
                    self.stale += 1;
                }
                Ok(())
            }
            Err(e) => {
                // Keep the in-memory rows in step with the file.
                match previous {
                    Some(row) => {
                        self.insert_row(row);
                    }
                    None => {
                        self.index.remove(&entry.video_id);
                        self.rows.pop();
                    }
                }
                Err(e)
            }
        }
    }
}
