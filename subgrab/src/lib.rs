//! Incremental transcript acquisition for YouTube channels and videos.
//!
//! For every video the [`acquisition`] state machine tries manual captions,
//! then allow-listed auto-captions, then local transcription. The
//! [`pipeline`] controller feeds it candidates from a channel listing, skips
//! what the [`ledger`] already records, and writes each outcome back to the
//! ledger before handing it to a [`sinks`] implementation.

pub mod acquisition;
pub mod domain;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod pipeline;
pub mod retry;
pub mod selector;
pub mod sinks;
pub mod utils;

pub use acquisition::{AcquisitionMachine, AcquisitionState, TranscriptionConfig};
pub use domain::{AcquisitionResult, LedgerEntry, SubtitleSource};
pub use error::{Error, Result};
pub use ledger::{CsvLedgerStore, LedgerStore, MemoryLedgerStore, ResumeLedger};
pub use pipeline::{FilterMode, PipelineController, RunOptions, RunSummary, SourceSpec};
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use selector::{LanguagePriority, LanguageSelector};
