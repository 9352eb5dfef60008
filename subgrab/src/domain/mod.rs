//! Core value types shared by the acquisition and ledger modules.

pub mod entry;
pub mod result;
pub mod source;

pub use entry::LedgerEntry;
pub use result::AcquisitionResult;
pub use source::SubtitleSource;
