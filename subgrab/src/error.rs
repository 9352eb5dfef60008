//! Application-wide error types.

use std::path::PathBuf;
use thiserror::Error;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Application-wide error type.
///
/// Only [`Error::Storage`] and [`Error::Enumeration`] abort a run; per-video
/// source failures never surface here.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Ledger storage error: {0}")]
    Storage(#[source] Box<Error>),

    #[error("Enumeration error: {0}")]
    Enumeration(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO error while {op} at {}: {source}", path.display())]
    IoPath {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn io_path(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoPath {
            op,
            path: path.into(),
            source,
        }
    }

    /// Wrap any error as a ledger storage failure.
    pub fn storage(err: impl Into<Error>) -> Self {
        match err.into() {
            e @ Self::Storage(_) => e,
            e => Self::Storage(Box::new(e)),
        }
    }

    pub fn enumeration(msg: impl Into<String>) -> Self {
        Self::Enumeration(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Whether this error must stop the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Enumeration(_))
    }
}

impl From<yt_source::SourceError> for Error {
    fn from(e: yt_source::SourceError) -> Self {
        Self::Other(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_wraps_once() {
        let inner = Error::io_path(
            "writing ledger",
            "/tmp/x.csv",
            std::io::Error::other("disk full"),
        );
        let e = Error::storage(Error::storage(inner));
        match &e {
            Error::Storage(inner) => assert!(matches!(**inner, Error::IoPath { .. })),
            other => panic!("unexpected {other:?}"),
        }
        assert!(e.is_fatal());
        assert!(e.to_string().contains("/tmp/x.csv"));
    }

    #[test]
    fn test_configuration_is_not_fatal() {
        assert!(!Error::config("whisper missing").is_fatal());
        assert!(Error::enumeration("no entries").is_fatal());
    }
}
