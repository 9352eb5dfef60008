use thiserror::Error;

/// Failure of a network-bound source operation (listing, caption or audio fetch).
///
/// Variants split into two families: transient failures that are worth
/// retrying, and definitive ones that will not change on a second attempt.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("transient error: {0}")]
    Transient(String),
    #[error("video unavailable: {0}")]
    VideoUnavailable(String),
    #[error("caption track not found: {0}")]
    TrackNotFound(String),
    #[error("tool unavailable: {0}")]
    ToolUnavailable(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("other: {0}")]
    Other(String),
}

impl SourceError {
    /// Whether retrying the same operation may succeed.
    ///
    /// Unclassified failures count as transient.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited(_) | Self::Transient(_) | Self::Io(_) | Self::Other(_)
        )
    }

    pub fn is_definitive(&self) -> bool {
        !self.is_transient()
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

/// Failure of the local speech-to-text step.
#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("transcription model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("transcription failed: {0}")]
    Failed(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Parse(#[from] serde_json::Error),
}
