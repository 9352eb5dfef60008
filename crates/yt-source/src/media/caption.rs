use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::VideoMetadata;

/// Provenance of a caption track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    /// Authored by a human and attached by the uploader.
    Manual,
    /// Machine-generated by the platform.
    Auto,
}

impl TrackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Auto => "auto",
        }
    }
}

impl std::fmt::Display for TrackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A caption track offered for a video.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaptionTrack {
    pub language: String,
    pub kind: TrackKind,
}

impl CaptionTrack {
    pub fn new(language: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            language: language.into(),
            kind,
        }
    }

    pub fn manual(language: impl Into<String>) -> Self {
        Self::new(language, TrackKind::Manual)
    }

    pub fn auto(language: impl Into<String>) -> Self {
        Self::new(language, TrackKind::Auto)
    }
}

/// Everything the caption source knows about a video in one round trip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackListing {
    pub metadata: VideoMetadata,
    pub tracks: Vec<CaptionTrack>,
}

/// Downloaded audio for a video.
///
/// When the audio lives in a scratch directory, the directory is removed
/// together with this value.
#[derive(Debug)]
pub struct AudioBlob {
    path: PathBuf,
    _scratch: Option<TempDir>,
}

impl AudioBlob {
    /// Audio that lives in a caller-managed location.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _scratch: None,
        }
    }

    /// Audio inside a scratch directory owned by this blob.
    pub fn in_scratch(path: impl Into<PathBuf>, scratch: TempDir) -> Self {
        Self {
            path: path.into(),
            _scratch: Some(scratch),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Output of the speech-to-text step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    /// One segment per line.
    pub text: String,
    /// Language detected by the model, if reported.
    pub language: Option<String>,
}
