use serde::{Deserialize, Serialize};

/// Provenance of the transcript stored for a video.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SubtitleSource {
    /// Human-authored caption track.
    Manual,
    /// Platform-generated caption track.
    AutoCaption,
    /// Local speech-to-text.
    Whisper,
    /// Nothing could be acquired.
    None,
}

impl SubtitleSource {
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }

    /// Whether a transcript text was produced.
    pub fn has_text(&self) -> bool {
        !matches!(self, Self::None)
    }
}
