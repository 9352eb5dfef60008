use serde::Serialize;
use yt_source::media::{VideoMetadata, format_duration, format_upload_date};

use super::SubtitleSource;

/// Terminal outcome of acquiring a transcript for one video.
///
/// Built once by the acquisition state machine and never modified. The text
/// is empty exactly when the source is [`SubtitleSource::None`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcquisitionResult {
    pub video_id: String,
    pub title: String,
    pub url: String,
    /// Raw upload date as reported by the source (`YYYYMMDD`).
    pub upload_date: Option<String>,
    /// Duration in seconds.
    pub duration: Option<f64>,
    pub channel: Option<String>,
    #[serde(skip_serializing)]
    pub subtitle_text: String,
    pub subtitle_source: SubtitleSource,
    /// The chosen language tag, empty when nothing was acquired or the
    /// transcriber did not report one.
    pub languages: String,
}

impl AcquisitionResult {
    pub(crate) fn from_metadata(
        metadata: VideoMetadata,
        subtitle_source: SubtitleSource,
        subtitle_text: String,
        language: Option<String>,
    ) -> Self {
        Self {
            video_id: metadata.video_id,
            title: metadata.title,
            url: metadata.url,
            upload_date: metadata.upload_date,
            duration: metadata.duration,
            channel: metadata.channel,
            subtitle_text,
            subtitle_source,
            languages: language.unwrap_or_default(),
        }
    }

    /// A result with no transcript.
    pub(crate) fn none(metadata: VideoMetadata) -> Self {
        Self::from_metadata(metadata, SubtitleSource::None, String::new(), None)
    }

    /// `YYYY-MM-DD`, or `Unknown`.
    pub fn display_upload_date(&self) -> String {
        format_upload_date(self.upload_date.as_deref())
    }

    /// `H:MM:SS` / `M:SS`, or empty.
    pub fn display_duration(&self) -> String {
        format_duration(self.duration)
    }

    pub fn has_text(&self) -> bool {
        self.subtitle_source.has_text()
    }
}
