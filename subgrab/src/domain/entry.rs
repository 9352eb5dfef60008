use serde::{Deserialize, Serialize};

use super::{AcquisitionResult, SubtitleSource};

/// Column order of the current ledger schema.
pub const LEDGER_COLUMNS: &[&str] = &[
    "video_id",
    "title",
    "url",
    "upload_date",
    "duration",
    "subtitle_path",
    "languages",
    "subtitle_source",
];

/// Durable projection of an [`AcquisitionResult`], one row per video.
///
/// Fields missing from older files deserialize as empty, and an unrecognised
/// `subtitle_source` reads as unknown rather than failing the load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerEntry {
    pub video_id: String,
    pub title: String,
    pub url: String,
    /// `YYYY-MM-DD` or `Unknown`.
    pub upload_date: String,
    /// Whole seconds.
    #[serde(deserialize_with = "csv::invalid_option")]
    pub duration: Option<u64>,
    /// Where the transcript was delivered, empty if nowhere.
    pub subtitle_path: String,
    pub languages: String,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub subtitle_source: Option<SubtitleSource>,
}

impl LedgerEntry {
    pub fn from_result(result: &AcquisitionResult, subtitle_path: Option<String>) -> Self {
        Self {
            video_id: result.video_id.clone(),
            title: result.title.clone(),
            url: result.url.clone(),
            upload_date: result.display_upload_date(),
            duration: result
                .duration
                .filter(|d| d.is_finite() && *d >= 0.0)
                .map(|d| d.round() as u64),
            subtitle_path: subtitle_path.unwrap_or_default(),
            languages: result.languages.clone(),
            subtitle_source: Some(result.subtitle_source),
        }
    }

    /// Source as recorded, `None` for rows from older ledgers.
    pub fn source_or_none(&self) -> SubtitleSource {
        self.subtitle_source.unwrap_or(SubtitleSource::None)
    }
}
