use serde::{Deserialize, Serialize};
use url::Url;

const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// A video selected for processing.
///
/// Produced by a channel listing or built directly from a single-video
/// request; never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoCandidate {
    pub video_id: String,
    pub url: String,
    /// Title as reported by the listing, if any. Only used for progress output.
    pub title: Option<String>,
    /// Raw upload date (`YYYYMMDD`) when the listing already knows it.
    pub upload_date: Option<String>,
}

impl VideoCandidate {
    pub fn new(video_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            url: url.into(),
            title: None,
            upload_date: None,
        }
    }

    /// Build a candidate from a bare id, using the canonical watch URL.
    pub fn from_id(video_id: impl Into<String>) -> Self {
        let video_id = video_id.into();
        let url = watch_url(&video_id);
        Self::new(video_id, url)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Title if known, URL otherwise.
    pub fn display_name(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.url)
    }
}

/// Metadata reported by the caption source alongside the track list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub video_id: String,
    pub title: String,
    pub url: String,
    /// Raw upload date, usually `YYYYMMDD`.
    pub upload_date: Option<String>,
    /// Duration in seconds.
    pub duration: Option<f64>,
    pub channel: Option<String>,
}

/// Result of probing a single video URL.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoProbe {
    pub candidate: VideoCandidate,
    pub channel: Option<String>,
}

/// Canonical watch URL for a video id.
pub fn watch_url(video_id: &str) -> String {
    format!("{WATCH_URL_PREFIX}{video_id}")
}

/// The "Videos" tab of a channel handle (with or without the leading `@`).
pub fn channel_videos_url(handle: &str) -> String {
    let handle = handle.trim().trim_start_matches('@');
    format!("https://www.youtube.com/@{handle}/videos")
}

/// Extract the video id from the common YouTube URL shapes.
///
/// Supports `watch?v=`, `youtu.be/<id>`, `/shorts/<id>`, `/live/<id>` and
/// `/embed/<id>`. Returns `None` for anything else.
pub fn parse_video_id(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    let host = url.host_str()?.trim_start_matches("www.").trim_start_matches("m.");

    let id = match host {
        "youtu.be" => url.path_segments()?.next().map(str::to_owned),
        "youtube.com" | "music.youtube.com" | "youtube-nocookie.com" => {
            let mut segments = url.path_segments()?;
            match segments.next() {
                Some("watch") => url
                    .query_pairs()
                    .find(|(k, _)| k == "v")
                    .map(|(_, v)| v.into_owned()),
                Some("shorts") | Some("live") | Some("embed") | Some("v") => {
                    segments.next().map(str::to_owned)
                }
                _ => None,
            }
        }
        _ => None,
    }?;

    is_valid_video_id(&id).then_some(id)
}

fn is_valid_video_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 32
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Render a raw `YYYYMMDD` upload date as `YYYY-MM-DD`.
///
/// Missing dates render as `Unknown`; other shapes pass through untouched.
pub fn format_upload_date(raw: Option<&str>) -> String {
    match raw {
        None | Some("") => "Unknown".to_string(),
        Some(d) if d.len() == 8 && d.bytes().all(|b| b.is_ascii_digit()) => {
            format!("{}-{}-{}", &d[..4], &d[4..6], &d[6..])
        }
        Some(d) => d.to_string(),
    }
}

/// Render a duration in seconds as `H:MM:SS` (or `M:SS` under an hour).
pub fn format_duration(seconds: Option<f64>) -> String {
    let Some(seconds) = seconds.filter(|s| s.is_finite() && *s >= 0.0) else {
        return String::new();
    };
    let total = seconds.round() as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}
