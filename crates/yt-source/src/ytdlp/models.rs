//! Subset of the yt-dlp info JSON used by the adapters.

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::media::{
    CaptionTrack, TrackKind, TrackListing, VideoCandidate, VideoMetadata, watch_url,
};

/// Pseudo "subtitle" entries that are not captions.
const NON_CAPTION_KEYS: &[&str] = &["live_chat", "rechat"];

/// `yt-dlp -J` output for a single video.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct InfoJson {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub webpage_url: Option<String>,
    #[serde(default)]
    pub upload_date: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub subtitles: Option<FxHashMap<String, serde_json::Value>>,
    #[serde(default)]
    pub automatic_captions: Option<FxHashMap<String, serde_json::Value>>,
}

impl InfoJson {
    pub fn channel_name(&self) -> Option<String> {
        self.channel
            .clone()
            .or_else(|| self.uploader.clone())
            .filter(|c| !c.trim().is_empty())
    }

    pub fn metadata(&self, fallback_url: &str) -> VideoMetadata {
        VideoMetadata {
            video_id: self.id.clone(),
            title: self.title.clone().unwrap_or_default(),
            url: self
                .webpage_url
                .clone()
                .unwrap_or_else(|| fallback_url.to_string()),
            upload_date: self.upload_date.clone(),
            duration: self.duration,
            channel: self.channel_name(),
        }
    }

    pub fn candidate(&self, fallback_url: &str) -> VideoCandidate {
        let mut candidate = VideoCandidate::new(
            self.id.clone(),
            self.webpage_url
                .clone()
                .unwrap_or_else(|| fallback_url.to_string()),
        );
        candidate.title = self.title.clone();
        candidate.upload_date = self.upload_date.clone();
        candidate
    }

    /// Manual tracks first, then auto-captions, each sorted by language tag.
    pub fn tracks(&self) -> Vec<CaptionTrack> {
        let mut tracks = Vec::new();
        for (map, kind) in [
            (&self.subtitles, TrackKind::Manual),
            (&self.automatic_captions, TrackKind::Auto),
        ] {
            let Some(map) = map else { continue };
            let mut langs: Vec<&String> = map
                .iter()
                .filter(|(lang, formats)| {
                    !NON_CAPTION_KEYS.contains(&lang.as_str()) && has_formats(formats)
                })
                .map(|(lang, _)| lang)
                .collect();
            langs.sort();
            tracks.extend(langs.into_iter().map(|l| CaptionTrack::new(l.clone(), kind)));
        }
        tracks
    }

    pub fn into_listing(self, fallback_url: &str) -> TrackListing {
        TrackListing {
            metadata: self.metadata(fallback_url),
            tracks: self.tracks(),
        }
    }
}

fn has_formats(formats: &serde_json::Value) -> bool {
    match formats {
        serde_json::Value::Array(items) => !items.is_empty(),
        serde_json::Value::Null => false,
        _ => true,
    }
}

/// One line of `yt-dlp --flat-playlist -j` output.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FlatEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub upload_date: Option<String>,
}

impl FlatEntry {
    /// Convert to a candidate; entries without an id or URL are dropped.
    pub fn into_candidate(self) -> Option<VideoCandidate> {
        let url = match (self.url, self.id.as_deref()) {
            (Some(u), _) if u.starts_with("http") => u,
            (Some(u), _) if !u.is_empty() => watch_url(&u),
            (_, Some(id)) if !id.is_empty() => watch_url(id),
            _ => return None,
        };
        let id = self
            .id
            .filter(|id| !id.is_empty())
            .or_else(|| crate::media::parse_video_id(&url))?;

        let mut candidate = VideoCandidate::new(id, url);
        candidate.title = self.title;
        candidate.upload_date = self.upload_date;
        Some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_json_tracks() {
        let raw = r#"{
            "id": "abc123",
            "title": "A talk",
            "webpage_url": "https://www.youtube.com/watch?v=abc123",
            "upload_date": "20240102",
            "duration": 61.0,
            "uploader": "Some Uploader",
            "subtitles": {
                "live_chat": [{"ext": "json"}],
                "zh-Hans": [{"ext": "vtt"}],
                "en": [{"ext": "vtt"}]
            },
            "automatic_captions": {
                "en": [{"ext": "vtt"}],
                "fr": [],
                "de": [{"ext": "vtt"}]
            }
        }"#;
        let info: InfoJson = serde_json::from_str(raw).unwrap();
        let listing = info.into_listing("fallback");

        assert_eq!(
            listing.tracks,
            vec![
                CaptionTrack::manual("en"),
                CaptionTrack::manual("zh-Hans"),
                CaptionTrack::auto("de"),
                CaptionTrack::auto("en"),
            ]
        );
        assert_eq!(listing.metadata.channel.as_deref(), Some("Some Uploader"));
        assert_eq!(listing.metadata.duration, Some(61.0));
        assert_eq!(listing.metadata.title, "A talk");
    }

    #[test]
    fn test_info_json_without_captions() {
        let info: InfoJson = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        let listing = info.into_listing("https://youtu.be/x");
        assert!(listing.tracks.is_empty());
        assert_eq!(listing.metadata.url, "https://youtu.be/x");
    }

    #[test]
    fn test_flat_entry_bare_id_url() {
        let entry: FlatEntry =
            serde_json::from_str(r#"{"id": "abc", "url": "abc", "title": "T"}"#).unwrap();
        let c = entry.into_candidate().unwrap();
        assert_eq!(c.url, "https://www.youtube.com/watch?v=abc");
        assert_eq!(c.video_id, "abc");
        assert_eq!(c.title.as_deref(), Some("T"));
    }

    #[test]
    fn test_flat_entry_without_id_or_url() {
        let entry: FlatEntry = serde_json::from_str(r#"{"title": "T"}"#).unwrap();
        assert!(entry.into_candidate().is_none());
    }
}
