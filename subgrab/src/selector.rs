//! Language selector for choosing the single caption track to keep.
//!
//! Ranking is manual before auto, then by position in the configured
//! priority list, then by position in the auto-caption allow-list. Manual
//! tracks in other languages are still accepted (after every listed
//! language) unless disabled; auto tracks outside both lists never are.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;
use yt_source::media::{CaptionTrack, TrackKind};

/// Preferred languages, most preferred first.
pub const DEFAULT_PRIORITY: &[&str] = &["en", "en-US", "en-GB", "zh-Hans", "zh-Hant", "zh-CN", "zh-TW"];

/// Languages whose auto-generated captions are worth keeping.
pub const DEFAULT_AUTO_ALLOWLIST: &[&str] = &[
    "en", "en-US", "en-GB", "en-CA", "en-AU", "en-IN", "zh", "zh-CN", "zh-TW", "zh-Hans",
    "zh-Hant",
];

/// Language preferences, passed to the selector at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguagePriority {
    /// Explicit ranking, applies to both track kinds.
    pub priority: Vec<String>,
    /// Additional languages eligible for auto-captions, ranked after `priority`.
    pub auto_allowlist: Vec<String>,
    /// Accept manual tracks in any language.
    pub manual_any_language: bool,
}

impl Default for LanguagePriority {
    fn default() -> Self {
        Self {
            priority: DEFAULT_PRIORITY.iter().map(|s| s.to_string()).collect(),
            auto_allowlist: DEFAULT_AUTO_ALLOWLIST.iter().map(|s| s.to_string()).collect(),
            manual_any_language: true,
        }
    }
}

/// Sort key; smaller is better.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct TrackRank {
    kind: u8,
    language: usize,
    tag: String,
}

/// Picks at most one caption track per video.
#[derive(Debug, Clone, Default)]
pub struct LanguageSelector {
    priority: LanguagePriority,
}

impl LanguageSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_priority(priority: LanguagePriority) -> Self {
        Self { priority }
    }

    pub fn priority(&self) -> &LanguagePriority {
        &self.priority
    }

    /// The best track across both kinds.
    pub fn select(&self, tracks: &[CaptionTrack]) -> Option<CaptionTrack> {
        self.rank_candidates(tracks).into_iter().next()
    }

    /// The best track of one kind.
    pub fn select_kind(&self, kind: TrackKind, tracks: &[CaptionTrack]) -> Option<CaptionTrack> {
        let selected = self
            .rank_candidates(tracks)
            .into_iter()
            .find(|t| t.kind == kind);
        debug!(
            kind = %kind,
            offered = tracks.iter().filter(|t| t.kind == kind).count(),
            selected = ?selected.as_ref().map(|t| t.language.as_str()),
            "Language selection"
        );
        selected
    }

    /// Eligible tracks, best first, with duplicates removed.
    ///
    /// The order depends only on the set of tracks, not on input order.
    pub fn rank_candidates(&self, tracks: &[CaptionTrack]) -> Vec<CaptionTrack> {
        let mut seen = FxHashSet::default();
        let mut ranked: Vec<(TrackRank, &CaptionTrack)> = tracks
            .iter()
            .filter(|t| seen.insert((t.kind, t.language.as_str())))
            .filter_map(|t| self.rank(t).map(|r| (r, t)))
            .collect();

        ranked.sort_by(|a, b| a.0.cmp(&b.0));
        ranked.into_iter().map(|(_, t)| t.clone()).collect()
    }

    /// Rank of a track, `None` when it is not eligible.
    fn rank(&self, track: &CaptionTrack) -> Option<TrackRank> {
        let listed = self.language_rank(&track.language);
        let language = match (track.kind, listed) {
            (_, Some(rank)) => rank,
            (TrackKind::Manual, None) if self.priority.manual_any_language => self.unlisted_rank(),
            _ => return None,
        };
        Some(TrackRank {
            kind: kind_rank(track.kind),
            language,
            tag: track.language.clone(),
        })
    }

    /// Index in `priority`, else `priority.len()` + index in `auto_allowlist`.
    fn language_rank(&self, language: &str) -> Option<usize> {
        let position = |list: &[String]| list.iter().position(|l| l.eq_ignore_ascii_case(language));

        position(&self.priority.priority).or_else(|| {
            position(&self.priority.auto_allowlist).map(|i| self.priority.priority.len() + i)
        })
    }

    fn unlisted_rank(&self) -> usize {
        self.priority.priority.len() + self.priority.auto_allowlist.len()
    }
}

fn kind_rank(kind: TrackKind) -> u8 {
    match kind {
        TrackKind::Manual => 0,
        TrackKind::Auto => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn selector() -> LanguageSelector {
        LanguageSelector::new()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(selector().select(&[]), None);
    }

    #[test]
    fn test_manual_beats_auto() {
        let tracks = vec![CaptionTrack::auto("en"), CaptionTrack::manual("zh-TW")];
        assert_eq!(selector().select(&tracks), Some(CaptionTrack::manual("zh-TW")));
    }

    #[rstest]
    #[case(&["zh-Hant", "en-GB", "en"], "en")]
    #[case(&["zh-TW", "zh-Hans"], "zh-Hans")]
    #[case(&["en-AU", "zh"], "en-AU")]
    #[case(&["zh", "en-IN"], "en-IN")]
    fn test_auto_language_order(#[case] langs: &[&str], #[case] expected: &str) {
        let tracks: Vec<_> = langs.iter().map(|l| CaptionTrack::auto(*l)).collect();
        assert_eq!(
            selector().select(&tracks),
            Some(CaptionTrack::auto(expected))
        );
    }

    #[test]
    fn test_auto_outside_allowlist_is_never_selected() {
        let tracks = vec![CaptionTrack::auto("fr"), CaptionTrack::auto("de")];
        assert_eq!(selector().select(&tracks), None);
        assert_eq!(selector().select_kind(TrackKind::Auto, &tracks), None);
    }

    #[test]
    fn test_manual_unlisted_language_accepted_last() {
        let tracks = vec![
            CaptionTrack::manual("fr"),
            CaptionTrack::manual("de"),
            CaptionTrack::manual("en-CA"),
        ];
        let ranked = selector().rank_candidates(&tracks);
        assert_eq!(
            ranked,
            vec![
                CaptionTrack::manual("en-CA"),
                CaptionTrack::manual("de"),
                CaptionTrack::manual("fr"),
            ]
        );
    }

    #[test]
    fn test_manual_unlisted_rejected_when_disabled() {
        let sel = LanguageSelector::with_priority(LanguagePriority {
            manual_any_language: false,
            ..Default::default()
        });
        let tracks = vec![CaptionTrack::manual("fr"), CaptionTrack::auto("en")];
        assert_eq!(sel.select(&tracks), Some(CaptionTrack::auto("en")));
        assert_eq!(sel.select_kind(TrackKind::Manual, &tracks), None);
    }

    #[test]
    fn test_select_kind_filters() {
        let tracks = vec![CaptionTrack::manual("en"), CaptionTrack::auto("en")];
        assert_eq!(
            selector().select_kind(TrackKind::Auto, &tracks),
            Some(CaptionTrack::auto("en"))
        );
    }

    #[test]
    fn test_deterministic_regardless_of_order() {
        let mut tracks = vec![
            CaptionTrack::manual("ja"),
            CaptionTrack::auto("zh"),
            CaptionTrack::manual("ko"),
            CaptionTrack::auto("en-US"),
            CaptionTrack::manual("ja"),
        ];
        let first = selector().rank_candidates(&tracks);
        tracks.reverse();
        let second = selector().rank_candidates(&tracks);
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
        assert_eq!(selector().select(&tracks), Some(CaptionTrack::manual("ja")));
    }

    #[test]
    fn test_custom_priority() {
        let sel = LanguageSelector::with_priority(LanguagePriority {
            priority: vec!["ja".into()],
            auto_allowlist: vec!["ja".into(), "en".into()],
            manual_any_language: true,
        });
        let tracks = vec![CaptionTrack::auto("en"), CaptionTrack::auto("ja")];
        assert_eq!(sel.select(&tracks), Some(CaptionTrack::auto("ja")));
    }

    #[test]
    fn test_case_insensitive_match() {
        let tracks = vec![CaptionTrack::auto("EN-us")];
        assert_eq!(selector().select(&tracks), Some(CaptionTrack::auto("EN-us")));
    }
}
