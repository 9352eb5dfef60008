use crate::error::SourceError;

const RATE_LIMIT_MARKERS: &[&str] = &[
    "http error 429",
    "too many requests",
    "rate-limit",
    "rate limit",
    "rate-limited",
    "not a bot",
];

const UNAVAILABLE_MARKERS: &[&str] = &[
    "video unavailable",
    "private video",
    "has been removed",
    "been terminated",
    "no longer available",
    "does not exist",
    "http error 404",
    "members-only",
    "join this channel",
    "sign in to confirm your age",
    "age-restricted",
    "not available in your country",
    "is not a valid url",
    "unsupported url",
];

const TRACK_MARKERS: &[&str] = &[
    "there are no subtitles",
    "no subtitles for the requested",
    "subtitles are not available",
    "no automatic captions",
];

const TRANSIENT_MARKERS: &[&str] = &[
    "timed out",
    "timeout",
    "connection reset",
    "connection refused",
    "connection aborted",
    "remote end closed",
    "temporary failure in name resolution",
    "network is unreachable",
    "incompleteread",
    "http error 500",
    "http error 502",
    "http error 503",
    "http error 504",
];

/// Classify a yt-dlp error message.
///
/// Rate limiting is checked first: a 429 page can also mention availability.
pub(crate) fn map_ytdlp_error(msg: &str) -> SourceError {
    let lower = msg.to_lowercase();
    let has = |markers: &[&str]| markers.iter().any(|m| lower.contains(m));
    let msg = last_error_line(msg);

    if has(RATE_LIMIT_MARKERS) {
        SourceError::RateLimited(msg)
    } else if has(TRACK_MARKERS) {
        SourceError::TrackNotFound(msg)
    } else if has(UNAVAILABLE_MARKERS) {
        SourceError::VideoUnavailable(msg)
    } else if has(TRANSIENT_MARKERS) {
        SourceError::Transient(msg)
    } else {
        SourceError::Other(msg)
    }
}

/// yt-dlp prints warnings before the final `ERROR:` line; keep the error.
fn last_error_line(msg: &str) -> String {
    msg.lines()
        .rev()
        .find(|l| l.trim_start().starts_with("ERROR"))
        .or_else(|| msg.lines().rev().find(|l| !l.trim().is_empty()))
        .unwrap_or(msg)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_rate_limited() {
        let e = map_ytdlp_error("ERROR: [youtube] abc: HTTP Error 429: Too Many Requests");
        assert!(matches!(e, SourceError::RateLimited(_)));
        assert!(e.is_transient());
    }

    #[test]
    fn test_map_unavailable() {
        let e = map_ytdlp_error(
            "WARNING: something\nERROR: [youtube] abc: Video unavailable. This video has been removed by the uploader",
        );
        match e {
            SourceError::VideoUnavailable(msg) => assert!(msg.starts_with("ERROR")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_map_private() {
        let e = map_ytdlp_error("ERROR: [youtube] abc: Private video. Sign in if you've been granted access");
        assert!(e.is_definitive());
    }

    #[test]
    fn test_map_no_subtitles() {
        let e = map_ytdlp_error("WARNING: There are no subtitles for the requested languages");
        assert!(matches!(e, SourceError::TrackNotFound(_)));
    }

    #[test]
    fn test_map_transient() {
        let e = map_ytdlp_error("ERROR: Unable to download webpage: <urlopen error timed out>");
        assert!(matches!(e, SourceError::Transient(_)));
        let e = map_ytdlp_error("ERROR: [Errno 104] Connection reset by peer");
        assert!(matches!(e, SourceError::Transient(_)));
    }

    #[test]
    fn test_map_unknown_is_retryable() {
        let e = map_ytdlp_error("ERROR: something new and strange");
        assert!(matches!(e, SourceError::Other(_)));
        assert!(e.is_transient());
    }
}
