//! WebVTT to plain text conversion.
//!
//! Auto-generated captions repeat each line several times while words are
//! "typed in", so besides stripping cue timings and markup the converter drops
//! every line it has already emitted.

use regex::Regex;
use rustc_hash::FxHashSet;
use std::sync::LazyLock;

static META_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(WEBVTT|Kind:|Language:|STYLE|NOTE|REGION|Region:)").unwrap()
});
static TIMING_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-->\s").unwrap());
static INLINE_TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\d{2}:\d{2}:\d{2}\.\d{3}>").unwrap());
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"</?[^>]+>").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap());

/// Convert raw WebVTT into de-duplicated plain text, one caption line per line.
pub fn vtt_to_text(raw: &str) -> String {
    let mut seen = FxHashSet::default();
    let mut lines = Vec::new();

    for line in raw.lines() {
        if META_LINE.is_match(line) || TIMING_LINE.is_match(line) {
            continue;
        }
        let text = normalize_line(line);
        if text.is_empty() {
            continue;
        }
        if seen.insert(text.clone()) {
            lines.push(text);
        }
    }

    lines.join("\n")
}

fn normalize_line(line: &str) -> String {
    let line = INLINE_TIMESTAMP.replace_all(line, "");
    let line = TAG.replace_all(&line, "");
    let line = unescape_entities(&line);
    WHITESPACE.replace_all(&line, " ").trim().to_string()
}

fn unescape_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    ENTITY
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let body = &caps[1];
            decode_entity(body).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_entity(body: &str) -> Option<String> {
    if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }
    let c = match body {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "lrm" => '\u{200e}',
        "rlm" => '\u{200f}',
        _ => return None,
    };
    Some(c.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTO_VTT: &str = "WEBVTT\n\
Kind: captions\n\
Language: en\n\
\n\
00:00:00.000 --> 00:00:02.000 align:start position:0%\n\
hello<00:00:00.500><c> world</c>\n\
\n\
00:00:02.000 --> 00:00:04.000 align:start position:0%\n\
hello world\n\
this is &amp; a   test\n\
\n\
NOTE a comment\n\
00:00:04.000 --> 00:00:05.000\n\
<i>this is &amp; a test</i>\n";

    #[test]
    fn test_vtt_to_text_strips_and_dedupes() {
        assert_eq!(vtt_to_text(AUTO_VTT), "hello world\nthis is & a test");
    }

    #[test]
    fn test_vtt_to_text_empty() {
        assert_eq!(vtt_to_text("WEBVTT\n\n"), "");
        assert_eq!(vtt_to_text(""), "");
    }

    #[test]
    fn test_unescape_numeric_entities() {
        assert_eq!(unescape_entities("it&#39;s &#x4E2D;&#25991;"), "it's 中文");
        assert_eq!(unescape_entities("&bogus; stays"), "&bogus; stays");
    }

    #[test]
    fn test_preserves_cjk_text() {
        let raw = "WEBVTT\n\n00:00.000 --> 00:01.000\n你好，世界\n";
        assert_eq!(vtt_to_text(raw), "你好，世界");
    }
}
