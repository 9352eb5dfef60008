//! Filename construction for transcript files.
//!
//! Video titles routinely contain `?`, `:`, `|` and other characters that
//! Windows rejects, and CJK titles must survive untouched.

/// Characters that are invalid in Windows filenames
const WINDOWS_INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Windows reserved filenames (case-insensitive)
const WINDOWS_RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Longest title fragment kept in a transcript filename, in characters.
const MAX_TITLE_CHARS: usize = 120;

/// Sanitize a string for use in filenames across all platforms.
///
/// Control and Windows-invalid characters become `_` (runs collapse to one),
/// leading/trailing spaces and dots are trimmed, reserved device names get a
/// `_` prefix and an empty result becomes `unnamed`.
pub fn sanitize_filename(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut last_was_replacement = false;

    for c in input.chars() {
        if c.is_control() || WINDOWS_INVALID_CHARS.contains(&c) {
            if !last_was_replacement {
                result.push('_');
                last_was_replacement = true;
            }
        } else {
            result.push(c);
            last_was_replacement = false;
        }
    }

    let trimmed = result.trim_matches(|c| c == ' ' || c == '.');
    if trimmed.is_empty() {
        return "unnamed".to_string();
    }

    let upper = trimmed.to_uppercase();
    let stem = upper.split('.').next().unwrap_or(&upper);
    if WINDOWS_RESERVED_NAMES.contains(&stem) {
        return format!("_{trimmed}");
    }

    trimmed.to_string()
}

/// Cut `input` to at most `max` characters, never splitting a character.
fn truncate_chars(input: &str, max: usize) -> &str {
    match input.char_indices().nth(max) {
        Some((idx, _)) => &input[..idx],
        None => input,
    }
}

/// Channel handle without `@`, safe for directory and file names.
pub fn channel_slug(handle: &str) -> String {
    sanitize_filename(handle.trim().trim_start_matches('@'))
}

/// `YouTube - <channel> - <title> [<id>].txt`
pub fn transcript_file_name(channel: Option<&str>, title: &str, video_id: &str) -> String {
    let channel = channel
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or("Unknown");
    let title = truncate_chars(title.trim(), MAX_TITLE_CHARS);
    let name = format!("YouTube - {channel} - {title} [{video_id}]");
    format!("{}.txt", sanitize_filename(&name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_string() {
        assert_eq!(sanitize_filename(""), "unnamed");
        assert_eq!(sanitize_filename(" .. "), "unnamed");
    }

    #[test]
    fn test_windows_reserved_names() {
        assert_eq!(sanitize_filename("CON"), "_CON");
        assert_eq!(sanitize_filename("nul.txt"), "_nul.txt");
        assert_eq!(sanitize_filename("CONSOLE"), "CONSOLE");
    }

    #[test]
    fn test_invalid_runs_collapse() {
        assert_eq!(sanitize_filename("Q&A: why? | part 1"), "Q&A_ why_ _ part 1");
        assert_eq!(sanitize_filename("a<>:\"b"), "a_b");
        assert_eq!(sanitize_filename("tab\there"), "tab_here");
    }

    #[test]
    fn test_cjk_titles_survive() {
        assert_eq!(sanitize_filename("观看一只青蛙?"), "观看一只青蛙_");
        assert_eq!(sanitize_filename("こんにちは"), "こんにちは");
    }

    #[test]
    fn test_idempotency() {
        for input in ["hello?world", "观看一只青蛙?", "CON", "  test  ", "...dots..."] {
            let once = sanitize_filename(input);
            assert_eq!(once, sanitize_filename(&once), "input: {input}");
        }
    }

    #[test]
    fn test_channel_slug() {
        assert_eq!(channel_slug("@DanKoeTalks"), "DanKoeTalks");
        assert_eq!(channel_slug(" weird/handle "), "weird_handle");
    }

    #[test]
    fn test_transcript_file_name() {
        assert_eq!(
            transcript_file_name(Some("Dan Koe"), "How to: focus?", "abc123"),
            "YouTube - Dan Koe - How to_ focus_ [abc123].txt"
        );
        assert_eq!(
            transcript_file_name(None, "T", "x"),
            "YouTube - Unknown - T [x].txt"
        );
    }

    #[test]
    fn test_long_title_truncated_on_char_boundary() {
        let title = "字".repeat(300);
        let name = transcript_file_name(Some("c"), &title, "id");
        assert_eq!(name.chars().filter(|c| *c == '字').count(), MAX_TITLE_CHARS);
        assert!(name.ends_with("[id].txt"));
    }
}
