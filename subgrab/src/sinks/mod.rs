//! Downstream consumers of acquisition results.

mod stdout;
mod text_file;

pub use stdout::StdoutSink;
pub use text_file::{FINAL_DIR, TextFileSink};

use async_trait::async_trait;
use std::fmt::Write as _;
use std::path::Path;
use yt_source::media::VideoCandidate;

use crate::Result;
use crate::domain::AcquisitionResult;
use crate::utils::fs;

/// Receives each result after it has been recorded in the ledger.
#[async_trait]
pub trait TranscriptSink: Send + Sync {
    /// Where `deliver` will put the transcript, as recorded in the ledger's
    /// `subtitle_path` column. Must not have side effects.
    fn reference(&self, result: &AcquisitionResult) -> Option<String>;

    async fn deliver(&self, result: &AcquisitionResult) -> Result<()>;
}

/// Header block plus transcript body.
pub fn compose_transcript(result: &AcquisitionResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Title: {}", result.title);
    let _ = writeln!(out, "URL: {}", result.url);
    let _ = writeln!(out, "Upload Date: {}", result.display_upload_date());
    let _ = writeln!(
        out,
        "Channel: {}",
        result.channel.as_deref().unwrap_or("Unknown")
    );
    let duration = result.display_duration();
    if !duration.is_empty() {
        let _ = writeln!(out, "Duration: {duration}");
    }
    let _ = writeln!(out, "Source: {}", result.subtitle_source);
    out.push('\n');

    if result.has_text() {
        let language = if result.languages.is_empty() {
            "unknown"
        } else {
            result.languages.as_str()
        };
        let _ = writeln!(out, "--- Subtitle ({language}) ---");
        out.push_str(result.subtitle_text.trim_end());
        out.push('\n');
    } else {
        out.push_str("No transcript available.\n");
    }
    out
}

/// Write one URL per line.
pub async fn write_url_list(path: &Path, candidates: &[VideoCandidate]) -> Result<()> {
    let mut body = String::new();
    for c in candidates {
        body.push_str(&c.url);
        body.push('\n');
    }
    fs::write_file("writing URL list", path, body).await
}
