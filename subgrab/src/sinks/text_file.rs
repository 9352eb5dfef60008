use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{TranscriptSink, compose_transcript};
use crate::Result;
use crate::domain::AcquisitionResult;
use crate::utils::filename::transcript_file_name;
use crate::utils::fs;

/// Subdirectory of the output directory holding transcript files.
pub const FINAL_DIR: &str = "final";

/// Writes one text file per video under `<output_dir>/final/`.
///
/// Results without text produce no file. Re-runs overwrite.
#[derive(Debug, Clone)]
pub struct TextFileSink {
    output_dir: PathBuf,
}

impl TextFileSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[async_trait]
impl TranscriptSink for TextFileSink {
    fn reference(&self, result: &AcquisitionResult) -> Option<String> {
        if !result.has_text() {
            return None;
        }
        let name = transcript_file_name(result.channel.as_deref(), &result.title, &result.video_id);
        Some(format!("{FINAL_DIR}/{name}"))
    }

    async fn deliver(&self, result: &AcquisitionResult) -> Result<()> {
        let Some(relative) = self.reference(result) else {
            return Ok(());
        };
        let path = self.output_dir.join(relative);
        fs::write_file("writing transcript", &path, compose_transcript(result)).await?;
        debug!(path = %path.display(), "Transcript written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SubtitleSource;
    use crate::sinks::tests::sample;

    #[tokio::test]
    async fn test_writes_under_final() {
        let dir = tempfile::tempdir().unwrap();
        let sink = TextFileSink::new(dir.path());
        let result = sample(SubtitleSource::AutoCaption, "hello", "zh");

        let reference = sink.reference(&result).unwrap();
        assert_eq!(reference, "final/YouTube - Chan - A_ talk_ [abc].txt");

        sink.deliver(&result).await.unwrap();
        let written = std::fs::read_to_string(dir.path().join(&reference)).unwrap();
        assert!(written.contains("--- Subtitle (zh) ---\nhello\n"));
    }

    #[tokio::test]
    async fn test_none_result_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let sink = TextFileSink::new(dir.path());
        let result = sample(SubtitleSource::None, "", "");

        assert_eq!(sink.reference(&result), None);
        sink.deliver(&result).await.unwrap();
        assert!(!dir.path().join(FINAL_DIR).exists());
    }
}
