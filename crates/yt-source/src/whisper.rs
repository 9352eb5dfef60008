//! Local transcription through the `openai-whisper` command line.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{SourceError, TranscribeError};
use crate::media::{AudioBlob, Transcript, VideoCandidate};
use crate::source::Transcriber;
use crate::ytdlp::YtDlp;

pub const DEFAULT_WHISPER_PATH: &str = "whisper";
pub const DEFAULT_WHISPER_MODEL: &str = "base";
const WHISPER_PATH_ENV: &str = "WHISPER_PATH";

#[derive(Debug, Deserialize)]
struct WhisperOutput {
    #[serde(default)]
    text: String,
    #[serde(default)]
    segments: Vec<WhisperSegment>,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    #[serde(default)]
    text: String,
}

impl WhisperOutput {
    fn into_transcript(self) -> Transcript {
        let lines: Vec<&str> = self
            .segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|s| !s.is_empty())
            .collect();
        let text = if lines.is_empty() {
            self.text.trim().to_string()
        } else {
            lines.join("\n")
        };
        Transcript {
            text,
            language: self.language.filter(|l| !l.is_empty()),
        }
    }
}

/// Transcriber that downloads audio with yt-dlp and runs whisper on it.
#[derive(Debug, Clone)]
pub struct WhisperTranscriber {
    binary_path: String,
    ytdlp: YtDlp,
}

impl WhisperTranscriber {
    /// `binary_path` falls back to `$WHISPER_PATH`, then `whisper` on `PATH`.
    pub fn new(binary_path: Option<String>, ytdlp: YtDlp) -> Self {
        let binary_path = binary_path
            .or_else(|| std::env::var(WHISPER_PATH_ENV).ok())
            .unwrap_or_else(|| DEFAULT_WHISPER_PATH.to_string());
        Self { binary_path, ytdlp }
    }

    pub fn binary_path(&self) -> &str {
        &self.binary_path
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    fn is_available(&self) -> bool {
        process_utils::probe(&self.binary_path, &["--help"])
    }

    async fn fetch_audio(&self, video: &VideoCandidate) -> Result<AudioBlob, SourceError> {
        self.ytdlp.fetch_audio(video).await
    }

    async fn transcribe(
        &self,
        audio: &AudioBlob,
        model: &str,
    ) -> Result<Transcript, TranscribeError> {
        let out_dir = tempfile::Builder::new()
            .prefix("subgrab-whisper-")
            .tempdir()?;

        let mut cmd = process_utils::tokio_command(&self.binary_path);
        cmd.arg(audio.path())
            .args(["--model", model])
            .args(["--output_format", "json"])
            .args(["--verbose", "False"])
            .arg("--output_dir")
            .arg(out_dir.path());
        debug!(command = ?cmd.as_std(), "Running whisper");

        let out = process_utils::run_captured(&mut cmd).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TranscribeError::ModelUnavailable(format!("{} not found", self.binary_path))
            } else {
                TranscribeError::Io(e)
            }
        })?;
        if !out.success() {
            return Err(TranscribeError::Failed(out.diagnostic().to_string()));
        }

        let json_path = output_json_path(out_dir.path(), audio.path());
        let raw = tokio::fs::read_to_string(&json_path).await?;
        let transcript = parse_output(&raw)?;
        debug!(
            language = ?transcript.language,
            chars = transcript.text.len(),
            "Transcription finished"
        );
        Ok(transcript)
    }
}

/// whisper names its output after the input file stem.
fn output_json_path(out_dir: &Path, audio: &Path) -> PathBuf {
    let stem = audio
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());
    out_dir.join(format!("{stem}.json"))
}

fn parse_output(raw: &str) -> Result<Transcript, TranscribeError> {
    let output: WhisperOutput = serde_json::from_str(raw)?;
    Ok(output.into_transcript())
}
