//! yt-dlp backed caption source, channel enumerator and audio fetcher.

mod errors;
mod models;
pub mod version;

use async_trait::async_trait;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::SourceError;
use crate::media::{
    AudioBlob, CaptionTrack, TrackKind, TrackListing, VideoCandidate, VideoProbe,
    channel_videos_url,
};
use crate::source::{CaptionSource, ChannelEnumerator, VideoStream};

pub(crate) use errors::map_ytdlp_error;
use models::{FlatEntry, InfoJson};

pub const DEFAULT_YTDLP_PATH: &str = "yt-dlp";
const YTDLP_PATH_ENV: &str = "YTDLP_PATH";

/// Settings shared by every yt-dlp invocation.
#[derive(Debug, Clone, Default)]
pub struct YtDlpConfig {
    /// Explicit binary; falls back to `$YTDLP_PATH`, then `yt-dlp` on `PATH`.
    pub binary_path: Option<String>,
    /// Netscape cookie file, passed only when it exists at call time.
    pub cookie_file: Option<PathBuf>,
    /// Appended verbatim to every invocation.
    pub extra_args: Vec<String>,
}

impl YtDlpConfig {
    pub fn binary_path(&self) -> String {
        self.binary_path
            .clone()
            .or_else(|| std::env::var(YTDLP_PATH_ENV).ok())
            .unwrap_or_else(|| DEFAULT_YTDLP_PATH.to_string())
    }

    fn cookie_args(&self) -> Vec<String> {
        match &self.cookie_file {
            Some(path) if path.is_file() => {
                vec!["--cookies".to_owned(), path.to_string_lossy().into_owned()]
            }
            _ => Vec::new(),
        }
    }
}

/// Handle to the yt-dlp binary. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct YtDlp {
    config: YtDlpConfig,
}

impl YtDlp {
    pub fn new(config: YtDlpConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &YtDlpConfig {
        &self.config
    }

    pub fn is_available(&self) -> bool {
        process_utils::probe(self.config.binary_path(), &["--version"])
    }

    fn command(&self) -> tokio::process::Command {
        let mut cmd = process_utils::tokio_command(self.config.binary_path());
        cmd.arg("--no-warnings")
            .args(self.config.cookie_args())
            .args(&self.config.extra_args);
        cmd
    }

    async fn run(&self, mut cmd: tokio::process::Command) -> Result<String, SourceError> {
        debug!(command = ?cmd.as_std(), "Running yt-dlp");
        let out = process_utils::run_captured(&mut cmd)
            .await
            .map_err(|e| spawn_error(&self.config.binary_path(), e))?;

        if !out.success() {
            return Err(map_ytdlp_error(out.diagnostic()));
        }
        Ok(out.stdout)
    }

    async fn info_json(&self, url: &str) -> Result<InfoJson, SourceError> {
        let mut cmd = self.command();
        cmd.args(["-J", "--skip-download", "--no-playlist"]).arg(url);
        let stdout = self.run(cmd).await?;
        Ok(serde_json::from_str(&stdout)?)
    }

    /// Download into a fresh scratch directory and return it with the produced files.
    async fn download_to_scratch(
        &self,
        args: &[&str],
        url: &str,
    ) -> Result<(tempfile::TempDir, Vec<PathBuf>), SourceError> {
        let scratch = tempfile::Builder::new().prefix("subgrab-").tempdir()?;
        let mut cmd = self.command();
        cmd.args(["--no-playlist", "-P"])
            .arg(scratch.path())
            .args(["-o", "%(id)s.%(ext)s"])
            .args(args)
            .arg(url);
        self.run(cmd).await?;

        let files = list_finished_files(scratch.path()).await?;
        Ok((scratch, files))
    }

    /// Fetch the audio track of a video into a scratch directory.
    pub async fn fetch_audio(&self, video: &VideoCandidate) -> Result<AudioBlob, SourceError> {
        let (scratch, files) = self
            .download_to_scratch(&["-f", "bestaudio/best"], &video.url)
            .await?;
        let Some(path) = files.into_iter().next() else {
            return Err(SourceError::VideoUnavailable(format!(
                "no audio produced for {}",
                video.video_id
            )));
        };
        debug!(video_id = %video.video_id, path = %path.display(), "Audio downloaded");
        Ok(AudioBlob::in_scratch(path, scratch))
    }
}

#[async_trait]
impl CaptionSource for YtDlp {
    async fn list_tracks(&self, video: &VideoCandidate) -> Result<TrackListing, SourceError> {
        let info = self.info_json(&video.url).await?;
        Ok(info.into_listing(&video.url))
    }

    async fn fetch_track_text(
        &self,
        video: &VideoCandidate,
        track: &CaptionTrack,
    ) -> Result<String, SourceError> {
        let write_flag = match track.kind {
            TrackKind::Manual => "--write-subs",
            TrackKind::Auto => "--write-auto-subs",
        };
        let args = [
            "--skip-download",
            write_flag,
            "--sub-format",
            "vtt",
            "--sub-langs",
            track.language.as_str(),
        ];
        let (_scratch, files) = self.download_to_scratch(&args, &video.url).await?;

        let Some(vtt) = files
            .iter()
            .find(|p| p.extension().is_some_and(|e| e.eq_ignore_ascii_case("vtt")))
        else {
            return Err(SourceError::TrackNotFound(format!(
                "{} {} captions for {}",
                track.kind, track.language, video.video_id
            )));
        };

        let bytes = tokio::fs::read(vtt).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[async_trait]
impl ChannelEnumerator for YtDlp {
    async fn list_videos(&self, channel: &str) -> Result<VideoStream, SourceError> {
        let url = channel_videos_url(channel);
        let mut cmd = self.command();
        cmd.args(["--flat-playlist", "--lazy-playlist", "-j"])
            .arg(&url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        debug!(command = ?cmd.as_std(), "Listing channel videos");

        let mut child = cmd
            .spawn()
            .map_err(|e| spawn_error(&self.config.binary_path(), e))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SourceError::Other("yt-dlp stdout not captured".into()))?;
        let stderr = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut buf = String::new();
                let _ = stderr.read_to_string(&mut buf).await;
                buf
            })
        });

        let state = ListingState {
            lines: BufReader::new(stdout).lines(),
            child,
            stderr,
            yielded: 0,
            done: false,
        };
        Ok(futures::stream::unfold(state, ListingState::next).boxed())
    }

    async fn probe_video(&self, url: &str) -> Result<VideoProbe, SourceError> {
        let info = self.info_json(url).await?;
        Ok(VideoProbe {
            channel: info.channel_name(),
            candidate: info.candidate(url),
        })
    }
}

/// Child process state behind a channel listing stream.
struct ListingState {
    lines: Lines<BufReader<ChildStdout>>,
    child: Child,
    stderr: Option<JoinHandle<String>>,
    yielded: usize,
    done: bool,
}

impl ListingState {
    async fn next(mut self) -> Option<(Result<VideoCandidate, SourceError>, Self)> {
        if self.done {
            return None;
        }
        loop {
            match self.lines.next_line().await {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<FlatEntry>(&line) {
                        Ok(entry) => {
                            if let Some(candidate) = entry.into_candidate() {
                                self.yielded += 1;
                                return Some((Ok(candidate), self));
                            }
                        }
                        Err(e) => warn!(error = %e, "Skipping unparsable listing entry"),
                    }
                }
                Ok(None) => {
                    self.done = true;
                    let status = self.child.wait().await;
                    let stderr = match self.stderr.take() {
                        Some(handle) => handle.await.unwrap_or_default(),
                        None => String::new(),
                    };
                    return self.finish(status, &stderr);
                }
                Err(e) => {
                    self.done = true;
                    return Some((Err(e.into()), self));
                }
            }
        }
    }

    fn finish(
        self,
        status: std::io::Result<ExitStatus>,
        stderr: &str,
    ) -> Option<(Result<VideoCandidate, SourceError>, Self)> {
        let failed = !status.as_ref().is_ok_and(|s| s.success());
        if !failed {
            return None;
        }
        if self.yielded == 0 {
            let err = match status {
                Err(e) => SourceError::Io(e),
                Ok(_) => map_ytdlp_error(stderr),
            };
            return Some((Err(err), self));
        }
        warn!(
            entries = self.yielded,
            error = %stderr.trim(),
            "Channel listing ended with an error after partial output"
        );
        None
    }
}

fn spawn_error(binary: &str, e: std::io::Error) -> SourceError {
    if e.kind() == std::io::ErrorKind::NotFound {
        SourceError::ToolUnavailable(format!("{binary} not found; install yt-dlp"))
    } else {
        SourceError::Io(e)
    }
}

/// Completed files in a download directory, sorted by name.
async fn list_finished_files(dir: &Path) -> Result<Vec<PathBuf>, SourceError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let partial = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| matches!(e, "part" | "ytdl" | "temp"));
        if !partial && entry.file_type().await?.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
