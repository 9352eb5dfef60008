//! Pipeline controller: enumerate, filter against the ledger, acquire,
//! record, deliver.
//!
//! Videos are processed one at a time, in enumeration order. Only ledger
//! write failures and enumeration failures end a run early; everything that
//! goes wrong for a single video ends up as a `none` row instead.

use futures::StreamExt;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use yt_source::ChannelEnumerator;
use yt_source::media::{VideoCandidate, parse_video_id};

use crate::acquisition::AcquisitionMachine;
use crate::domain::{AcquisitionResult, LedgerEntry, SubtitleSource};
use crate::ledger::ResumeLedger;
use crate::sinks::{TranscriptSink, write_url_list};
use crate::{Error, Result};

/// What to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// Every upload of a channel, by handle (without `@`).
    Channel { handle: String },
    /// One video; `channel` is looked up when not given.
    Video { url: String, channel: Option<String> },
}

impl SourceSpec {
    pub fn channel(handle: &str) -> Result<Self> {
        let handle = handle.trim().trim_start_matches('@').trim();
        if handle.is_empty() {
            return Err(Error::config("channel handle must not be empty"));
        }
        Ok(Self::Channel {
            handle: handle.to_string(),
        })
    }

    pub fn video(url: &str, channel: Option<String>) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::config("video URL must not be empty"));
        }
        Ok(Self::Video {
            url: url.to_string(),
            channel: channel.filter(|c| !c.trim().is_empty()),
        })
    }
}

/// How ledgered videos are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Skip videos already in the ledger.
    Incremental,
    /// Process everything; ledgered videos are counted and their rows replaced.
    Reprocess,
    /// Process everything without consulting the ledger.
    Full,
}

impl FilterMode {
    /// `full` wins over `incremental`.
    pub fn resolve(incremental: bool, full: bool) -> Self {
        match (full, incremental) {
            (true, _) => Self::Full,
            (false, true) => Self::Incremental,
            (false, false) => Self::Reprocess,
        }
    }
}

/// Per-run options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Cap on videos processed after filtering; `None` or `Some(0)` is unbounded.
    pub limit: Option<usize>,
    pub incremental: bool,
    pub full: bool,
    /// Where to write the selected URLs before processing starts.
    pub url_list: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            limit: None,
            incremental: true,
            full: false,
            url_list: None,
        }
    }
}

impl RunOptions {
    pub fn mode(&self) -> FilterMode {
        FilterMode::resolve(self.incremental, self.full)
    }

    fn effective_limit(&self) -> Option<usize> {
        self.limit.filter(|&l| l > 0)
    }
}

/// Outcome of one processed video, as reported to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoReport {
    pub video_id: String,
    pub title: String,
    pub url: String,
    pub subtitle_source: SubtitleSource,
    pub languages: String,
    pub subtitle_path: Option<String>,
}

/// Counts and per-video outcomes of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub channel: Option<String>,
    pub mode: FilterMode,
    /// Candidates pulled from the source.
    pub enumerated: usize,
    /// Candidates skipped as already ledgered or listed earlier in the run.
    pub skipped: usize,
    pub processed: usize,
    /// Processed candidates that were already ledgered.
    pub reprocessed: usize,
    pub results: Vec<VideoReport>,
}

impl RunSummary {
    fn new(channel: Option<String>, mode: FilterMode) -> Self {
        Self {
            channel,
            mode,
            enumerated: 0,
            skipped: 0,
            processed: 0,
            reprocessed: 0,
            results: Vec::new(),
        }
    }

    pub fn count(&self, source: SubtitleSource) -> usize {
        self.results
            .iter()
            .filter(|r| r.subtitle_source == source)
            .count()
    }
}

/// Candidates chosen for processing plus the bookkeeping from choosing them.
struct Selection {
    channel: Option<String>,
    candidates: Vec<VideoCandidate>,
    enumerated: usize,
    skipped: usize,
    reprocessed: usize,
    /// Ids already selected in this run.
    selected: FxHashSet<String>,
}

/// Top-level loop over candidates. Owns the ledger for the run.
pub struct PipelineController {
    enumerator: Arc<dyn ChannelEnumerator>,
    machine: AcquisitionMachine,
    ledger: ResumeLedger,
    sink: Option<Arc<dyn TranscriptSink>>,
}

impl PipelineController {
    pub fn new(
        enumerator: Arc<dyn ChannelEnumerator>,
        machine: AcquisitionMachine,
        ledger: ResumeLedger,
    ) -> Self {
        Self {
            enumerator,
            machine,
            ledger,
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn TranscriptSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn ledger(&self) -> &ResumeLedger {
        &self.ledger
    }

    /// Run once over `spec`.
    pub async fn run(&mut self, spec: &SourceSpec, options: &RunOptions) -> Result<RunSummary> {
        let mode = options.mode();
        let selection = match spec {
            SourceSpec::Channel { handle } => self.select_from_channel(handle, options).await?,
            SourceSpec::Video { url, channel } => {
                let (candidate, channel) = self.resolve_video(url, channel.as_deref()).await?;
                self.select(Some(channel), std::iter::once(candidate), options)
            }
        };

        let mut summary = RunSummary::new(selection.channel.clone(), mode);
        summary.enumerated = selection.enumerated;
        summary.skipped = selection.skipped;
        summary.reprocessed = selection.reprocessed;

        if selection.candidates.is_empty() {
            info!(skipped = selection.skipped, "No new videos to process");
            return Ok(summary);
        }

        if let Some(path) = &options.url_list {
            write_url_list(path, &selection.candidates).await?;
            info!(
                count = selection.candidates.len(),
                path = %path.display(),
                "Saved video URLs"
            );
        }

        let total = selection.candidates.len();
        for (idx, candidate) in selection.candidates.iter().enumerate() {
            info!("[{}/{}] {}", idx + 1, total, candidate.display_name());
            let result = self
                .machine
                .acquire(candidate, selection.channel.as_deref())
                .await;
            let report = self.record(result).await?;
            summary.processed += 1;
            summary.results.push(report);
        }

        info!(
            processed = summary.processed,
            skipped = summary.skipped,
            manual = summary.count(SubtitleSource::Manual),
            auto_caption = summary.count(SubtitleSource::AutoCaption),
            whisper = summary.count(SubtitleSource::Whisper),
            none = summary.count(SubtitleSource::None),
            "Run finished"
        );
        Ok(summary)
    }

    /// Ledger first, then the sink. A ledger failure aborts the run; a sink
    /// failure only costs this video's artifact.
    async fn record(&mut self, result: AcquisitionResult) -> Result<VideoReport> {
        let reference = self.sink.as_ref().and_then(|s| s.reference(&result));
        self.ledger
            .append(LedgerEntry::from_result(&result, reference.clone()))?;

        if let Some(sink) = &self.sink {
            if let Err(e) = sink.deliver(&result).await {
                warn!(video_id = %result.video_id, error = %e, "Failed to deliver transcript");
            }
        }

        info!(
            video_id = %result.video_id,
            source = %result.subtitle_source,
            language = %result.languages,
            "Recorded"
        );
        Ok(VideoReport {
            video_id: result.video_id,
            title: result.title,
            url: result.url,
            subtitle_source: result.subtitle_source,
            languages: result.languages,
            subtitle_path: reference,
        })
    }

    async fn select_from_channel(&self, handle: &str, options: &RunOptions) -> Result<Selection> {
        info!(channel = %handle, "Fetching channel entries");
        let mut stream = self
            .enumerator
            .list_videos(handle)
            .await
            .map_err(|e| Error::enumeration(format!("listing @{handle}: {e}")))?;

        let limit = options.effective_limit();
        let mode = options.mode();
        let mut selection = Selection {
            channel: Some(handle.to_string()),
            candidates: Vec::new(),
            enumerated: 0,
            skipped: 0,
            reprocessed: 0,
            selected: FxHashSet::default(),
        };

        while limit.is_none_or(|l| selection.candidates.len() < l) {
            let Some(item) = stream.next().await else {
                break;
            };
            let candidate =
                item.map_err(|e| Error::enumeration(format!("listing @{handle}: {e}")))?;
            selection.enumerated += 1;
            self.consider(&mut selection, candidate, mode);
        }
        // Dropping the stream stops the listing once the limit is met.
        drop(stream);

        if selection.enumerated == 0 {
            return Err(Error::enumeration("no entries retrieved from the channel"));
        }
        if let Some(l) = limit {
            debug!(limit = l, selected = selection.candidates.len(), "Limit applied");
        }
        Ok(selection)
    }

    fn select(
        &self,
        channel: Option<String>,
        candidates: impl IntoIterator<Item = VideoCandidate>,
        options: &RunOptions,
    ) -> Selection {
        let limit = options.effective_limit();
        let mode = options.mode();
        let mut selection = Selection {
            channel,
            candidates: Vec::new(),
            enumerated: 0,
            skipped: 0,
            reprocessed: 0,
            selected: FxHashSet::default(),
        };
        for candidate in candidates {
            if limit.is_some_and(|l| selection.candidates.len() >= l) {
                break;
            }
            selection.enumerated += 1;
            self.consider(&mut selection, candidate, mode);
        }
        selection
    }

    /// A repeated id counts as already ledgered: within one run it has been
    /// recorded by the time the repeat would be processed.
    fn consider(&self, selection: &mut Selection, candidate: VideoCandidate, mode: FilterMode) {
        let repeated = selection.selected.contains(&candidate.video_id);
        match mode {
            FilterMode::Full => {}
            FilterMode::Incremental | FilterMode::Reprocess if repeated => {
                debug!(video_id = %candidate.video_id, "Listed twice, skipping repeat");
                selection.skipped += 1;
                return;
            }
            FilterMode::Incremental if self.ledger.contains(&candidate.video_id) => {
                debug!(video_id = %candidate.video_id, "Already in ledger, skipping");
                selection.skipped += 1;
                return;
            }
            FilterMode::Incremental => {}
            FilterMode::Reprocess => {
                if self.ledger.contains(&candidate.video_id) {
                    selection.reprocessed += 1;
                }
            }
        }
        selection.selected.insert(candidate.video_id.clone());
        selection.candidates.push(candidate);
    }

    /// Candidate and channel name for a single-video request.
    ///
    /// The id is parsed locally; the enumerator is only asked when that
    /// fails or the channel is unknown.
    async fn resolve_video(
        &self,
        url: &str,
        channel: Option<&str>,
    ) -> Result<(VideoCandidate, String)> {
        let parsed = parse_video_id(url).map(|id| VideoCandidate::new(id, url));
        if let (Some(candidate), Some(channel)) = (&parsed, channel) {
            return Ok((candidate.clone(), channel.to_string()));
        }

        info!(url, "Extracting channel name from video metadata");
        let probe = self
            .enumerator
            .probe_video(url)
            .await
            .map_err(|e| Error::enumeration(format!("resolving {url}: {e}")))?;

        let channel = channel
            .map(str::to_owned)
            .or(probe.channel)
            .ok_or_else(|| {
                Error::enumeration("could not determine channel name from video metadata; pass one explicitly")
            })?;
        info!(channel = %channel, "Detected channel");
        Ok((parsed.unwrap_or(probe.candidate), channel))
    }
}
