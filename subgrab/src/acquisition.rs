//! Per-video acquisition state machine.
//!
//! ```text
//! Start -> ManualLookup -hit-> Done(manual)
//!              | miss
//!              v
//!          AutoLookup -hit-> Done(auto-caption)
//!              | miss
//!              v
//!          TranscribeFallback -ok-> Done(whisper)
//!              | disabled / unavailable / failed
//!              v
//!          Done(none)
//! ```
//!
//! Every network step runs under the retry policy. Source errors never leave
//! this module: an exhausted or definitive failure is a miss for that tier.
//! The machine does not touch the ledger.

use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};
use yt_source::media::{CaptionTrack, TrackKind, TrackListing, VideoCandidate, VideoMetadata};
use yt_source::subtitle::vtt_to_text;
use yt_source::{CaptionSource, SourceError, Transcriber};

use crate::domain::{AcquisitionResult, SubtitleSource};
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper, retry_source};
use crate::selector::LanguageSelector;

pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "base";

/// States of one acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionState {
    Start,
    ManualLookup,
    AutoLookup,
    TranscribeFallback,
    Done(SubtitleSource),
}

impl AcquisitionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_))
    }
}

/// Transcription settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionConfig {
    pub enabled: bool,
    pub model: String,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: DEFAULT_TRANSCRIPTION_MODEL.to_string(),
        }
    }
}

/// Track listing cache for one video; `list_tracks` runs at most once.
enum Listing {
    NotFetched,
    Fetched(TrackListing),
    Unavailable,
}

/// Drives the manual -> auto -> transcription fallback chain.
pub struct AcquisitionMachine {
    captions: Arc<dyn CaptionSource>,
    transcriber: Option<Arc<dyn Transcriber>>,
    selector: LanguageSelector,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    transcription: TranscriptionConfig,
    transcriber_ready: OnceLock<bool>,
}

impl AcquisitionMachine {
    pub fn new(captions: Arc<dyn CaptionSource>) -> Self {
        Self {
            captions,
            transcriber: None,
            selector: LanguageSelector::default(),
            retry: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
            transcription: TranscriptionConfig::default(),
            transcriber_ready: OnceLock::new(),
        }
    }

    pub fn with_transcriber(
        mut self,
        transcriber: Arc<dyn Transcriber>,
        config: TranscriptionConfig,
    ) -> Self {
        self.transcriber = Some(transcriber);
        self.transcription = config;
        self
    }

    pub fn with_selector(mut self, selector: LanguageSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Acquire a transcript for `video`. Never fails.
    ///
    /// `channel` fills in the channel name when the source does not report one.
    pub async fn acquire(&self, video: &VideoCandidate, channel: Option<&str>) -> AcquisitionResult {
        self.acquire_traced(video, channel).await.0
    }

    /// Like [`acquire`](Self::acquire), also returning the visited states.
    pub async fn acquire_traced(
        &self,
        video: &VideoCandidate,
        channel: Option<&str>,
    ) -> (AcquisitionResult, Vec<AcquisitionState>) {
        let mut run = Run {
            machine: self,
            video,
            listing: Listing::NotFetched,
            outcome: None,
        };
        let mut state = AcquisitionState::Start;
        let mut trace = vec![state];

        while !state.is_terminal() {
            let next = run.step(state).await;
            debug!(video_id = %video.video_id, from = ?state, to = ?next, "Acquisition transition");
            state = next;
            trace.push(state);
        }

        (run.finish(channel), trace)
    }

    fn transcriber_ready(&self) -> Option<&Arc<dyn Transcriber>> {
        let transcriber = self.transcriber.as_ref()?;
        let ready = *self
            .transcriber_ready
            .get_or_init(|| transcriber.is_available());
        ready.then_some(transcriber)
    }
}

/// Text plus provenance of a successful tier.
struct Outcome {
    source: SubtitleSource,
    text: String,
    language: Option<String>,
}

/// State of a single acquisition.
struct Run<'a> {
    machine: &'a AcquisitionMachine,
    video: &'a VideoCandidate,
    listing: Listing,
    outcome: Option<Outcome>,
}

impl Run<'_> {
    async fn step(&mut self, state: AcquisitionState) -> AcquisitionState {
        match state {
            AcquisitionState::Start => AcquisitionState::ManualLookup,
            AcquisitionState::ManualLookup => {
                if self.caption_tier(TrackKind::Manual).await {
                    AcquisitionState::Done(SubtitleSource::Manual)
                } else {
                    AcquisitionState::AutoLookup
                }
            }
            AcquisitionState::AutoLookup => {
                if self.caption_tier(TrackKind::Auto).await {
                    AcquisitionState::Done(SubtitleSource::AutoCaption)
                } else {
                    AcquisitionState::TranscribeFallback
                }
            }
            AcquisitionState::TranscribeFallback => {
                if self.transcribe_tier().await {
                    AcquisitionState::Done(SubtitleSource::Whisper)
                } else {
                    AcquisitionState::Done(SubtitleSource::None)
                }
            }
            done @ AcquisitionState::Done(_) => done,
        }
    }

    async fn listing(&mut self) -> Option<&TrackListing> {
        if let Listing::NotFetched = self.listing {
            let m = self.machine;
            let video = self.video;
            let fetched = retry_source(&m.retry, m.sleeper.as_ref(), "list_tracks", || {
                m.captions.list_tracks(video)
            })
            .await;
            self.listing = match fetched {
                Ok(listing) => {
                    debug!(
                        video_id = %video.video_id,
                        tracks = listing.tracks.len(),
                        "Caption tracks listed"
                    );
                    Listing::Fetched(listing)
                }
                Err(e) => {
                    warn!(video_id = %video.video_id, error = %e, "Could not list caption tracks");
                    Listing::Unavailable
                }
            };
        }
        match &self.listing {
            Listing::Fetched(listing) => Some(listing),
            _ => None,
        }
    }

    /// Try the best track of `kind`. Returns whether the tier produced text.
    async fn caption_tier(&mut self, kind: TrackKind) -> bool {
        let video = self.video;
        let machine = self.machine;
        let selector = &machine.selector;
        let Some(track) = self
            .listing()
            .await
            .and_then(|l| selector.select_kind(kind, &l.tracks))
        else {
            info!(video_id = %video.video_id, kind = %kind, "No usable caption track");
            return false;
        };

        match self.fetch_text(&track).await {
            Ok(text) if !text.is_empty() => {
                self.outcome = Some(Outcome {
                    source: match kind {
                        TrackKind::Manual => SubtitleSource::Manual,
                        TrackKind::Auto => SubtitleSource::AutoCaption,
                    },
                    text,
                    language: Some(track.language),
                });
                true
            }
            Ok(_) => {
                info!(video_id = %video.video_id, kind = %kind, language = %track.language, "Caption track is empty");
                false
            }
            Err(e) => {
                info!(
                    video_id = %video.video_id,
                    kind = %kind,
                    language = %track.language,
                    error = %e,
                    "Caption download failed, falling through"
                );
                false
            }
        }
    }

    async fn fetch_text(&self, track: &CaptionTrack) -> Result<String, SourceError> {
        let m = self.machine;
        let video = self.video;
        let raw = retry_source(&m.retry, m.sleeper.as_ref(), "fetch_track_text", || {
            m.captions.fetch_track_text(video, track)
        })
        .await?;
        Ok(vtt_to_text(&raw))
    }

    async fn transcribe_tier(&mut self) -> bool {
        let m = self.machine;
        let video = self.video;

        if !m.transcription.enabled {
            info!(video_id = %video.video_id, "No captions and transcription is disabled");
            return false;
        }
        let Some(transcriber) = m.transcriber_ready() else {
            warn!(
                video_id = %video.video_id,
                "Transcription requested but no transcriber is available; skipping"
            );
            return false;
        };

        info!(video_id = %video.video_id, model = %m.transcription.model, "Falling back to transcription");
        let audio = match retry_source(&m.retry, m.sleeper.as_ref(), "fetch_audio", || {
            transcriber.fetch_audio(video)
        })
        .await
        {
            Ok(audio) => audio,
            Err(e) => {
                warn!(video_id = %video.video_id, error = %e, "Audio download failed");
                return false;
            }
        };

        match transcriber.transcribe(&audio, &m.transcription.model).await {
            Ok(t) if !t.text.trim().is_empty() => {
                self.outcome = Some(Outcome {
                    source: SubtitleSource::Whisper,
                    text: t.text,
                    language: t.language,
                });
                true
            }
            Ok(_) => {
                warn!(video_id = %video.video_id, "Transcription produced no text");
                false
            }
            Err(e) => {
                warn!(video_id = %video.video_id, error = %e, "Transcription failed");
                false
            }
        }
    }

    fn finish(self, channel: Option<&str>) -> AcquisitionResult {
        let mut metadata = match self.listing {
            Listing::Fetched(listing) => listing.metadata,
            _ => fallback_metadata(self.video),
        };
        if metadata.title.is_empty() {
            metadata.title = self.video.title.clone().unwrap_or_default();
        }
        if metadata.upload_date.is_none() {
            metadata.upload_date = self.video.upload_date.clone();
        }
        if metadata.channel.is_none() {
            metadata.channel = channel.map(str::to_owned);
        }
        // The candidate's id is authoritative.
        metadata.video_id = self.video.video_id.clone();

        match self.outcome {
            Some(o) => AcquisitionResult::from_metadata(metadata, o.source, o.text, o.language),
            None => AcquisitionResult::none(metadata),
        }
    }
}

fn fallback_metadata(video: &VideoCandidate) -> VideoMetadata {
    VideoMetadata {
        video_id: video.video_id.clone(),
        title: video.title.clone().unwrap_or_default(),
        url: video.url.clone(),
        upload_date: video.upload_date.clone(),
        duration: None,
        channel: None,
    }
}
