//! Hand-written fakes of the source adapters for scenario tests.

#![allow(dead_code)]

use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use subgrab::domain::AcquisitionResult;
use subgrab::sinks::TranscriptSink;
use subgrab::{AcquisitionMachine, Sleeper, TranscriptionConfig};
use yt_source::media::{
    AudioBlob, CaptionTrack, TrackListing, Transcript, VideoCandidate, VideoMetadata, VideoProbe,
};
use yt_source::{
    CaptionSource, ChannelEnumerator, SourceError, TranscribeError, Transcriber, VideoStream,
};

pub const VTT_HELLO: &str = "WEBVTT\n\n00:00.000 --> 00:01.000\nhello\n";

/// Channel listing from a fixed list; counts how many entries were pulled.
#[derive(Default)]
pub struct FakeEnumerator {
    pub videos: Vec<VideoCandidate>,
    pub fail_listing: bool,
    pub probe_channel: Option<String>,
    pub pulled: Arc<AtomicUsize>,
    pub probes: AtomicUsize,
}

impl FakeEnumerator {
    pub fn with_ids(ids: &[&str]) -> Self {
        Self {
            videos: ids
                .iter()
                .map(|id| VideoCandidate::from_id(*id).with_title(format!("Video {id}")))
                .collect(),
            ..Default::default()
        }
    }

    pub fn pulled(&self) -> usize {
        self.pulled.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChannelEnumerator for FakeEnumerator {
    async fn list_videos(&self, _channel: &str) -> Result<VideoStream, SourceError> {
        if self.fail_listing {
            return Err(SourceError::VideoUnavailable("channel does not exist".into()));
        }
        let pulled = self.pulled.clone();
        let stream = futures::stream::iter(self.videos.clone()).map(move |v| {
            pulled.fetch_add(1, Ordering::SeqCst);
            Ok(v)
        });
        Ok(stream.boxed())
    }

    async fn probe_video(&self, url: &str) -> Result<VideoProbe, SourceError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        let id = yt_source::media::parse_video_id(url).unwrap_or_else(|| "probed".into());
        Ok(VideoProbe {
            candidate: VideoCandidate::new(id, url),
            channel: self.probe_channel.clone(),
        })
    }
}

/// Caption tracks per video id, with optional scripted fetch failures.
#[derive(Default)]
pub struct FakeCaptions {
    pub tracks: HashMap<String, Vec<CaptionTrack>>,
    pub fetch_failures: Mutex<VecDeque<SourceError>>,
    pub fetches: AtomicUsize,
}

impl FakeCaptions {
    pub fn with(mut self, id: &str, tracks: Vec<CaptionTrack>) -> Self {
        self.tracks.insert(id.to_string(), tracks);
        self
    }

    pub fn failing_fetches(self, errors: Vec<SourceError>) -> Self {
        *self.fetch_failures.lock() = errors.into();
        self
    }
}

#[async_trait]
impl CaptionSource for FakeCaptions {
    async fn list_tracks(&self, video: &VideoCandidate) -> Result<TrackListing, SourceError> {
        Ok(TrackListing {
            metadata: VideoMetadata {
                video_id: video.video_id.clone(),
                title: video.title.clone().unwrap_or_default(),
                url: video.url.clone(),
                upload_date: Some("20240115".into()),
                duration: Some(300.0),
                channel: Some("Fake Channel".into()),
            },
            tracks: self.tracks.get(&video.video_id).cloned().unwrap_or_default(),
        })
    }

    async fn fetch_track_text(
        &self,
        _video: &VideoCandidate,
        _track: &CaptionTrack,
    ) -> Result<String, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = self.fetch_failures.lock().pop_front() {
            return Err(e);
        }
        Ok(VTT_HELLO.to_string())
    }
}

/// Transcriber that always hears the same words, once its scripted audio
/// failures are used up.
#[derive(Default)]
pub struct FakeTranscriber {
    pub calls: AtomicUsize,
    pub audio_failures: Mutex<VecDeque<SourceError>>,
}

impl FakeTranscriber {
    pub fn failing_audio(errors: Vec<SourceError>) -> Self {
        Self {
            audio_failures: Mutex::new(errors.into()),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Transcriber for FakeTranscriber {
    fn is_available(&self) -> bool {
        true
    }

    async fn fetch_audio(&self, _video: &VideoCandidate) -> Result<AudioBlob, SourceError> {
        if let Some(e) = self.audio_failures.lock().pop_front() {
            return Err(e);
        }
        Ok(AudioBlob::from_path("audio.m4a"))
    }

    async fn transcribe(
        &self,
        _audio: &AudioBlob,
        _model: &str,
    ) -> Result<Transcript, TranscribeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Transcript {
            text: "transcribed speech".into(),
            language: Some("en".into()),
        })
    }
}

/// Records every backoff delay instead of sleeping.
#[derive(Default)]
pub struct RecordingSleeper {
    pub delays: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().push(duration);
    }
}

/// Sink that keeps delivered results in memory.
#[derive(Default)]
pub struct RecordingSink {
    pub delivered: Mutex<Vec<AcquisitionResult>>,
    pub fail: bool,
}

#[async_trait]
impl TranscriptSink for RecordingSink {
    fn reference(&self, result: &AcquisitionResult) -> Option<String> {
        result
            .has_text()
            .then(|| format!("final/{}.txt", result.video_id))
    }

    async fn deliver(&self, result: &AcquisitionResult) -> subgrab::Result<()> {
        if self.fail {
            return Err(subgrab::Error::Other("sink unavailable".into()));
        }
        self.delivered.lock().push(result.clone());
        Ok(())
    }
}

/// Acquisition machine over `captions` that never really sleeps.
pub fn machine(captions: Arc<FakeCaptions>) -> AcquisitionMachine {
    AcquisitionMachine::new(captions).with_sleeper(Arc::new(RecordingSleeper::default()))
}

pub fn machine_with_whisper(
    captions: Arc<FakeCaptions>,
    transcriber: Arc<FakeTranscriber>,
) -> AcquisitionMachine {
    machine(captions).with_transcriber(
        transcriber,
        TranscriptionConfig {
            enabled: true,
            ..Default::default()
        },
    )
}
