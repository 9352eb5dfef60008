//! Interfaces the acquisition core calls into.
//!
//! Each trait mirrors one external collaborator. Production implementations
//! live in [`crate::ytdlp`] and [`crate::whisper`]; tests substitute fakes.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::{SourceError, TranscribeError};
use crate::media::{
    AudioBlob, CaptionTrack, TrackListing, Transcript, VideoCandidate, VideoProbe,
};

/// Lazy, finite sequence of channel videos in channel order. Consumed once.
pub type VideoStream = BoxStream<'static, Result<VideoCandidate, SourceError>>;

/// Lists and fetches caption tracks for a video.
#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// Metadata plus every caption track the platform offers for `video`.
    async fn list_tracks(&self, video: &VideoCandidate) -> Result<TrackListing, SourceError>;

    /// Raw caption text (WebVTT) for one track.
    async fn fetch_track_text(
        &self,
        video: &VideoCandidate,
        track: &CaptionTrack,
    ) -> Result<String, SourceError>;
}

/// Enumerates a channel's uploads.
#[async_trait]
pub trait ChannelEnumerator: Send + Sync {
    async fn list_videos(&self, channel: &str) -> Result<VideoStream, SourceError>;

    /// Resolve a single video URL into a candidate and its channel name.
    async fn probe_video(&self, url: &str) -> Result<VideoProbe, SourceError>;
}

/// Local speech-to-text fallback.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Whether the transcription backend can run at all on this machine.
    fn is_available(&self) -> bool;

    async fn fetch_audio(&self, video: &VideoCandidate) -> Result<AudioBlob, SourceError>;

    async fn transcribe(
        &self,
        audio: &AudioBlob,
        model: &str,
    ) -> Result<Transcript, TranscribeError>;
}
