//! Adapters for acquiring video captions and transcripts.
//!
//! The [`source`] traits describe what the acquisition pipeline needs from the
//! outside world: caption listings and downloads, channel enumeration, audio
//! download and local transcription. [`ytdlp`] implements the network side by
//! driving the `yt-dlp` binary, [`whisper`] implements transcription through the
//! `openai-whisper` command line, and [`subtitle`] turns raw WebVTT into plain
//! text.

pub mod error;
pub mod media;
pub mod source;
pub mod subtitle;
pub mod whisper;
pub mod ytdlp;

pub use error::{SourceError, TranscribeError};
pub use source::{CaptionSource, ChannelEnumerator, Transcriber, VideoStream};
