pub mod caption;
pub mod video;

pub use caption::{AudioBlob, CaptionTrack, TrackKind, TrackListing, Transcript};
pub use video::{
    VideoCandidate, VideoMetadata, VideoProbe, channel_videos_url, format_duration,
    format_upload_date, parse_video_id, watch_url,
};
