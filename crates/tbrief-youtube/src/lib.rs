//! YouTube upstream access.
//!
//! This crate provides:
//! - [`VideoSourceAdapter`]: recent-video listing via the Data API with
//!   RSS feed fallback, single-video metadata and channel resolution
//! - [`TranscriptProvider`]: caption download and VTT cleanup via yt-dlp
//! - [`AudioProvider`]: audio-track download via yt-dlp

pub mod adapter;
pub mod audio;
pub mod client;
pub mod error;
pub mod feed;
pub mod tooling;
pub mod transcript;

pub use adapter::{FetchOutcome, VideoSourceAdapter};
pub use audio::{AudioProvider, YtDlpAudio};
pub use client::{YouTubeClient, YouTubeConfig};
pub use error::{YoutubeError, YoutubeResult};
pub use tooling::ytdlp_available;
pub use transcript::{TranscriptConfig, TranscriptProvider, YtDlpTranscripts};
