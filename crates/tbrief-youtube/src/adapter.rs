//! Upstream video source seam.

use async_trait::async_trait;

use tbrief_models::{ChannelId, ChannelInfo, Video, VideoId};

use crate::error::YoutubeResult;

/// Result of a recent-video fetch.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Videos newest-first, shorts already filtered out.
    pub videos: Vec<Video>,
    /// True when the list came from the Data API and is complete for
    /// the window. Feed-derived lists are best-effort only.
    pub authoritative: bool,
}

/// Everything the monitor needs from YouTube.
#[async_trait]
pub trait VideoSourceAdapter: Send + Sync {
    /// Videos published within the last `window_days`, newest-first.
    async fn fetch_recent(
        &self,
        channel_id: &ChannelId,
        window_days: i64,
    ) -> YoutubeResult<FetchOutcome>;

    /// Same window, but always via the RSS feed. Costs no API quota.
    async fn fetch_recent_feed_only(
        &self,
        channel_id: &ChannelId,
        window_days: i64,
    ) -> YoutubeResult<Vec<Video>>;

    /// Full metadata for one video, or `None` when it cannot be looked
    /// up (unknown ID, or no API key configured).
    async fn fetch_single_metadata(&self, video_id: &VideoId) -> YoutubeResult<Option<Video>>;

    /// Resolve a user-supplied channel reference to an ID and name.
    async fn resolve_channel(&self, reference: &str) -> YoutubeResult<ChannelInfo>;
}
