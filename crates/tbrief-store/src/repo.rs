//! Repository traits shared by every backend.
//!
//! Services and handlers depend only on these traits; the concrete
//! backend is picked once at startup, see [`Stores`].

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use tbrief_models::summary::datetime_stamp;
use tbrief_models::{
    ChannelId, NotificationLogEntry, Subscription, SummaryRecord, UserSettings, Video, VideoId,
};

use crate::error::StoreResult;
use crate::file;
use crate::supabase::{self, SupabaseClient};

/// Per-channel ordered video cache.
///
/// Lists are stored newest-first and returned in stored order.
#[async_trait]
pub trait VideoCacheRepository: Send + Sync {
    /// Cached videos for a channel, empty when none are cached.
    async fn get(&self, channel_id: &ChannelId) -> StoreResult<Vec<Video>>;

    /// Overwrite the channel's list with `videos`.
    async fn replace(&self, channel_id: &ChannelId, videos: &[Video]) -> StoreResult<()>;

    /// Prepend the videos not already present, keeping cached entries
    /// untouched. Returns how many were added.
    async fn merge_prepend(&self, channel_id: &ChannelId, videos: &[Video]) -> StoreResult<usize>;

    async fn delete(&self, channel_id: &ChannelId) -> StoreResult<()>;

    /// Locate a video in any channel's cache.
    async fn find_video(&self, video_id: &VideoId) -> StoreResult<Option<(ChannelId, Video)>>;
}

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<Subscription>>;

    async fn get(&self, channel_id: &ChannelId) -> StoreResult<Option<Subscription>>;

    /// Insert or update by channel ID.
    async fn save(&self, subscription: &Subscription) -> StoreResult<()>;

    /// Returns false when no such subscription existed.
    async fn delete(&self, channel_id: &ChannelId) -> StoreResult<bool>;

    /// Advance the channel's monitoring cursor.
    async fn set_last_processed(
        &self,
        channel_id: &ChannelId,
        video_id: &VideoId,
    ) -> StoreResult<()>;
}

/// Summary cache keyed by video ID and tag set.
#[async_trait]
pub trait SummaryRepository: Send + Sync {
    /// Summary text for this video/tag combination, if cached.
    async fn find(&self, video_id: &VideoId, tags: &[String]) -> StoreResult<Option<String>>;

    async fn save(&self, record: &SummaryRecord) -> StoreResult<()>;

    /// Returns false when no entry existed under that key.
    async fn delete(&self, video_id: &VideoId, tags: &[String]) -> StoreResult<bool>;

    /// Drop every cached summary for a video, across all tag variants.
    /// Returns how many entries were removed.
    async fn delete_for_video(&self, video_id: &VideoId) -> StoreResult<u32>;

    /// All cached summaries, briefings excluded.
    async fn find_all(&self) -> StoreResult<Vec<SummaryRecord>>;

    /// Summaries produced on a `YYYY-MM-DD` day, briefings excluded.
    async fn find_for_date(&self, date: &str) -> StoreResult<Vec<SummaryRecord>>;

    /// The briefing record for a `YYYY-MM-DD` day, if one exists.
    async fn find_briefing(&self, date: &str) -> StoreResult<Option<SummaryRecord>>;
}

#[async_trait]
pub trait NotificationLogRepository: Send + Sync {
    async fn get(&self, channel_id: &ChannelId) -> StoreResult<Option<NotificationLogEntry>>;

    async fn save(&self, entry: &NotificationLogEntry) -> StoreResult<()>;

    async fn delete(&self, channel_id: &ChannelId) -> StoreResult<()>;
}

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Stored settings, or defaults when none have been saved yet.
    async fn get(&self) -> StoreResult<UserSettings>;

    async fn save(&self, settings: &UserSettings) -> StoreResult<()>;
}

/// Bundle of repository handles for one backend.
#[derive(Clone)]
pub struct Stores {
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub videos: Arc<dyn VideoCacheRepository>,
    pub summaries: Arc<dyn SummaryRepository>,
    pub notifications: Arc<dyn NotificationLogRepository>,
    pub settings: Arc<dyn SettingsRepository>,
}

impl Stores {
    /// JSON-file backend rooted at `data_dir`.
    pub fn file(data_dir: impl AsRef<Path>) -> Self {
        file::stores(data_dir.as_ref())
    }

    /// Supabase backend over a shared client.
    pub fn supabase(client: SupabaseClient) -> Self {
        supabase::stores(client)
    }
}

/// Copy of `videos` with `cached_at` set to now where missing.
pub(crate) fn stamp_cached_at(videos: &[Video]) -> Vec<Video> {
    let now = datetime_stamp();
    videos
        .iter()
        .map(|v| {
            let mut v = v.clone();
            if v.cached_at.is_none() {
                v.cached_at = Some(now.clone());
            }
            v
        })
        .collect()
}
