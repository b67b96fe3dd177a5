//! Channel video listing and refresh.
//!
//! Serves the cached list when one exists, fetches an initial window on
//! a cache miss, and drives the wider refresh window on demand. All
//! writes go through the reconciler so eviction happens in one place.

use std::sync::Arc;

use tracing::{debug, info};

use tbrief_models::{ChannelId, Video};
use tbrief_store::Stores;
use tbrief_youtube::VideoSourceAdapter;

use crate::error::{MonitorError, MonitorResult};
use crate::reconciler::{reconcile, PersistMode, ReconcileOutcome};

/// Window for the first fetch after a cache miss.
const CACHE_MISS_WINDOW_DAYS: i64 = 7;

/// Window for an explicit refresh.
const REFRESH_WINDOW_DAYS: i64 = 30;

pub struct ChannelService {
    stores: Stores,
    source: Arc<dyn VideoSourceAdapter>,
}

impl ChannelService {
    pub fn new(stores: Stores, source: Arc<dyn VideoSourceAdapter>) -> Self {
        Self { stores, source }
    }

    /// Cached videos for a subscribed channel, fetching a starter
    /// window when the cache is empty.
    pub async fn get_videos_for_channel(&self, channel_id: &ChannelId) -> MonitorResult<Vec<Video>> {
        self.require_subscription(channel_id).await?;

        let cached = self.stores.videos.get(channel_id).await?;
        if !cached.is_empty() {
            return Ok(cached);
        }

        debug!(channel_id = %channel_id, "Video cache empty, fetching starter window");
        self.fetch_and_store(channel_id, CACHE_MISS_WINDOW_DAYS)
            .await
    }

    /// Force-refresh a channel's cache from upstream.
    pub async fn refresh_channel(&self, channel_id: &ChannelId) -> MonitorResult<Vec<Video>> {
        self.require_subscription(channel_id).await?;

        info!(channel_id = %channel_id, "Refreshing video cache");
        self.fetch_and_store(channel_id, REFRESH_WINDOW_DAYS).await
    }

    async fn fetch_and_store(
        &self,
        channel_id: &ChannelId,
        window_days: i64,
    ) -> MonitorResult<Vec<Video>> {
        let outcome = self.source.fetch_recent(channel_id, window_days).await?;
        if !outcome.authoritative {
            crate::metrics::record_feed_served();
        }

        let cached = self.stores.videos.get(channel_id).await?;
        let reconciled = reconcile(
            self.source.as_ref(),
            channel_id,
            outcome.videos,
            outcome.authoritative,
            cached,
        )
        .await;
        self.apply(channel_id, &reconciled).await?;

        match reconciled.mode {
            PersistMode::Replace => Ok(reconciled.videos),
            PersistMode::Merge => Ok(self.stores.videos.get(channel_id).await?),
        }
    }

    /// Persist a reconcile outcome and drop summaries for evicted
    /// videos.
    pub(crate) async fn apply(
        &self,
        channel_id: &ChannelId,
        outcome: &ReconcileOutcome,
    ) -> MonitorResult<()> {
        match outcome.mode {
            PersistMode::Replace => {
                self.stores.videos.replace(channel_id, &outcome.videos).await?;
            }
            PersistMode::Merge => {
                self.stores
                    .videos
                    .merge_prepend(channel_id, &outcome.videos)
                    .await?;
            }
        }

        for video_id in &outcome.evict {
            let removed = self.stores.summaries.delete_for_video(video_id).await?;
            if removed > 0 {
                info!(
                    video_id = %video_id,
                    removed,
                    "Dropped summaries for enriched video"
                );
            }
        }

        Ok(())
    }

    async fn require_subscription(&self, channel_id: &ChannelId) -> MonitorResult<()> {
        if self.stores.subscriptions.get(channel_id).await?.is_none() {
            return Err(MonitorError::not_found(format!(
                "subscription {channel_id}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{api_video, file_stores, rss_video, MockSource};
    use tbrief_models::{Subscription, SummaryRecord, VideoId};
    use tbrief_youtube::FetchOutcome;

    fn channel() -> ChannelId {
        ChannelId::from("UCchannelsvc0123456789ab")
    }

    async fn seed_subscription(stores: &Stores) {
        let sub = Subscription::new(channel(), "채널A");
        stores.subscriptions.save(&sub).await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_channel_is_not_found() {
        let (_dir, stores) = file_stores();
        let service = ChannelService::new(stores, Arc::new(MockSource::new()));

        let err = service.get_videos_for_channel(&channel()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_nonempty_cache_is_served_without_fetching() {
        let (_dir, stores) = file_stores();
        seed_subscription(&stores).await;
        stores
            .videos
            .replace(&channel(), &[api_video("vid-a", "2026-08-20T10:00:00Z")])
            .await
            .unwrap();

        let mut source = MockSource::new();
        source.expect_fetch_recent().times(0);
        let service = ChannelService::new(stores, Arc::new(source));

        let videos = service.get_videos_for_channel(&channel()).await.unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].id.as_str(), "vid-a");
    }

    #[tokio::test]
    async fn test_cache_miss_fetches_starter_window() {
        let (_dir, stores) = file_stores();
        seed_subscription(&stores).await;

        let mut source = MockSource::new();
        source
            .expect_fetch_recent()
            .withf(|_, days| *days == CACHE_MISS_WINDOW_DAYS)
            .times(1)
            .returning(|_, _| {
                Ok(FetchOutcome {
                    videos: vec![api_video("vid-a", "2026-08-20T10:00:00Z")],
                    authoritative: true,
                })
            });
        let service = ChannelService::new(stores.clone(), Arc::new(source));

        let videos = service.get_videos_for_channel(&channel()).await.unwrap();
        assert_eq!(videos.len(), 1);

        // Persisted for the next call.
        let cached = stores.videos.get(&channel()).await.unwrap();
        assert_eq!(cached.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_keeps_older_videos_behind_window() {
        let (_dir, stores) = file_stores();
        seed_subscription(&stores).await;
        stores
            .videos
            .replace(
                &channel(),
                &[
                    api_video("vid-a", "2026-08-20T10:00:00Z"),
                    api_video("vid-b", "2026-07-01T10:00:00Z"),
                ],
            )
            .await
            .unwrap();

        let mut source = MockSource::new();
        source
            .expect_fetch_recent()
            .withf(|_, days| *days == REFRESH_WINDOW_DAYS)
            .times(1)
            .returning(|_, _| {
                Ok(FetchOutcome {
                    videos: vec![
                        api_video("vid-a", "2026-08-20T10:00:00Z"),
                        api_video("vid-c", "2026-08-21T10:00:00Z"),
                    ],
                    authoritative: true,
                })
            });
        let service = ChannelService::new(stores.clone(), Arc::new(source));

        let videos = service.refresh_channel(&channel()).await.unwrap();
        let ids: Vec<&str> = videos.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["vid-a", "vid-c", "vid-b"]);
    }

    #[tokio::test]
    async fn test_feed_refresh_prepends_unseen() {
        let (_dir, stores) = file_stores();
        seed_subscription(&stores).await;
        stores
            .videos
            .replace(
                &channel(),
                &[
                    api_video("vid-a", "2026-08-20T10:00:00Z"),
                    api_video("vid-b", "2026-07-01T10:00:00Z"),
                ],
            )
            .await
            .unwrap();

        let mut source = MockSource::new();
        source.expect_fetch_recent().times(1).returning(|_, _| {
            Ok(FetchOutcome {
                videos: vec![rss_video("vid-c", "2026-08-21T10:00:00Z")],
                authoritative: false,
            })
        });
        let service = ChannelService::new(stores, Arc::new(source));

        let videos = service.refresh_channel(&channel()).await.unwrap();
        let ids: Vec<&str> = videos.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["vid-c", "vid-a", "vid-b"]);
    }

    #[tokio::test]
    async fn test_refresh_evicts_summaries_for_enriched_video() {
        let (_dir, stores) = file_stores();
        seed_subscription(&stores).await;
        stores
            .videos
            .replace(&channel(), &[rss_video("vid-x", "2026-08-15T10:00:00Z")])
            .await
            .unwrap();
        stores
            .summaries
            .save(&SummaryRecord::new(
                VideoId::from("vid-x"),
                "Video vid-x",
                "채널A",
                "옛 메타데이터 기준 요약",
                vec![],
            ))
            .await
            .unwrap();

        let mut source = MockSource::new();
        source.expect_fetch_recent().times(1).returning(|_, _| {
            Ok(FetchOutcome {
                videos: vec![api_video("vid-y", "2026-08-21T10:00:00Z")],
                authoritative: true,
            })
        });
        source
            .expect_fetch_single_metadata()
            .times(1)
            .returning(|_| Ok(Some(api_video("vid-x", "2026-08-15T10:00:00Z"))));
        let service = ChannelService::new(stores.clone(), Arc::new(source));

        let videos = service.refresh_channel(&channel()).await.unwrap();
        let ids: Vec<&str> = videos.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["vid-y", "vid-x"]);
        assert!(videos[1].has_complete_metadata());

        let summary = stores
            .summaries
            .find(&VideoId::from("vid-x"), &[])
            .await
            .unwrap();
        assert!(summary.is_none());
    }
}
