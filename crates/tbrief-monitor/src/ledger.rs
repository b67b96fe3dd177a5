//! New-video detection backed by the notification ledger.
//!
//! The ledger remembers, per channel, which video IDs have already been
//! surfaced to the user. A check is a cheap feed poll: unseen videos
//! are merged into the cache, counted against the ledger, and then
//! recorded so the next check reports zero. Marking "checked" only
//! touches the timestamp; the checked set never shrinks.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;

use tbrief_models::summary::datetime_stamp;
use tbrief_models::{ChannelId, NewVideosReport, NotificationLogEntry, Subscription, Video, VideoId};
use tbrief_store::Stores;
use tbrief_youtube::VideoSourceAdapter;

use crate::error::{MonitorError, MonitorResult};

/// Feed window for a new-video check.
const CHECK_WINDOW_DAYS: i64 = 2;

pub struct NotificationService {
    stores: Stores,
    source: Arc<dyn VideoSourceAdapter>,
}

impl NotificationService {
    pub fn new(stores: Stores, source: Arc<dyn VideoSourceAdapter>) -> Self {
        Self { stores, source }
    }

    /// Poll every active subscription's feed and count videos never
    /// seen before. Failing channels report zero instead of failing
    /// the whole check.
    pub async fn check_for_new_videos(&self) -> MonitorResult<NewVideosReport> {
        let subscriptions = self.stores.subscriptions.list().await?;
        let mut report = NewVideosReport::default();

        for sub in subscriptions.into_iter().filter(|s| s.active) {
            let count = match self.check_channel(&sub).await {
                Ok(count) => count,
                Err(e) => {
                    warn!(channel_id = %sub.channel_id, "New-video check failed: {}", e);
                    0
                }
            };
            report.push(sub.channel_id, sub.channel_name, count);
        }

        Ok(report)
    }

    async fn check_channel(&self, sub: &Subscription) -> MonitorResult<usize> {
        let ledger = self.ensure_entry(&sub.channel_id).await?;

        let fresh = self
            .source
            .fetch_recent_feed_only(&sub.channel_id, CHECK_WINDOW_DAYS)
            .await?;
        let cached_ids: HashSet<VideoId> = self
            .stores
            .videos
            .get(&sub.channel_id)
            .await?
            .into_iter()
            .map(|v| v.id)
            .collect();
        let unseen: Vec<Video> = fresh
            .into_iter()
            .filter(|v| !cached_ids.contains(&v.id))
            .collect();

        if unseen.is_empty() {
            return Ok(0);
        }

        self.stores
            .videos
            .merge_prepend(&sub.channel_id, &unseen)
            .await?;

        // Count against the ledger as it stood before this batch.
        let new_count = unseen.iter().filter(|v| !ledger.has_checked(&v.id)).count();

        let mut entry = ledger;
        entry
            .checked_video_ids
            .extend(unseen.into_iter().map(|v| v.id));
        self.stores.notifications.save(&entry).await?;

        Ok(new_count)
    }

    /// Stamp the "user has seen this" timestamp for one channel, or
    /// for every active channel when `target` is `*`. Returns how many
    /// entries were touched.
    pub async fn mark_notifications_checked(&self, target: &str) -> MonitorResult<u32> {
        let now = datetime_stamp();

        if target == "*" {
            let subscriptions = self.stores.subscriptions.list().await?;
            let mut touched = 0;
            for sub in subscriptions.into_iter().filter(|s| s.active) {
                self.touch(&sub.channel_id, &now).await?;
                touched += 1;
            }
            return Ok(touched);
        }

        let channel_id = ChannelId::from(target);
        if self.stores.subscriptions.get(&channel_id).await?.is_none() {
            return Err(MonitorError::not_found(format!("subscription {target}")));
        }
        self.touch(&channel_id, &now).await?;
        Ok(1)
    }

    async fn ensure_entry(&self, channel_id: &ChannelId) -> MonitorResult<NotificationLogEntry> {
        if let Some(entry) = self.stores.notifications.get(channel_id).await? {
            return Ok(entry);
        }
        let mut entry = NotificationLogEntry::new(channel_id.clone());
        entry.last_checked_at = Some(datetime_stamp());
        self.stores.notifications.save(&entry).await?;
        Ok(entry)
    }

    async fn touch(&self, channel_id: &ChannelId, now: &str) -> MonitorResult<()> {
        let mut entry = match self.stores.notifications.get(channel_id).await? {
            Some(entry) => entry,
            None => NotificationLogEntry::new(channel_id.clone()),
        };
        entry.last_checked_at = Some(now.to_string());
        self.stores.notifications.save(&entry).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{file_stores, rss_video, MockSource};

    fn channel_a() -> ChannelId {
        ChannelId::from("UCledgeraaaa0123456789ab")
    }

    fn channel_b() -> ChannelId {
        ChannelId::from("UCledgerbbbb0123456789ab")
    }

    async fn seed_subscription(stores: &Stores, channel_id: ChannelId, active: bool) {
        let mut sub = Subscription::new(channel_id, "채널");
        sub.active = active;
        stores.subscriptions.save(&sub).await.unwrap();
    }

    #[tokio::test]
    async fn test_first_check_counts_unseen_videos() {
        let (_dir, stores) = file_stores();
        seed_subscription(&stores, channel_a(), true).await;
        stores
            .videos
            .replace(&channel_a(), &[rss_video("vid-a", "2026-08-20T10:00:00Z")])
            .await
            .unwrap();

        let mut source = MockSource::new();
        source
            .expect_fetch_recent_feed_only()
            .withf(|_, days| *days == CHECK_WINDOW_DAYS)
            .returning(|_, _| {
                Ok(vec![
                    rss_video("vid-a", "2026-08-20T10:00:00Z"),
                    rss_video("vid-b", "2026-08-21T10:00:00Z"),
                    rss_video("vid-c", "2026-08-22T10:00:00Z"),
                ])
            });
        let service = NotificationService::new(stores.clone(), Arc::new(source));

        let report = service.check_for_new_videos().await.unwrap();
        assert_eq!(report.total_new, 2);
        assert_eq!(report.channels.len(), 1);

        // Unseen videos joined the cache ahead of the existing entry.
        let cached = stores.videos.get(&channel_a()).await.unwrap();
        let ids: Vec<&str> = cached.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["vid-b", "vid-c", "vid-a"]);

        // And the second identical check reports nothing new.
        let report = service.check_for_new_videos().await.unwrap();
        assert_eq!(report.total_new, 0);
    }

    #[tokio::test]
    async fn test_ledgered_videos_are_not_recounted() {
        let (_dir, stores) = file_stores();
        seed_subscription(&stores, channel_a(), true).await;

        let mut entry = NotificationLogEntry::new(channel_a());
        entry.checked_video_ids.insert(VideoId::from("vid-b"));
        stores.notifications.save(&entry).await.unwrap();

        let mut source = MockSource::new();
        source
            .expect_fetch_recent_feed_only()
            .returning(|_, _| Ok(vec![rss_video("vid-b", "2026-08-21T10:00:00Z")]));
        let service = NotificationService::new(stores.clone(), Arc::new(source));

        // vid-b is not cached, so it is merged; the ledger already
        // knows it, so it does not count.
        let report = service.check_for_new_videos().await.unwrap();
        assert_eq!(report.total_new, 0);

        let cached = stores.videos.get(&channel_a()).await.unwrap();
        assert_eq!(cached.len(), 1);
    }

    #[tokio::test]
    async fn test_check_initializes_missing_entry() {
        let (_dir, stores) = file_stores();
        seed_subscription(&stores, channel_a(), true).await;

        let mut source = MockSource::new();
        source
            .expect_fetch_recent_feed_only()
            .returning(|_, _| Ok(vec![]));
        let service = NotificationService::new(stores.clone(), Arc::new(source));

        service.check_for_new_videos().await.unwrap();

        let entry = stores.notifications.get(&channel_a()).await.unwrap();
        let entry = entry.unwrap();
        assert!(entry.checked_video_ids.is_empty());
        assert!(entry.last_checked_at.is_some());
    }

    #[tokio::test]
    async fn test_failing_channel_reports_zero() {
        let (_dir, stores) = file_stores();
        seed_subscription(&stores, channel_a(), true).await;
        seed_subscription(&stores, channel_b(), true).await;

        let mut source = MockSource::new();
        source
            .expect_fetch_recent_feed_only()
            .returning(|channel_id, _| {
                if channel_id == &ChannelId::from("UCledgeraaaa0123456789ab") {
                    Err(tbrief_youtube::YoutubeError::Feed("parse failed".into()))
                } else {
                    Ok(vec![rss_video("vid-b", "2026-08-21T10:00:00Z")])
                }
            });
        let service = NotificationService::new(stores, Arc::new(source));

        let report = service.check_for_new_videos().await.unwrap();
        assert_eq!(report.channels.len(), 2);
        assert_eq!(report.total_new, 1);
    }

    #[tokio::test]
    async fn test_mark_checked_wildcard_touches_active_channels() {
        let (_dir, stores) = file_stores();
        seed_subscription(&stores, channel_a(), true).await;
        seed_subscription(&stores, channel_b(), false).await;

        let mut entry = NotificationLogEntry::new(channel_a());
        entry.checked_video_ids.insert(VideoId::from("vid-a"));
        stores.notifications.save(&entry).await.unwrap();

        let service = NotificationService::new(stores.clone(), Arc::new(MockSource::new()));

        let touched = service.mark_notifications_checked("*").await.unwrap();
        assert_eq!(touched, 1);

        // Timestamp moved, checked set untouched.
        let entry = stores.notifications.get(&channel_a()).await.unwrap().unwrap();
        assert!(entry.last_checked_at.is_some());
        assert!(entry.has_checked(&VideoId::from("vid-a")));

        // The inactive channel was skipped entirely.
        let entry = stores.notifications.get(&channel_b()).await.unwrap();
        assert!(entry.is_none());
    }

    #[tokio::test]
    async fn test_mark_checked_unknown_channel_is_not_found() {
        let (_dir, stores) = file_stores();
        let service = NotificationService::new(stores, Arc::new(MockSource::new()));

        let err = service
            .mark_notifications_checked("UCmissing9876543210zyxwv")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
