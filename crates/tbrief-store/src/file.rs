//! JSON-file backend.
//!
//! Each entity lives in one JSON file under the data directory. Writes
//! go through a temp file and rename, with a per-file mutex held across
//! read-modify-write so concurrent tasks cannot interleave updates.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;

use tbrief_models::summary::datetime_stamp;
use tbrief_models::{
    summary_cache_key, ChannelId, NotificationLogEntry, StoredSummary, Subscription, SummaryRecord,
    UserSettings, Video, VideoId, BRIEFING_TAG,
};

use crate::error::StoreResult;
use crate::repo::{
    stamp_cached_at, NotificationLogRepository, SettingsRepository, Stores,
    SubscriptionRepository, SummaryRepository, VideoCacheRepository,
};

/// One JSON document on disk.
struct JsonFile<T> {
    path: PathBuf,
    lock: Mutex<()>,
    _data: PhantomData<T>,
}

impl<T> JsonFile<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
            _data: PhantomData,
        }
    }

    async fn load(&self) -> StoreResult<T> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn store(&self, value: &T) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(value)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn read(&self) -> StoreResult<T> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    /// Read, mutate and persist under the file lock.
    async fn update<F, R>(&self, f: F) -> StoreResult<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let _guard = self.lock.lock().await;
        let mut value = self.load().await?;
        let out = f(&mut value);
        self.store(&value).await?;
        Ok(out)
    }
}

/// Build the file-backed repository bundle.
pub(crate) fn stores(dir: &Path) -> Stores {
    Stores {
        subscriptions: Arc::new(FileSubscriptionStore::new(dir.join("subscriptions.json"))),
        videos: Arc::new(FileVideoCacheStore::new(dir.join("video_cache.json"))),
        summaries: Arc::new(FileSummaryStore::new(dir.join("summaries.json"))),
        notifications: Arc::new(FileNotificationLogStore::new(
            dir.join("notification_log.json"),
        )),
        settings: Arc::new(FileSettingsStore::new(dir.join("settings.json"))),
    }
}

// =============================================================================
// Subscriptions
// =============================================================================

pub struct FileSubscriptionStore {
    file: JsonFile<Vec<Subscription>>,
}

impl FileSubscriptionStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: JsonFile::new(path),
        }
    }
}

#[async_trait]
impl SubscriptionRepository for FileSubscriptionStore {
    async fn list(&self) -> StoreResult<Vec<Subscription>> {
        self.file.read().await
    }

    async fn get(&self, channel_id: &ChannelId) -> StoreResult<Option<Subscription>> {
        let subs = self.file.read().await?;
        Ok(subs.into_iter().find(|s| s.channel_id == *channel_id))
    }

    async fn save(&self, subscription: &Subscription) -> StoreResult<()> {
        let mut subscription = subscription.clone();
        self.file
            .update(move |subs| {
                match subs.iter_mut().find(|s| s.channel_id == subscription.channel_id) {
                    Some(existing) => {
                        if subscription.created_at.is_none() {
                            subscription.created_at = existing.created_at.take();
                        }
                        *existing = subscription;
                    }
                    None => {
                        if subscription.created_at.is_none() {
                            subscription.created_at = Some(datetime_stamp());
                        }
                        subs.push(subscription);
                    }
                }
            })
            .await
    }

    async fn delete(&self, channel_id: &ChannelId) -> StoreResult<bool> {
        let channel_id = channel_id.clone();
        self.file
            .update(move |subs| {
                let before = subs.len();
                subs.retain(|s| s.channel_id != channel_id);
                subs.len() != before
            })
            .await
    }

    async fn set_last_processed(
        &self,
        channel_id: &ChannelId,
        video_id: &VideoId,
    ) -> StoreResult<()> {
        let channel_id = channel_id.clone();
        let video_id = video_id.clone();
        let updated = self
            .file
            .update(move |subs| {
                match subs.iter_mut().find(|s| s.channel_id == channel_id) {
                    Some(sub) => {
                        sub.last_processed_video_id = Some(video_id);
                        true
                    }
                    None => false,
                }
            })
            .await?;
        if !updated {
            return Err(crate::error::StoreError::not_found("subscription"));
        }
        Ok(())
    }
}

// =============================================================================
// Video cache
// =============================================================================

pub struct FileVideoCacheStore {
    file: JsonFile<HashMap<String, Vec<Video>>>,
}

impl FileVideoCacheStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: JsonFile::new(path),
        }
    }
}

#[async_trait]
impl VideoCacheRepository for FileVideoCacheStore {
    async fn get(&self, channel_id: &ChannelId) -> StoreResult<Vec<Video>> {
        let cache = self.file.read().await?;
        Ok(cache.get(channel_id.as_str()).cloned().unwrap_or_default())
    }

    async fn replace(&self, channel_id: &ChannelId, videos: &[Video]) -> StoreResult<()> {
        let key = channel_id.as_str().to_string();
        let stamped = stamp_cached_at(videos);
        self.file
            .update(move |cache| {
                cache.insert(key, stamped);
            })
            .await?;
        debug!(channel_id = %channel_id, count = videos.len(), "Replaced video cache");
        Ok(())
    }

    async fn merge_prepend(&self, channel_id: &ChannelId, videos: &[Video]) -> StoreResult<usize> {
        let key = channel_id.as_str().to_string();
        let stamped = stamp_cached_at(videos);
        let added = self
            .file
            .update(move |cache| {
                let list = cache.entry(key).or_default();
                let mut merged: Vec<Video> = stamped
                    .into_iter()
                    .filter(|v| !list.iter().any(|c| c.id == v.id))
                    .collect();
                let added = merged.len();
                merged.append(list);
                *list = merged;
                added
            })
            .await?;
        if added > 0 {
            debug!(channel_id = %channel_id, added, "Prepended videos to cache");
        }
        Ok(added)
    }

    async fn delete(&self, channel_id: &ChannelId) -> StoreResult<()> {
        let key = channel_id.as_str().to_string();
        self.file
            .update(move |cache| {
                cache.remove(&key);
            })
            .await
    }

    async fn find_video(&self, video_id: &VideoId) -> StoreResult<Option<(ChannelId, Video)>> {
        let cache = self.file.read().await?;
        for (channel, videos) in &cache {
            if let Some(video) = videos.iter().find(|v| v.id == *video_id) {
                return Ok(Some((ChannelId::from(channel.as_str()), video.clone())));
            }
        }
        Ok(None)
    }
}

// =============================================================================
// Summaries
// =============================================================================

pub struct FileSummaryStore {
    file: JsonFile<HashMap<String, StoredSummary>>,
}

impl FileSummaryStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: JsonFile::new(path),
        }
    }

    fn records(map: HashMap<String, StoredSummary>) -> Vec<SummaryRecord> {
        let mut records: Vec<SummaryRecord> = map
            .into_iter()
            .map(|(key, stored)| stored.into_record(&key))
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        records
    }

    /// Whether a stored entry belongs to the given video, tolerating
    /// legacy bare-string entries that only carry the key.
    fn belongs_to(key: &str, stored: &StoredSummary, video_id: &VideoId) -> bool {
        match stored {
            StoredSummary::Record(record) => record.video_id == *video_id,
            StoredSummary::Legacy(_) => key.starts_with(&format!("{}_", video_id.as_str())),
        }
    }
}

#[async_trait]
impl SummaryRepository for FileSummaryStore {
    async fn find(&self, video_id: &VideoId, tags: &[String]) -> StoreResult<Option<String>> {
        let key = summary_cache_key(video_id, tags);
        let map = self.file.read().await?;
        Ok(map.get(&key).map(|s| s.summary_text().to_string()))
    }

    async fn save(&self, record: &SummaryRecord) -> StoreResult<()> {
        let key = record.cache_key();
        let stored = StoredSummary::Record(record.clone());
        self.file
            .update(move |map| {
                map.insert(key, stored);
            })
            .await?;
        debug!(video_id = %record.video_id, "Cached summary");
        Ok(())
    }

    async fn delete(&self, video_id: &VideoId, tags: &[String]) -> StoreResult<bool> {
        let key = summary_cache_key(video_id, tags);
        self.file.update(move |map| map.remove(&key).is_some()).await
    }

    async fn delete_for_video(&self, video_id: &VideoId) -> StoreResult<u32> {
        let video_id = video_id.clone();
        self.file
            .update(move |map| {
                let before = map.len();
                map.retain(|key, stored| !Self::belongs_to(key, stored, &video_id));
                (before - map.len()) as u32
            })
            .await
    }

    async fn find_all(&self) -> StoreResult<Vec<SummaryRecord>> {
        let map = self.file.read().await?;
        Ok(Self::records(map)
            .into_iter()
            .filter(|r| !r.is_briefing())
            .collect())
    }

    async fn find_for_date(&self, date: &str) -> StoreResult<Vec<SummaryRecord>> {
        let map = self.file.read().await?;
        Ok(Self::records(map)
            .into_iter()
            .filter(|r| !r.is_briefing() && r.date.starts_with(date))
            .collect())
    }

    async fn find_briefing(&self, date: &str) -> StoreResult<Option<SummaryRecord>> {
        let key = summary_cache_key(
            &VideoId::from_string(format!("BRIEFING_{date}")),
            &[BRIEFING_TAG.to_string()],
        );
        let map = self.file.read().await?;
        Ok(map
            .get(&key)
            .cloned()
            .map(|stored| stored.into_record(&key)))
    }
}

// =============================================================================
// Notification ledger
// =============================================================================

pub struct FileNotificationLogStore {
    file: JsonFile<HashMap<String, NotificationLogEntry>>,
}

impl FileNotificationLogStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: JsonFile::new(path),
        }
    }
}

#[async_trait]
impl NotificationLogRepository for FileNotificationLogStore {
    async fn get(&self, channel_id: &ChannelId) -> StoreResult<Option<NotificationLogEntry>> {
        let map = self.file.read().await?;
        Ok(map.get(channel_id.as_str()).cloned())
    }

    async fn save(&self, entry: &NotificationLogEntry) -> StoreResult<()> {
        let key = entry.channel_id.as_str().to_string();
        let entry = entry.clone();
        self.file
            .update(move |map| {
                map.insert(key, entry);
            })
            .await
    }

    async fn delete(&self, channel_id: &ChannelId) -> StoreResult<()> {
        let key = channel_id.as_str().to_string();
        self.file
            .update(move |map| {
                map.remove(&key);
            })
            .await
    }
}

// =============================================================================
// Settings
// =============================================================================

pub struct FileSettingsStore {
    file: JsonFile<Option<UserSettings>>,
}

impl FileSettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: JsonFile::new(path),
        }
    }
}

#[async_trait]
impl SettingsRepository for FileSettingsStore {
    async fn get(&self) -> StoreResult<UserSettings> {
        let stored = self.file.read().await?;
        Ok(stored.unwrap_or_default())
    }

    async fn save(&self, settings: &UserSettings) -> StoreResult<()> {
        let settings = settings.clone();
        self.file
            .update(move |stored| {
                *stored = Some(settings);
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tbrief_models::VideoSource;
    use tempfile::tempdir;

    fn video(id: &str) -> Video {
        Video {
            id: VideoId::from(id),
            title: format!("Video {id}"),
            published_at: "2025-06-01T00:00:00Z".to_string(),
            has_caption: false,
            duration: "10:00".to_string(),
            source: VideoSource::Api,
            cached_at: None,
            is_short: false,
        }
    }

    fn record(video_id: &str, tags: &[&str], date: &str) -> SummaryRecord {
        SummaryRecord {
            video_id: VideoId::from(video_id),
            title: "T".to_string(),
            channel_name: "C".to_string(),
            summary: format!("summary of {video_id}"),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            date: date.to_string(),
        }
    }

    #[tokio::test]
    async fn test_subscription_upsert_and_delete() {
        let dir = tempdir().unwrap();
        let stores = stores(dir.path());
        let channel = ChannelId::from("UCa");

        let mut sub = Subscription::new(channel.clone(), "Channel A");
        stores.subscriptions.save(&sub).await.unwrap();

        let loaded = stores.subscriptions.get(&channel).await.unwrap().unwrap();
        assert_eq!(loaded.channel_name, "Channel A");
        assert!(loaded.created_at.is_some(), "insert stamps created_at");

        sub.tags = vec!["ai".to_string()];
        stores.subscriptions.save(&sub).await.unwrap();
        let updated = stores.subscriptions.get(&channel).await.unwrap().unwrap();
        assert_eq!(updated.tags, vec!["ai".to_string()]);
        assert_eq!(updated.created_at, loaded.created_at, "update keeps created_at");
        assert_eq!(stores.subscriptions.list().await.unwrap().len(), 1);

        assert!(stores.subscriptions.delete(&channel).await.unwrap());
        assert!(!stores.subscriptions.delete(&channel).await.unwrap());
    }

    #[tokio::test]
    async fn test_set_last_processed() {
        let dir = tempdir().unwrap();
        let stores = stores(dir.path());
        let channel = ChannelId::from("UCa");
        stores
            .subscriptions
            .save(&Subscription::new(channel.clone(), "A"))
            .await
            .unwrap();

        stores
            .subscriptions
            .set_last_processed(&channel, &VideoId::from("v1"))
            .await
            .unwrap();
        let sub = stores.subscriptions.get(&channel).await.unwrap().unwrap();
        assert_eq!(sub.last_processed_video_id, Some(VideoId::from("v1")));

        let missing = stores
            .subscriptions
            .set_last_processed(&ChannelId::from("UCmissing"), &VideoId::from("v1"))
            .await;
        assert!(missing.is_err());
    }

    #[tokio::test]
    async fn test_video_cache_replace_keeps_order() {
        let dir = tempdir().unwrap();
        let stores = stores(dir.path());
        let channel = ChannelId::from("UCa");

        assert!(stores.videos.get(&channel).await.unwrap().is_empty());

        stores
            .videos
            .replace(&channel, &[video("v2"), video("v1")])
            .await
            .unwrap();
        let cached = stores.videos.get(&channel).await.unwrap();
        assert_eq!(cached.len(), 2);
        assert_eq!(cached[0].id.as_str(), "v2");
        assert!(cached[0].cached_at.is_some(), "replace stamps cached_at");
    }

    #[tokio::test]
    async fn test_merge_prepend_adds_unseen_only() {
        let dir = tempdir().unwrap();
        let stores = stores(dir.path());
        let channel = ChannelId::from("UCa");

        stores
            .videos
            .replace(&channel, &[video("a"), video("b")])
            .await
            .unwrap();

        let added = stores
            .videos
            .merge_prepend(&channel, &[video("c"), video("a")])
            .await
            .unwrap();
        assert_eq!(added, 1);

        let cached = stores.videos.get(&channel).await.unwrap();
        let ids: Vec<&str> = cached.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_find_video_across_channels() {
        let dir = tempdir().unwrap();
        let stores = stores(dir.path());

        stores
            .videos
            .replace(&ChannelId::from("UCa"), &[video("v1")])
            .await
            .unwrap();
        stores
            .videos
            .replace(&ChannelId::from("UCb"), &[video("v2")])
            .await
            .unwrap();

        let found = stores.videos.find_video(&VideoId::from("v2")).await.unwrap();
        let (channel, video) = found.unwrap();
        assert_eq!(channel.as_str(), "UCb");
        assert_eq!(video.id.as_str(), "v2");

        assert!(stores
            .videos
            .find_video(&VideoId::from("nope"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_summary_save_find_delete() {
        let dir = tempdir().unwrap();
        let stores = stores(dir.path());
        let tags = vec!["ai".to_string()];

        let rec = record("v1", &["ai"], "2025-06-01 10:00:00");
        stores.summaries.save(&rec).await.unwrap();

        let hit = stores
            .summaries
            .find(&VideoId::from("v1"), &tags)
            .await
            .unwrap();
        assert_eq!(hit.as_deref(), Some("summary of v1"));

        let miss = stores
            .summaries
            .find(&VideoId::from("v1"), &[])
            .await
            .unwrap();
        assert!(miss.is_none(), "different tag set is a different key");

        assert!(stores.summaries.delete(&VideoId::from("v1"), &tags).await.unwrap());
        assert!(!stores.summaries.delete(&VideoId::from("v1"), &tags).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_for_video_covers_all_tag_variants() {
        let dir = tempdir().unwrap();
        let stores = stores(dir.path());

        stores
            .summaries
            .save(&record("v1", &[], "2025-06-01 10:00:00"))
            .await
            .unwrap();
        stores
            .summaries
            .save(&record("v1", &["ai"], "2025-06-01 11:00:00"))
            .await
            .unwrap();
        stores
            .summaries
            .save(&record("v2", &[], "2025-06-01 12:00:00"))
            .await
            .unwrap();

        let removed = stores
            .summaries
            .delete_for_video(&VideoId::from("v1"))
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(stores.summaries.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_listing_excludes_briefings() {
        let dir = tempdir().unwrap();
        let stores = stores(dir.path());

        stores
            .summaries
            .save(&record("v1", &[], "2025-06-01 10:00:00"))
            .await
            .unwrap();
        stores
            .summaries
            .save(&SummaryRecord::briefing("2025-06-01", "the briefing"))
            .await
            .unwrap();

        let all = stores.summaries.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].video_id.as_str(), "v1");

        let for_date = stores.summaries.find_for_date("2025-06-01").await.unwrap();
        assert_eq!(for_date.len(), 1);

        let briefing = stores
            .summaries
            .find_briefing("2025-06-01")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(briefing.summary, "the briefing");
        assert!(stores
            .summaries
            .find_briefing("2025-06-02")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_legacy_bare_string_summaries() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("summaries.json"),
            r#"{"v9_news,tech": "an old summary"}"#,
        )
        .unwrap();
        let stores = stores(dir.path());

        let hit = stores
            .summaries
            .find(
                &VideoId::from("v9"),
                &["tech".to_string(), "news".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(hit.as_deref(), Some("an old summary"));

        let all = stores.summaries.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].video_id.as_str(), "v9");
        assert_eq!(all[0].title, "Unknown");

        let removed = stores
            .summaries
            .delete_for_video(&VideoId::from("v9"))
            .await
            .unwrap();
        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn test_notification_log_roundtrip() {
        let dir = tempdir().unwrap();
        let stores = stores(dir.path());
        let channel = ChannelId::from("UCa");

        assert!(stores.notifications.get(&channel).await.unwrap().is_none());

        let mut entry = NotificationLogEntry::new(channel.clone());
        entry.checked_video_ids.insert(VideoId::from("v1"));
        entry.last_checked_at = Some("2025-06-01 10:00:00".to_string());
        stores.notifications.save(&entry).await.unwrap();

        let loaded = stores.notifications.get(&channel).await.unwrap().unwrap();
        assert!(loaded.has_checked(&VideoId::from("v1")));

        stores.notifications.delete(&channel).await.unwrap();
        assert!(stores.notifications.get(&channel).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_settings_default_until_saved() {
        let dir = tempdir().unwrap();
        let stores = stores(dir.path());

        let settings = stores.settings.get().await.unwrap();
        assert_eq!(settings.notification_time, "21:30");

        let mut changed = settings;
        changed.notification_time = "08:00".to_string();
        stores.settings.save(&changed).await.unwrap();
        assert_eq!(
            stores.settings.get().await.unwrap().notification_time,
            "08:00"
        );
    }
}
