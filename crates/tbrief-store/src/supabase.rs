//! Supabase (PostgREST) backend.
//!
//! Each repository maps onto one table. Writes are upserts keyed on the
//! table's natural key, so save is idempotent across backends. Video
//! lists carry an explicit `position` column to preserve order.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tbrief_models::summary::datetime_stamp;
use tbrief_models::{
    summary_cache_key, ChannelId, NotificationLogEntry, Subscription, SummaryRecord, UserSettings,
    Video, VideoId, VideoSource, BRIEFING_TAG,
};

use crate::error::{StoreError, StoreResult};
use crate::repo::{
    stamp_cached_at, NotificationLogRepository, SettingsRepository, Stores,
    SubscriptionRepository, SummaryRepository, VideoCacheRepository,
};

// =============================================================================
// Configuration
// =============================================================================

/// Supabase connection configuration.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// Service role key used for both `apikey` and bearer auth
    pub service_key: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
}

impl SupabaseConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StoreResult<Self> {
        let url = std::env::var("SUPABASE_URL")
            .map_err(|_| StoreError::config("SUPABASE_URL must be set for the supabase backend"))?;
        if url.is_empty() {
            return Err(StoreError::config("SUPABASE_URL cannot be empty"));
        }

        let service_key = std::env::var("SUPABASE_SERVICE_KEY")
            .or_else(|_| std::env::var("SUPABASE_SERVICE_ROLE_KEY"))
            .map_err(|_| {
                StoreError::config(
                    "SUPABASE_SERVICE_KEY or SUPABASE_SERVICE_ROLE_KEY must be set",
                )
            })?;

        let timeout_secs: u64 = std::env::var("SUPABASE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            url,
            service_key,
            timeout: Duration::from_secs(timeout_secs),
            connect_timeout: Duration::from_secs(5),
        })
    }
}

// =============================================================================
// Client
// =============================================================================

/// Thin PostgREST client shared by the Supabase repositories.
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    key: String,
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig) -> StoreResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("tbrief-store/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(StoreError::Network)?;

        let base_url = format!("{}/rest/v1", config.url.trim_end_matches('/'));

        Ok(Self {
            http,
            base_url,
            key: config.service_key,
        })
    }

    fn request(&self, method: Method, table: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}/{}", self.base_url, table))
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }

    async fn expect_success(table: &str, response: Response) -> StoreResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::request_failed(format!(
            "{table} returned {status}: {body}"
        )))
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> StoreResult<Vec<T>> {
        let response = self.request(Method::GET, table).query(query).send().await?;
        let response = Self::expect_success(table, response).await?;
        Ok(response.json().await?)
    }

    async fn upsert<T: Serialize>(
        &self,
        table: &str,
        on_conflict: &str,
        rows: &[T],
    ) -> StoreResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let response = self
            .request(Method::POST, table)
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(rows)
            .send()
            .await?;
        Self::expect_success(table, response).await?;
        Ok(())
    }

    /// Delete matching rows, returning how many were removed.
    async fn delete_where(&self, table: &str, query: &[(&str, String)]) -> StoreResult<u32> {
        let response = self
            .request(Method::DELETE, table)
            .query(query)
            .header("Prefer", "return=representation")
            .send()
            .await?;
        let response = Self::expect_success(table, response).await?;
        let rows: Vec<serde_json::Value> = response.json().await?;
        Ok(rows.len() as u32)
    }

    /// Patch matching rows, returning how many were updated.
    async fn patch_where<T: Serialize>(
        &self,
        table: &str,
        query: &[(&str, String)],
        body: &T,
    ) -> StoreResult<u32> {
        let response = self
            .request(Method::PATCH, table)
            .query(query)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        let response = Self::expect_success(table, response).await?;
        let rows: Vec<serde_json::Value> = response.json().await?;
        Ok(rows.len() as u32)
    }
}

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{value}")
}

/// Build the Supabase-backed repository bundle.
pub(crate) fn stores(client: SupabaseClient) -> Stores {
    Stores {
        subscriptions: Arc::new(SupabaseSubscriptionStore::new(client.clone())),
        videos: Arc::new(SupabaseVideoCacheStore::new(client.clone())),
        summaries: Arc::new(SupabaseSummaryStore::new(client.clone())),
        notifications: Arc::new(SupabaseNotificationLogStore::new(client.clone())),
        settings: Arc::new(SupabaseSettingsStore::new(client)),
    }
}

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct SubscriptionRow {
    channel_id: String,
    channel_name: String,
    tags: Vec<String>,
    #[serde(default)]
    categories: Vec<String>,
    active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_processed_video_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<String>,
}

impl From<&Subscription> for SubscriptionRow {
    fn from(sub: &Subscription) -> Self {
        Self {
            channel_id: sub.channel_id.as_str().to_string(),
            channel_name: sub.channel_name.clone(),
            tags: sub.tags.clone(),
            categories: sub.categories.clone(),
            active: sub.active,
            last_processed_video_id: sub
                .last_processed_video_id
                .as_ref()
                .map(|v| v.as_str().to_string()),
            created_at: sub.created_at.clone(),
        }
    }
}

impl From<SubscriptionRow> for Subscription {
    fn from(row: SubscriptionRow) -> Self {
        Self {
            channel_id: ChannelId::from_string(row.channel_id),
            channel_name: row.channel_name,
            tags: row.tags,
            categories: row.categories,
            active: row.active,
            last_processed_video_id: row.last_processed_video_id.map(VideoId::from_string),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct VideoCacheRow {
    channel_id: String,
    video_id: String,
    position: i32,
    title: String,
    published_at: String,
    has_caption: bool,
    duration: String,
    source: VideoSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    cached_at: Option<String>,
    is_short: bool,
}

impl VideoCacheRow {
    fn new(channel_id: &ChannelId, position: usize, video: &Video) -> Self {
        Self {
            channel_id: channel_id.as_str().to_string(),
            video_id: video.id.as_str().to_string(),
            position: position as i32,
            title: video.title.clone(),
            published_at: video.published_at.clone(),
            has_caption: video.has_caption,
            duration: video.duration.clone(),
            source: video.source,
            cached_at: video.cached_at.clone(),
            is_short: video.is_short,
        }
    }
}

impl From<VideoCacheRow> for Video {
    fn from(row: VideoCacheRow) -> Self {
        Self {
            id: VideoId::from_string(row.video_id),
            title: row.title,
            published_at: row.published_at,
            has_caption: row.has_caption,
            duration: row.duration,
            source: row.source,
            cached_at: row.cached_at,
            is_short: row.is_short,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SummaryRow {
    cache_key: String,
    video_id: String,
    title: String,
    channel_name: String,
    summary: String,
    tags: Vec<String>,
    date: String,
}

impl From<&SummaryRecord> for SummaryRow {
    fn from(record: &SummaryRecord) -> Self {
        Self {
            cache_key: record.cache_key(),
            video_id: record.video_id.as_str().to_string(),
            title: record.title.clone(),
            channel_name: record.channel_name.clone(),
            summary: record.summary.clone(),
            tags: record.tags.clone(),
            date: record.date.clone(),
        }
    }
}

impl From<SummaryRow> for SummaryRecord {
    fn from(row: SummaryRow) -> Self {
        Self {
            video_id: VideoId::from_string(row.video_id),
            title: row.title,
            channel_name: row.channel_name,
            summary: row.summary,
            tags: row.tags,
            date: row.date,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct NotificationLogRow {
    channel_id: String,
    checked_video_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_checked_at: Option<String>,
}

impl From<&NotificationLogEntry> for NotificationLogRow {
    fn from(entry: &NotificationLogEntry) -> Self {
        Self {
            channel_id: entry.channel_id.as_str().to_string(),
            checked_video_ids: entry
                .checked_video_ids
                .iter()
                .map(|v| v.as_str().to_string())
                .collect(),
            last_checked_at: entry.last_checked_at.clone(),
        }
    }
}

impl From<NotificationLogRow> for NotificationLogEntry {
    fn from(row: NotificationLogRow) -> Self {
        Self {
            channel_id: ChannelId::from_string(row.channel_id),
            checked_video_ids: row
                .checked_video_ids
                .into_iter()
                .map(VideoId::from_string)
                .collect(),
            last_checked_at: row.last_checked_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SettingsRow {
    id: i32,
    notification_time: String,
    notification_platform: String,
    notification_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_run_date: Option<String>,
}

impl From<&UserSettings> for SettingsRow {
    fn from(settings: &UserSettings) -> Self {
        Self {
            id: 1,
            notification_time: settings.notification_time.clone(),
            notification_platform: settings.notification_platform.clone(),
            notification_enabled: settings.notification_enabled,
            last_run_date: settings.last_run_date.clone(),
        }
    }
}

impl From<SettingsRow> for UserSettings {
    fn from(row: SettingsRow) -> Self {
        Self {
            notification_time: row.notification_time,
            notification_platform: row.notification_platform,
            notification_enabled: row.notification_enabled,
            last_run_date: row.last_run_date,
        }
    }
}

// =============================================================================
// Repositories
// =============================================================================

pub struct SupabaseSubscriptionStore {
    client: SupabaseClient,
}

impl SupabaseSubscriptionStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SubscriptionRepository for SupabaseSubscriptionStore {
    async fn list(&self) -> StoreResult<Vec<Subscription>> {
        let rows: Vec<SubscriptionRow> = self
            .client
            .select(
                "subscriptions",
                &[
                    ("select", "*".to_string()),
                    ("order", "created_at.asc".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().map(Subscription::from).collect())
    }

    async fn get(&self, channel_id: &ChannelId) -> StoreResult<Option<Subscription>> {
        let rows: Vec<SubscriptionRow> = self
            .client
            .select("subscriptions", &[("channel_id", eq(channel_id))])
            .await?;
        Ok(rows.into_iter().next().map(Subscription::from))
    }

    async fn save(&self, subscription: &Subscription) -> StoreResult<()> {
        let mut row = SubscriptionRow::from(subscription);
        if row.created_at.is_none() {
            let existing = self.get(&subscription.channel_id).await?;
            row.created_at = existing
                .and_then(|s| s.created_at)
                .or_else(|| Some(datetime_stamp()));
        }
        self.client
            .upsert("subscriptions", "channel_id", &[row])
            .await
    }

    async fn delete(&self, channel_id: &ChannelId) -> StoreResult<bool> {
        let removed = self
            .client
            .delete_where("subscriptions", &[("channel_id", eq(channel_id))])
            .await?;
        Ok(removed > 0)
    }

    async fn set_last_processed(
        &self,
        channel_id: &ChannelId,
        video_id: &VideoId,
    ) -> StoreResult<()> {
        let updated = self
            .client
            .patch_where(
                "subscriptions",
                &[("channel_id", eq(channel_id))],
                &serde_json::json!({ "last_processed_video_id": video_id.as_str() }),
            )
            .await?;
        if updated == 0 {
            return Err(StoreError::not_found("subscription"));
        }
        Ok(())
    }
}

pub struct SupabaseVideoCacheStore {
    client: SupabaseClient,
}

impl SupabaseVideoCacheStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VideoCacheRepository for SupabaseVideoCacheStore {
    async fn get(&self, channel_id: &ChannelId) -> StoreResult<Vec<Video>> {
        let rows: Vec<VideoCacheRow> = self
            .client
            .select(
                "video_cache",
                &[
                    ("channel_id", eq(channel_id)),
                    ("order", "position.asc".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().map(Video::from).collect())
    }

    async fn replace(&self, channel_id: &ChannelId, videos: &[Video]) -> StoreResult<()> {
        self.client
            .delete_where("video_cache", &[("channel_id", eq(channel_id))])
            .await?;
        let stamped = stamp_cached_at(videos);
        let rows: Vec<VideoCacheRow> = stamped
            .iter()
            .enumerate()
            .map(|(i, v)| VideoCacheRow::new(channel_id, i, v))
            .collect();
        self.client
            .upsert("video_cache", "channel_id,video_id", &rows)
            .await?;
        debug!(channel_id = %channel_id, count = rows.len(), "Replaced video cache");
        Ok(())
    }

    async fn merge_prepend(&self, channel_id: &ChannelId, videos: &[Video]) -> StoreResult<usize> {
        let cached = self.get(channel_id).await?;
        let unseen: Vec<Video> = videos
            .iter()
            .filter(|v| !cached.iter().any(|c| c.id == v.id))
            .cloned()
            .collect();
        if unseen.is_empty() {
            return Ok(0);
        }
        let added = unseen.len();
        let mut merged = unseen;
        merged.extend(cached);
        self.replace(channel_id, &merged).await?;
        Ok(added)
    }

    async fn delete(&self, channel_id: &ChannelId) -> StoreResult<()> {
        self.client
            .delete_where("video_cache", &[("channel_id", eq(channel_id))])
            .await?;
        Ok(())
    }

    async fn find_video(&self, video_id: &VideoId) -> StoreResult<Option<(ChannelId, Video)>> {
        let rows: Vec<VideoCacheRow> = self
            .client
            .select(
                "video_cache",
                &[("video_id", eq(video_id)), ("limit", "1".to_string())],
            )
            .await?;
        Ok(rows.into_iter().next().map(|row| {
            let channel = ChannelId::from(row.channel_id.as_str());
            (channel, Video::from(row))
        }))
    }
}

pub struct SupabaseSummaryStore {
    client: SupabaseClient,
}

impl SupabaseSummaryStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SummaryRepository for SupabaseSummaryStore {
    async fn find(&self, video_id: &VideoId, tags: &[String]) -> StoreResult<Option<String>> {
        let key = summary_cache_key(video_id, tags);
        let rows: Vec<SummaryRow> = self
            .client
            .select("summaries", &[("cache_key", eq(key))])
            .await?;
        Ok(rows.into_iter().next().map(|row| row.summary))
    }

    async fn save(&self, record: &SummaryRecord) -> StoreResult<()> {
        let row = SummaryRow::from(record);
        self.client.upsert("summaries", "cache_key", &[row]).await?;
        debug!(video_id = %record.video_id, "Cached summary");
        Ok(())
    }

    async fn delete(&self, video_id: &VideoId, tags: &[String]) -> StoreResult<bool> {
        let key = summary_cache_key(video_id, tags);
        let removed = self
            .client
            .delete_where("summaries", &[("cache_key", eq(key))])
            .await?;
        Ok(removed > 0)
    }

    async fn delete_for_video(&self, video_id: &VideoId) -> StoreResult<u32> {
        self.client
            .delete_where("summaries", &[("video_id", eq(video_id))])
            .await
    }

    async fn find_all(&self) -> StoreResult<Vec<SummaryRecord>> {
        let rows: Vec<SummaryRow> = self
            .client
            .select("summaries", &[("order", "date.desc".to_string())])
            .await?;
        Ok(rows
            .into_iter()
            .map(SummaryRecord::from)
            .filter(|r| !r.is_briefing())
            .collect())
    }

    async fn find_for_date(&self, date: &str) -> StoreResult<Vec<SummaryRecord>> {
        let rows: Vec<SummaryRow> = self
            .client
            .select(
                "summaries",
                &[
                    ("date", format!("like.{date}*")),
                    ("order", "date.desc".to_string()),
                ],
            )
            .await?;
        Ok(rows
            .into_iter()
            .map(SummaryRecord::from)
            .filter(|r| !r.is_briefing())
            .collect())
    }

    async fn find_briefing(&self, date: &str) -> StoreResult<Option<SummaryRecord>> {
        let key = summary_cache_key(
            &VideoId::from_string(format!("BRIEFING_{date}")),
            &[BRIEFING_TAG.to_string()],
        );
        let rows: Vec<SummaryRow> = self
            .client
            .select("summaries", &[("cache_key", eq(key))])
            .await?;
        Ok(rows.into_iter().next().map(SummaryRecord::from))
    }
}

pub struct SupabaseNotificationLogStore {
    client: SupabaseClient,
}

impl SupabaseNotificationLogStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationLogRepository for SupabaseNotificationLogStore {
    async fn get(&self, channel_id: &ChannelId) -> StoreResult<Option<NotificationLogEntry>> {
        let rows: Vec<NotificationLogRow> = self
            .client
            .select("notification_log", &[("channel_id", eq(channel_id))])
            .await?;
        Ok(rows.into_iter().next().map(NotificationLogEntry::from))
    }

    async fn save(&self, entry: &NotificationLogEntry) -> StoreResult<()> {
        let row = NotificationLogRow::from(entry);
        self.client
            .upsert("notification_log", "channel_id", &[row])
            .await
    }

    async fn delete(&self, channel_id: &ChannelId) -> StoreResult<()> {
        self.client
            .delete_where("notification_log", &[("channel_id", eq(channel_id))])
            .await?;
        Ok(())
    }
}

pub struct SupabaseSettingsStore {
    client: SupabaseClient,
}

impl SupabaseSettingsStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SettingsRepository for SupabaseSettingsStore {
    async fn get(&self) -> StoreResult<UserSettings> {
        let rows: Vec<SettingsRow> = self
            .client
            .select("user_settings", &[("id", eq(1))])
            .await?;
        Ok(rows
            .into_iter()
            .next()
            .map(UserSettings::from)
            .unwrap_or_default())
    }

    async fn save(&self, settings: &UserSettings) -> StoreResult<()> {
        let row = SettingsRow::from(settings);
        self.client.upsert("user_settings", "id", &[row]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, headers, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> SupabaseClient {
        let config = SupabaseConfig {
            url: server.uri(),
            service_key: "test-key".to_string(),
            timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
        };
        SupabaseClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_get_videos_requests_position_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/video_cache"))
            .and(query_param("channel_id", "eq.UCa"))
            .and(query_param("order", "position.asc"))
            .and(header("apikey", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "channel_id": "UCa",
                    "video_id": "v1",
                    "position": 0,
                    "title": "First",
                    "published_at": "2025-06-01T00:00:00Z",
                    "has_caption": true,
                    "duration": "10:00",
                    "source": "api",
                    "is_short": false
                },
                {
                    "channel_id": "UCa",
                    "video_id": "v2",
                    "position": 1,
                    "title": "Second",
                    "published_at": "2025-05-30T00:00:00Z",
                    "has_caption": false,
                    "duration": "2:00",
                    "source": "rss",
                    "is_short": false
                }
            ])))
            .mount(&server)
            .await;

        let store = SupabaseVideoCacheStore::new(client(&server).await);
        let videos = store.get(&ChannelId::from("UCa")).await.unwrap();
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].id.as_str(), "v1");
        assert_eq!(videos[1].source, VideoSource::Rss);
    }

    #[tokio::test]
    async fn test_upsert_sends_merge_prefer_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/notification_log"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/notification_log"))
            .and(query_param("on_conflict", "channel_id"))
            .and(headers(
                "Prefer",
                vec!["resolution=merge-duplicates", "return=minimal"],
            ))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let store = SupabaseNotificationLogStore::new(client(&server).await);
        let entry = NotificationLogEntry::new(ChannelId::from("UCa"));
        store.save(&entry).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_for_video_counts_removed_rows() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/summaries"))
            .and(query_param("video_id", "eq.v1"))
            .and(header("Prefer", "return=representation"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"cache_key": "v1_none"},
                {"cache_key": "v1_ai"}
            ])))
            .mount(&server)
            .await;

        let store = SupabaseSummaryStore::new(client(&server).await);
        let removed = store.delete_for_video(&VideoId::from("v1")).await.unwrap();
        assert_eq!(removed, 2);
    }

    #[tokio::test]
    async fn test_settings_default_when_table_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/user_settings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let store = SupabaseSettingsStore::new(client(&server).await);
        let settings = store.get().await.unwrap();
        assert_eq!(settings.notification_time, "21:30");
    }

    #[tokio::test]
    async fn test_error_status_surfaces_request_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/subscriptions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let store = SupabaseSubscriptionStore::new(client(&server).await);
        let err = store.list().await.unwrap_err();
        assert!(matches!(err, StoreError::RequestFailed(_)));
    }
}
