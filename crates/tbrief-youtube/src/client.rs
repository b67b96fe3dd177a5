//! YouTube Data API client with RSS feed fallback.
//!
//! Listing prefers the Data API because it carries durations and
//! caption flags. When the key is missing or the daily quota is gone,
//! listing degrades to the per-channel Atom feed.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use tbrief_models::{
    format_iso8601_duration, is_short, parse_channel_reference, ChannelId, ChannelInfo,
    ChannelRef, Video, VideoId, VideoSource,
};

use crate::adapter::{FetchOutcome, VideoSourceAdapter};
use crate::error::{YoutubeError, YoutubeResult};
use crate::feed;

// =============================================================================
// Configuration
// =============================================================================

/// YouTube client configuration.
#[derive(Debug, Clone)]
pub struct YouTubeConfig {
    /// Data API key. Optional; without one, listing uses feeds only.
    pub api_key: Option<String>,
    /// Data API base URL
    pub api_base: String,
    /// Atom feed base URL
    pub feed_base: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://www.googleapis.com/youtube/v3".to_string(),
            feed_base: "https://www.youtube.com/feeds/videos.xml".to_string(),
            timeout: Duration::from_secs(20),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl YouTubeConfig {
    /// Create config from environment variables. A missing API key is
    /// not an error; listing falls back to the RSS feed.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("YOUTUBE_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            ..Default::default()
        }
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
    #[serde(rename = "channelId")]
    channel_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(rename = "publishedAt", default)]
    published_at: String,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    snippet: Snippet,
    #[serde(rename = "contentDetails")]
    content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    #[serde(default)]
    duration: String,
    #[serde(default)]
    caption: String,
}

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
struct ChannelItem {
    id: String,
    snippet: Snippet,
}

// =============================================================================
// Client
// =============================================================================

/// YouTube Data API client.
#[derive(Clone)]
pub struct YouTubeClient {
    http: Client,
    config: YouTubeConfig,
}

impl YouTubeClient {
    pub fn new(config: YouTubeConfig) -> YoutubeResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("tbrief-youtube/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(YoutubeError::Network)?;

        Ok(Self { http, config })
    }

    async fn check(response: Response) -> YoutubeResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::TOO_MANY_REQUESTS
            || (status == StatusCode::FORBIDDEN && body.contains("quotaExceeded"))
        {
            return Err(YoutubeError::QuotaExceeded(format!(
                "Data API returned {status}"
            )));
        }
        Err(YoutubeError::request_failed(format!(
            "Data API returned {status}: {body}"
        )))
    }

    async fn fetch_via_api(
        &self,
        key: &str,
        channel_id: &ChannelId,
        window_days: i64,
    ) -> YoutubeResult<Vec<Video>> {
        let published_after = (Utc::now() - chrono::Duration::days(window_days))
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

        let response = self
            .http
            .get(format!("{}/search", self.config.api_base))
            .query(&[
                ("key", key),
                ("channelId", channel_id.as_str()),
                ("part", "snippet"),
                ("order", "date"),
                ("type", "video"),
                ("maxResults", "50"),
                ("publishedAfter", published_after.as_str()),
            ])
            .send()
            .await?;
        let response = Self::check(response).await?;
        let search: SearchResponse = response.json().await?;

        let ids: Vec<String> = search
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        self.fetch_details(key, &ids, true).await
    }

    /// Durations and caption flags for the given IDs, returned in the
    /// order of `ids`. The videos endpoint does not keep request order.
    async fn fetch_details(
        &self,
        key: &str,
        ids: &[String],
        filter_shorts: bool,
    ) -> YoutubeResult<Vec<Video>> {
        let response = self
            .http
            .get(format!("{}/videos", self.config.api_base))
            .query(&[
                ("key", key),
                ("id", ids.join(",").as_str()),
                ("part", "contentDetails,snippet"),
            ])
            .send()
            .await?;
        let response = Self::check(response).await?;
        let listed: VideoListResponse = response.json().await?;

        let mut by_id: HashMap<&str, &VideoItem> =
            listed.items.iter().map(|item| (item.id.as_str(), item)).collect();

        let mut videos = Vec::new();
        for id in ids {
            let Some(item) = by_id.remove(id.as_str()) else {
                continue;
            };
            let duration = format_iso8601_duration(&item.content_details.duration);
            let short = is_short(&item.snippet.title, &duration);
            if filter_shorts && short {
                continue;
            }
            videos.push(Video {
                id: VideoId::from(id.as_str()),
                title: item.snippet.title.clone(),
                published_at: item.snippet.published_at.clone(),
                has_caption: item.content_details.caption == "true",
                duration,
                source: VideoSource::Api,
                cached_at: None,
                is_short: short,
            });
        }
        Ok(videos)
    }

    async fn fetch_feed(&self, channel_id: &ChannelId) -> YoutubeResult<feed_rs::model::Feed> {
        let response = self
            .http
            .get(&self.config.feed_base)
            .query(&[("channel_id", channel_id.as_str())])
            .send()
            .await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(YoutubeError::channel_not_found(channel_id.as_str()));
        }
        if !status.is_success() {
            return Err(YoutubeError::Feed(format!("feed returned {status}")));
        }
        let bytes = response.bytes().await?;
        feed::parse_feed(&bytes)
    }

    fn require_key(&self, what: &str) -> YoutubeResult<String> {
        self.config
            .api_key
            .clone()
            .ok_or_else(|| YoutubeError::Config(format!("YOUTUBE_API_KEY is required for {what}")))
    }

    async fn lookup_channel(&self, key: &str, param: (&str, &str)) -> YoutubeResult<ChannelInfo> {
        let response = self
            .http
            .get(format!("{}/channels", self.config.api_base))
            .query(&[("key", key), ("part", "snippet"), param])
            .send()
            .await?;
        let response = Self::check(response).await?;
        let listed: ChannelListResponse = response.json().await?;

        listed
            .items
            .into_iter()
            .next()
            .map(|item| ChannelInfo {
                channel_id: ChannelId::from_string(item.id),
                channel_name: item.snippet.title,
            })
            .ok_or_else(|| YoutubeError::channel_not_found(param.1))
    }

    async fn search_channel(&self, key: &str, query: &str) -> YoutubeResult<ChannelInfo> {
        let response = self
            .http
            .get(format!("{}/search", self.config.api_base))
            .query(&[
                ("key", key),
                ("part", "snippet"),
                ("type", "channel"),
                ("maxResults", "1"),
                ("q", query),
            ])
            .send()
            .await?;
        let response = Self::check(response).await?;
        let search: SearchResponse = response.json().await?;

        search
            .items
            .into_iter()
            .find_map(|item| {
                let channel_id = item.id.channel_id?;
                Some(ChannelInfo {
                    channel_id: ChannelId::from_string(channel_id),
                    channel_name: item.snippet.title,
                })
            })
            .ok_or_else(|| YoutubeError::channel_not_found(query))
    }
}

#[async_trait]
impl VideoSourceAdapter for YouTubeClient {
    async fn fetch_recent(
        &self,
        channel_id: &ChannelId,
        window_days: i64,
    ) -> YoutubeResult<FetchOutcome> {
        if let Some(key) = self.config.api_key.clone() {
            match self.fetch_via_api(&key, channel_id, window_days).await {
                Ok(videos) => {
                    return Ok(FetchOutcome {
                        videos,
                        authoritative: true,
                    })
                }
                Err(e) if e.is_quota_exceeded() => {
                    warn!(channel_id = %channel_id, "Data API quota exhausted, falling back to feed");
                }
                Err(e) => return Err(e),
            }
        } else {
            debug!(channel_id = %channel_id, "No YouTube API key configured, listing via feed");
        }

        let videos = self.fetch_recent_feed_only(channel_id, window_days).await?;
        Ok(FetchOutcome {
            videos,
            authoritative: false,
        })
    }

    async fn fetch_recent_feed_only(
        &self,
        channel_id: &ChannelId,
        window_days: i64,
    ) -> YoutubeResult<Vec<Video>> {
        let feed = self.fetch_feed(channel_id).await?;
        let cutoff = Utc::now() - chrono::Duration::days(window_days);
        Ok(feed::feed_videos(&feed, cutoff))
    }

    async fn fetch_single_metadata(&self, video_id: &VideoId) -> YoutubeResult<Option<Video>> {
        let Some(key) = self.config.api_key.clone() else {
            debug!(video_id = %video_id, "Cannot enrich metadata without an API key");
            return Ok(None);
        };
        let videos = self
            .fetch_details(&key, &[video_id.as_str().to_string()], false)
            .await?;
        Ok(videos.into_iter().next())
    }

    async fn resolve_channel(&self, reference: &str) -> YoutubeResult<ChannelInfo> {
        let parsed = parse_channel_reference(reference)
            .map_err(|e| YoutubeError::InvalidReference(e.to_string()))?;

        match parsed {
            ChannelRef::Id(id) => match self.config.api_key.clone() {
                Some(key) => self.lookup_channel(&key, ("id", id.as_str())).await,
                None => {
                    let channel_id = ChannelId::from(id.as_str());
                    let feed = self.fetch_feed(&channel_id).await?;
                    let channel_name =
                        feed::feed_channel_name(&feed).unwrap_or_else(|| id.clone());
                    Ok(ChannelInfo {
                        channel_id,
                        channel_name,
                    })
                }
            },
            ChannelRef::Handle(handle) => {
                let key = self.require_key("resolving @handles")?;
                let for_handle = format!("@{handle}");
                self.lookup_channel(&key, ("forHandle", for_handle.as_str()))
                    .await
            }
            ChannelRef::Query(query) => {
                let key = self.require_key("channel search")?;
                self.search_channel(&key, &query).await
            }
        }
    }
}
