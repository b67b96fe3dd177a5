//! Video metadata models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shorts::DURATION_UNKNOWN;

/// YouTube video identifier, as assigned by the upstream platform.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch URL for this video.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// YouTube channel identifier (the `UC…` form).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ChannelId(pub String);

impl ChannelId {
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ChannelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ChannelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Which upstream answered for a cached video.
///
/// API-sourced entries carry complete metadata; feed-sourced entries are
/// provisional and may be enriched later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum VideoSource {
    /// YouTube Data API (authoritative)
    #[default]
    Api,
    /// Channel RSS feed (best-effort, incomplete metadata)
    Rss,
}

impl VideoSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoSource::Api => "api",
            VideoSource::Rss => "rss",
        }
    }
}

impl fmt::Display for VideoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A video entry in a channel's cache.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Video {
    /// Upstream video ID
    pub id: VideoId,

    /// Video title
    pub title: String,

    /// Publication timestamp as delivered by the upstream (RFC 3339)
    pub published_at: String,

    /// Whether the upstream reports captions for this video
    #[serde(default)]
    pub has_caption: bool,

    /// Display duration (`"HH:MM:SS"` / `"MM:SS"`), or `"N/A"` when the
    /// feed did not provide one
    pub duration: String,

    /// Which upstream this entry came from
    #[serde(default)]
    pub source: VideoSource,

    /// When this entry was written to the cache (RFC 3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_at: Option<String>,

    /// Short-form classification result
    #[serde(default)]
    pub is_short: bool,
}

impl Video {
    /// True when the duration is known, i.e. the entry does not need
    /// enrichment from the authoritative source.
    pub fn has_complete_metadata(&self) -> bool {
        self.duration != DURATION_UNKNOWN
    }

    /// Canonical watch URL.
    pub fn watch_url(&self) -> String {
        self.id.watch_url()
    }
}
