//! Channel subscription model and request DTOs.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::video::{ChannelId, VideoId};

/// A monitored YouTube channel.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Subscription {
    pub channel_id: ChannelId,
    pub channel_name: String,
    /// Tags steer the summary prompt and key the summary cache.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Topic labels for grouping channels. Not part of any cache key.
    #[serde(default)]
    pub categories: Vec<String>,
    /// Inactive subscriptions are kept but skipped by the monitor.
    #[serde(default = "default_active")]
    pub active: bool,
    /// Newest video already summarized by a monitor run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_processed_video_id: Option<VideoId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

fn default_active() -> bool {
    true
}

impl Subscription {
    pub fn new(channel_id: ChannelId, channel_name: impl Into<String>) -> Self {
        Self {
            channel_id,
            channel_name: channel_name.into(),
            tags: Vec::new(),
            categories: Vec::new(),
            active: true,
            last_processed_video_id: None,
            created_at: None,
        }
    }
}

/// Request body for `POST /api/subscriptions`.
#[derive(Debug, Clone, Deserialize, Validate, JsonSchema)]
pub struct CreateSubscriptionRequest {
    /// Channel ID, `@handle`, channel URL, or search text.
    #[validate(length(min = 1, max = 200, message = "channel must be 1-200 characters"))]
    pub channel: String,
    #[serde(default)]
    #[validate(length(max = 20, message = "at most 20 tags"))]
    pub tags: Vec<String>,
    #[serde(default)]
    #[validate(length(max = 20, message = "at most 20 categories"))]
    pub categories: Vec<String>,
}

/// Request body for `PUT /api/subscriptions/:channel_id`.
#[derive(Debug, Clone, Default, Deserialize, Validate, JsonSchema)]
pub struct UpdateSubscriptionRequest {
    #[validate(length(min = 1, max = 200, message = "channel_name must be 1-200 characters"))]
    pub channel_name: Option<String>,
    #[validate(length(max = 20, message = "at most 20 tags"))]
    pub tags: Option<Vec<String>>,
    #[validate(length(max = 20, message = "at most 20 categories"))]
    pub categories: Option<Vec<String>>,
    pub active: Option<bool>,
}
