//! Notification ledger model and new-video reporting.

use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::video::{ChannelId, VideoId};

/// Per-channel record of which videos have already been surfaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NotificationLogEntry {
    pub channel_id: ChannelId,
    /// Every video ID ever counted as new for this channel.
    #[serde(default)]
    pub checked_video_ids: BTreeSet<VideoId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_checked_at: Option<String>,
}

impl NotificationLogEntry {
    pub fn new(channel_id: ChannelId) -> Self {
        Self {
            channel_id,
            checked_video_ids: BTreeSet::new(),
            last_checked_at: None,
        }
    }

    pub fn has_checked(&self, video_id: &VideoId) -> bool {
        self.checked_video_ids.contains(video_id)
    }
}

/// One channel's slice of a new-video check.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ChannelNewVideos {
    pub channel_id: ChannelId,
    pub channel_name: String,
    pub new_count: usize,
}

/// Aggregate response for `GET /api/notifications/new`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct NewVideosReport {
    pub total_new: usize,
    pub channels: Vec<ChannelNewVideos>,
}

impl NewVideosReport {
    pub fn push(&mut self, channel_id: ChannelId, channel_name: String, new_count: usize) {
        self.total_new += new_count;
        self.channels.push(ChannelNewVideos {
            channel_id,
            channel_name,
            new_count,
        });
    }
}

/// Request body for `POST /api/notifications/check`.
///
/// `channel_id` is either a concrete channel or `*` for all of them.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct MarkCheckedRequest {
    pub channel_id: String,
}

impl MarkCheckedRequest {
    pub fn is_wildcard(&self) -> bool {
        self.channel_id == "*"
    }
}
