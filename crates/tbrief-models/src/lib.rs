//! Shared data models for the TubeBrief backend.
//!
//! This crate provides Serde-serializable types for:
//! - Cached videos and their upstream source provenance
//! - Channel subscriptions and monitoring cursors
//! - Summary records and the tag-normalized cache keys
//! - The per-channel notification ledger
//! - User notification settings and monitor run reports

pub mod channel;
pub mod notification;
pub mod report;
pub mod settings;
pub mod shorts;
pub mod subscription;
pub mod summary;
pub mod video;

// Re-export common types
pub use channel::{parse_channel_reference, ChannelInfo, ChannelRef, ChannelRefError};
pub use notification::{ChannelNewVideos, MarkCheckedRequest, NewVideosReport, NotificationLogEntry};
pub use report::{BriefingOutcome, RunReport, RunRequest};
pub use settings::{UpdateSettingsRequest, UserSettings};
pub use shorts::{format_iso8601_duration, is_short, DURATION_UNKNOWN};
pub use subscription::{CreateSubscriptionRequest, Subscription, UpdateSubscriptionRequest};
pub use summary::{
    summary_cache_key, today_stamp, GenerateSummaryRequest, StoredSummary, SummaryRecord,
    BRIEFING_PREFIX, BRIEFING_TAG,
};
pub use video::{ChannelId, Video, VideoId, VideoSource};
