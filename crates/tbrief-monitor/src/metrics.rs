//! Monitoring metrics.
//!
//! Counters are recorded through the `metrics` facade; the API binary
//! installs the Prometheus recorder that actually exposes them.

use metrics::counter;

/// Metric names, kept in one place so dashboards and alerts can
/// reference them without grepping the call sites.
pub mod names {
    pub const MONITOR_RUNS_TOTAL: &str = "tbrief_monitor_runs_total";
    pub const VIDEOS_PROCESSED_TOTAL: &str = "tbrief_monitor_videos_processed_total";
    pub const SUMMARIES_GENERATED_TOTAL: &str = "tbrief_summaries_generated_total";
    pub const SUMMARY_CACHE_HITS_TOTAL: &str = "tbrief_summary_cache_hits_total";
    pub const NOTIFICATIONS_SENT_TOTAL: &str = "tbrief_notifications_sent_total";
    pub const FEED_SERVED_TOTAL: &str = "tbrief_feed_served_total";
}

/// Record a monitor run attempt. `outcome` is `completed` or `refused`.
pub fn record_run(outcome: &str) {
    counter!(names::MONITOR_RUNS_TOTAL, "outcome" => outcome.to_string()).increment(1);
}

pub fn record_video_processed() {
    counter!(names::VIDEOS_PROCESSED_TOTAL).increment(1);
}

/// Record a summary generation. `strategy` is `transcript` or `audio`.
pub fn record_summary_generated(strategy: &str) {
    counter!(names::SUMMARIES_GENERATED_TOTAL, "strategy" => strategy.to_string()).increment(1);
}

pub fn record_summary_cache_hit() {
    counter!(names::SUMMARY_CACHE_HITS_TOTAL).increment(1);
}

/// Record a dispatched notification. `kind` is `video` or `briefing`.
pub fn record_notification_sent(kind: &str) {
    counter!(names::NOTIFICATIONS_SENT_TOTAL, "kind" => kind.to_string()).increment(1);
}

/// Record a channel fetch answered by the RSS feed instead of the
/// Data API.
pub fn record_feed_served() {
    counter!(names::FEED_SERVED_TOTAL).increment(1);
}
