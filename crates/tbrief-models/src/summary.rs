//! Summary records and cache key normalization.
//!
//! Summaries are cached under a key derived from the video ID and the
//! subscription tags so the same video can carry differently-angled
//! summaries. Older deployments stored bare summary strings; reads
//! tolerate those and synthesize a full record from the key.

use chrono::Local;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::video::VideoId;

/// Key prefix for daily briefing records.
pub const BRIEFING_PREFIX: &str = "BRIEFING_";

/// Tag attached to briefing records.
pub const BRIEFING_TAG: &str = "briefing";

/// Build the cache key for a video summary.
///
/// Tags are sorted so the key is insensitive to tag order; an empty tag
/// list maps to the literal `none`.
pub fn summary_cache_key(video_id: &VideoId, tags: &[String]) -> String {
    let mut sorted: Vec<&str> = tags.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    let suffix = if sorted.is_empty() {
        "none".to_string()
    } else {
        sorted.join(",")
    };
    format!("{}_{}", video_id.as_str(), suffix)
}

/// Today's date as `YYYY-MM-DD` in local time.
pub fn today_stamp() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Current local time as `YYYY-MM-DD HH:MM:SS`.
pub fn datetime_stamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// A cached summary with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SummaryRecord {
    pub video_id: VideoId,
    pub title: String,
    pub channel_name: String,
    pub summary: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Local timestamp, `YYYY-MM-DD HH:MM:SS`.
    pub date: String,
}

impl SummaryRecord {
    pub fn new(
        video_id: VideoId,
        title: impl Into<String>,
        channel_name: impl Into<String>,
        summary: impl Into<String>,
        tags: Vec<String>,
    ) -> Self {
        Self {
            video_id,
            title: title.into(),
            channel_name: channel_name.into(),
            summary: summary.into(),
            tags,
            date: datetime_stamp(),
        }
    }

    /// Synthetic record holding a daily briefing.
    pub fn briefing(date: &str, briefing: impl Into<String>) -> Self {
        Self {
            video_id: VideoId::from_string(format!("{BRIEFING_PREFIX}{date}")),
            title: format!("{date} 데일리 브리핑"),
            channel_name: "System".to_string(),
            summary: briefing.into(),
            tags: vec![BRIEFING_TAG.to_string()],
            date: format!("{date} 00:00:00"),
        }
    }

    pub fn is_briefing(&self) -> bool {
        self.video_id.as_str().starts_with(BRIEFING_PREFIX)
    }

    pub fn cache_key(&self) -> String {
        summary_cache_key(&self.video_id, &self.tags)
    }
}

/// A summary as persisted: either a full record or a legacy bare string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredSummary {
    Record(SummaryRecord),
    Legacy(String),
}

impl StoredSummary {
    pub fn summary_text(&self) -> &str {
        match self {
            StoredSummary::Record(record) => &record.summary,
            StoredSummary::Legacy(text) => text,
        }
    }

    /// Resolve to a full record, reconstructing legacy entries from the
    /// cache key they were stored under.
    pub fn into_record(self, key: &str) -> SummaryRecord {
        match self {
            StoredSummary::Record(record) => record,
            StoredSummary::Legacy(summary) => {
                let (video_id, tags) = split_legacy_key(key);
                SummaryRecord {
                    video_id: VideoId::from_string(video_id),
                    title: "Unknown".to_string(),
                    channel_name: "Unknown".to_string(),
                    summary,
                    tags,
                    date: String::new(),
                }
            }
        }
    }
}

/// Best-effort split of a cache key into video ID and tags.
fn split_legacy_key(key: &str) -> (String, Vec<String>) {
    match key.split_once('_') {
        Some((video_id, rest)) => {
            let tags = rest
                .split(['_', ','])
                .filter(|t| !t.is_empty() && *t != "none")
                .map(str::to_string)
                .collect();
            (video_id.to_string(), tags)
        }
        None => (key.to_string(), Vec::new()),
    }
}

/// Request body for `POST /api/summaries/generate`.
#[derive(Debug, Clone, Deserialize, Validate, JsonSchema)]
pub struct GenerateSummaryRequest {
    #[validate(length(min = 1, max = 20, message = "video_id must be 1-20 characters"))]
    pub video_id: String,
    /// Overrides the subscription tags when present.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_sorts_tags() {
        let id = VideoId::from("abc123xyz00");
        assert_eq!(
            summary_cache_key(&id, &["tech".to_string(), "ai".to_string()]),
            "abc123xyz00_ai,tech"
        );
    }

    #[test]
    fn test_cache_key_without_tags() {
        let id = VideoId::from("abc123xyz00");
        assert_eq!(summary_cache_key(&id, &[]), "abc123xyz00_none");
    }

    #[test]
    fn test_stored_summary_accepts_both_shapes() {
        let legacy: StoredSummary = serde_json::from_str(r#""plain text summary""#).unwrap();
        assert_eq!(legacy.summary_text(), "plain text summary");

        let record: StoredSummary = serde_json::from_str(
            r#"{"video_id": "abc", "title": "T", "channel_name": "C",
                "summary": "S", "tags": [], "date": "2025-01-01 00:00:00"}"#,
        )
        .unwrap();
        assert_eq!(record.summary_text(), "S");
    }

    #[test]
    fn test_legacy_record_synthesized_from_key() {
        let stored = StoredSummary::Legacy("old summary".to_string());
        let record = stored.into_record("abc123_news_tech");
        assert_eq!(record.video_id.as_str(), "abc123");
        assert_eq!(record.tags, vec!["news".to_string(), "tech".to_string()]);
        assert_eq!(record.summary, "old summary");
        assert_eq!(record.title, "Unknown");
    }

    #[test]
    fn test_legacy_record_none_suffix_has_no_tags() {
        let stored = StoredSummary::Legacy("s".to_string());
        let record = stored.into_record("abc123_none");
        assert!(record.tags.is_empty());
    }

    #[test]
    fn test_briefing_record() {
        let record = SummaryRecord::briefing("2025-06-01", "today's briefing");
        assert_eq!(record.video_id.as_str(), "BRIEFING_2025-06-01");
        assert_eq!(record.channel_name, "System");
        assert_eq!(record.tags, vec!["briefing".to_string()]);
        assert!(record.is_briefing());
        assert_eq!(record.cache_key(), "BRIEFING_2025-06-01_briefing");
    }
}
