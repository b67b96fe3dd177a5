//! YouTube Atom feed parsing.
//!
//! The per-channel feed at `feeds/videos.xml` carries roughly the 15
//! newest uploads with no duration or caption data. It costs no API
//! quota, which makes it the fallback listing source and the default
//! for new-video polling.

use chrono::{DateTime, Utc};
use feed_rs::model::Feed;
use tracing::debug;

use tbrief_models::{is_short, Video, VideoId, VideoSource, DURATION_UNKNOWN};

use crate::error::{YoutubeError, YoutubeResult};

/// Parse raw feed bytes.
pub(crate) fn parse_feed(bytes: &[u8]) -> YoutubeResult<Feed> {
    feed_rs::parser::parse(bytes).map_err(|e| YoutubeError::Feed(format!("unparseable feed: {e}")))
}

/// Channel name as the feed reports it.
pub(crate) fn feed_channel_name(feed: &Feed) -> Option<String> {
    feed.title.as_ref().map(|t| t.content.clone())
}

/// Entries published at or after `cutoff`, newest-first, shorts
/// filtered out by title tag.
pub(crate) fn feed_videos(feed: &Feed, cutoff: DateTime<Utc>) -> Vec<Video> {
    let mut videos: Vec<(DateTime<Utc>, Video)> = Vec::new();

    for entry in &feed.entries {
        let Some(id) = entry_video_id(&entry.id) else {
            debug!(entry_id = %entry.id, "Skipping feed entry without video ID");
            continue;
        };
        let Some(published) = entry.published else {
            debug!(entry_id = %entry.id, "Skipping feed entry without publish date");
            continue;
        };
        if published < cutoff {
            continue;
        }

        let title = entry
            .title
            .as_ref()
            .map(|t| t.content.clone())
            .unwrap_or_default();
        if is_short(&title, DURATION_UNKNOWN) {
            continue;
        }

        videos.push((
            published,
            Video {
                id: VideoId::from(id),
                title,
                published_at: published.to_rfc3339(),
                has_caption: false,
                duration: DURATION_UNKNOWN.to_string(),
                source: VideoSource::Rss,
                cached_at: None,
                is_short: false,
            },
        ));
    }

    videos.sort_by(|a, b| b.0.cmp(&a.0));
    videos.into_iter().map(|(_, v)| v).collect()
}

/// Feed entry IDs look like `yt:video:VIDEOID`.
fn entry_video_id(entry_id: &str) -> Option<&str> {
    entry_id.rsplit(':').next().filter(|id| !id.is_empty())
}
