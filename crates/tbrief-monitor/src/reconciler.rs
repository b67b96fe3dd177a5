//! Video cache reconciliation.
//!
//! A fetch window and the durable cache disagree in two distinct ways.
//! An authoritative (Data API) window is complete for its date range,
//! so any cached video missing from it is genuinely older and must be
//! preserved behind the fresh list. A feed-derived window is
//! best-effort, so its videos can only be prepended ahead of what is
//! already cached. The reconciler decides which shape applies, attempts
//! metadata enrichment for preserved feed stragglers, and reports which
//! videos' summaries went stale in the process.

use std::collections::HashSet;

use tracing::{debug, info};

use tbrief_models::{ChannelId, Video, VideoId, VideoSource};
use tbrief_youtube::VideoSourceAdapter;

/// How the reconciled list should be written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistMode {
    /// `videos` is the complete new cache contents.
    Replace,
    /// `videos` are unseen entries to prepend ahead of the cache.
    Merge,
}

/// Result of reconciling one fetch against the cached list.
#[derive(Debug)]
pub struct ReconcileOutcome {
    pub videos: Vec<Video>,
    pub mode: PersistMode,
    /// Videos whose metadata materially improved. Summaries keyed on
    /// them were generated from placeholder metadata and must go.
    pub evict: Vec<VideoId>,
}

/// Reconcile a fetched window with the cached video list.
///
/// `authoritative` mirrors [`tbrief_youtube::FetchOutcome`]: true for
/// Data API windows, false for feed-derived ones.
pub async fn reconcile(
    source: &dyn VideoSourceAdapter,
    channel_id: &ChannelId,
    fresh: Vec<Video>,
    authoritative: bool,
    cached: Vec<Video>,
) -> ReconcileOutcome {
    if authoritative {
        reconcile_window(source, channel_id, fresh, cached).await
    } else {
        let cached_ids: HashSet<VideoId> = cached.into_iter().map(|v| v.id).collect();
        let unseen: Vec<Video> = fresh
            .into_iter()
            .filter(|v| !cached_ids.contains(&v.id))
            .collect();
        ReconcileOutcome {
            videos: unseen,
            mode: PersistMode::Merge,
            evict: Vec::new(),
        }
    }
}

async fn reconcile_window(
    source: &dyn VideoSourceAdapter,
    channel_id: &ChannelId,
    fresh: Vec<Video>,
    cached: Vec<Video>,
) -> ReconcileOutcome {
    let fresh_ids: HashSet<VideoId> = fresh.iter().map(|v| v.id.clone()).collect();
    let mut evict = Vec::new();

    // A cached placeholder that now has a complete fresh counterpart
    // carries summaries generated from inferior metadata.
    for video in &fresh {
        if let Some(old) = cached.iter().find(|c| c.id == video.id) {
            if !old.has_complete_metadata() && video.has_complete_metadata() {
                evict.push(video.id.clone());
            }
        }
    }

    // Cached videos absent from the window predate it. Feed-sourced
    // ones without real metadata get one enrichment attempt; lookup
    // failures keep the placeholder as-is.
    let mut preserved = Vec::new();
    for video in cached {
        if fresh_ids.contains(&video.id) {
            continue;
        }
        if video.source == VideoSource::Rss && !video.has_complete_metadata() {
            match source.fetch_single_metadata(&video.id).await {
                Ok(Some(enriched)) if enriched.has_complete_metadata() => {
                    info!(
                        channel_id = %channel_id,
                        video_id = %video.id,
                        "Enriched preserved feed video"
                    );
                    evict.push(enriched.id.clone());
                    preserved.push(enriched);
                }
                Ok(_) => {
                    debug!(video_id = %video.id, "No better metadata available");
                    preserved.push(video);
                }
                Err(e) => {
                    debug!(video_id = %video.id, "Metadata lookup failed: {}", e);
                    preserved.push(video);
                }
            }
        } else {
            preserved.push(video);
        }
    }

    let mut videos = fresh;
    videos.extend(preserved);
    ReconcileOutcome {
        videos,
        mode: PersistMode::Replace,
        evict,
    }
}
