//! Mocked collaborators and fixtures shared across the service tests.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mockall::mock;
use tempfile::TempDir;

use tbrief_ai::{AiProvider, AiResult};
use tbrief_models::{ChannelId, ChannelInfo, Video, VideoId, VideoSource, DURATION_UNKNOWN};
use tbrief_notify::{Notifier, NotifyResult};
use tbrief_store::Stores;
use tbrief_youtube::{
    AudioProvider, FetchOutcome, TranscriptProvider, VideoSourceAdapter, YoutubeResult,
};

mock! {
    pub Source {}

    #[async_trait]
    impl VideoSourceAdapter for Source {
        async fn fetch_recent(
            &self,
            channel_id: &ChannelId,
            window_days: i64,
        ) -> YoutubeResult<FetchOutcome>;

        async fn fetch_recent_feed_only(
            &self,
            channel_id: &ChannelId,
            window_days: i64,
        ) -> YoutubeResult<Vec<Video>>;

        async fn fetch_single_metadata(&self, video_id: &VideoId) -> YoutubeResult<Option<Video>>;

        async fn resolve_channel(&self, reference: &str) -> YoutubeResult<ChannelInfo>;
    }
}

mock! {
    pub Transcripts {}

    #[async_trait]
    impl TranscriptProvider for Transcripts {
        async fn fetch(&self, video_id: &VideoId) -> YoutubeResult<String>;
    }
}

mock! {
    pub Audio {}

    #[async_trait]
    impl AudioProvider for Audio {
        async fn download(&self, video_id: &VideoId) -> YoutubeResult<PathBuf>;

        async fn cleanup(&self, path: &Path);
    }
}

mock! {
    pub Ai {}

    #[async_trait]
    impl AiProvider for Ai {
        async fn complete(&self, prompt: &str, models: &[String]) -> AiResult<String>;

        async fn complete_with_audio(
            &self,
            audio_path: &Path,
            prompt: &str,
            models: &[String],
        ) -> AiResult<String>;
    }
}

mock! {
    pub Notifier {}

    #[async_trait]
    impl Notifier for Notifier {
        async fn send(&self, text: &str) -> NotifyResult<bool>;

        fn is_configured(&self) -> bool;
    }
}

/// File-backed stores in a fresh temp directory. Keep the `TempDir`
/// alive for the duration of the test.
pub fn file_stores() -> (TempDir, Stores) {
    let dir = tempfile::tempdir().unwrap();
    let stores = Stores::file(dir.path());
    (dir, stores)
}

/// Fully-populated API-sourced video.
pub fn api_video(id: &str, published_at: &str) -> Video {
    Video {
        id: VideoId::from(id),
        title: format!("Video {id}"),
        published_at: published_at.to_string(),
        has_caption: true,
        duration: "12:34".to_string(),
        source: VideoSource::Api,
        cached_at: None,
        is_short: false,
    }
}

/// Feed-sourced video with the placeholder duration.
pub fn rss_video(id: &str, published_at: &str) -> Video {
    Video {
        id: VideoId::from(id),
        title: format!("Video {id}"),
        published_at: published_at.to_string(),
        has_caption: false,
        duration: DURATION_UNKNOWN.to_string(),
        source: VideoSource::Rss,
        cached_at: None,
        is_short: false,
    }
}
