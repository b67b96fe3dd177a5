//! Audio track download via yt-dlp.
//!
//! Used when a video has no usable captions: the audio goes to Gemini
//! for direct summarization. Files land in a scratch directory and the
//! pipeline removes them after every attempt.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use tbrief_models::VideoId;

use crate::error::{YoutubeError, YoutubeResult};

#[async_trait]
pub trait AudioProvider: Send + Sync {
    /// Download the audio track as MP3, returning the file path.
    async fn download(&self, video_id: &VideoId) -> YoutubeResult<PathBuf>;

    /// Remove a downloaded file. Failures are logged, not returned.
    async fn cleanup(&self, path: &Path);
}

/// yt-dlp backed audio provider.
pub struct YtDlpAudio {
    work_dir: PathBuf,
    timeout: Duration,
}

impl YtDlpAudio {
    pub fn new() -> Self {
        let timeout_secs: u64 = std::env::var("YTDLP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);
        Self {
            work_dir: std::env::temp_dir().join("tbrief-audio"),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn with_work_dir(work_dir: PathBuf, timeout: Duration) -> Self {
        Self { work_dir, timeout }
    }
}

impl Default for YtDlpAudio {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioProvider for YtDlpAudio {
    async fn download(&self, video_id: &VideoId) -> YoutubeResult<PathBuf> {
        tokio::fs::create_dir_all(&self.work_dir).await?;
        let path = self.work_dir.join(format!("{}.mp3", video_id.as_str()));
        let path_str = path.to_string_lossy().to_string();
        let url = video_id.watch_url();

        let args = [
            "-f",
            "bestaudio/best",
            "-x",
            "--audio-format",
            "mp3",
            "-o",
            path_str.as_str(),
            url.as_str(),
        ];

        debug!(video_id = %video_id, "Downloading audio via yt-dlp");
        let output = match tokio::time::timeout(
            self.timeout,
            tokio::process::Command::new("yt-dlp").args(args).output(),
        )
        .await
        {
            Ok(result) => result
                .map_err(|e| YoutubeError::tool_failed(format!("failed to run yt-dlp: {e}")))?,
            Err(_) => {
                return Err(YoutubeError::tool_failed(format!(
                    "yt-dlp timed out after {}s downloading audio for {}",
                    self.timeout.as_secs(),
                    video_id
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(YoutubeError::tool_failed(format!(
                "yt-dlp audio download failed: {}",
                stderr.trim()
            )));
        }
        if !path.exists() {
            return Err(YoutubeError::tool_failed(format!(
                "yt-dlp produced no audio file for {video_id}"
            )));
        }
        Ok(path)
    }

    async fn cleanup(&self, path: &Path) {
        if tokio::fs::remove_file(path).await.is_err() {
            warn!(path = %path.display(), "Failed to remove audio scratch file");
        }
    }
}
