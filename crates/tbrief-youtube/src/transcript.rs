//! Transcript extraction via yt-dlp.
//!
//! Tries manual and auto-generated subtitles per configured language,
//! then without a language restriction. Captions are flattened to plain
//! text for prompting.

use std::path::PathBuf;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};

use tbrief_models::VideoId;

use crate::error::{YoutubeError, YoutubeResult};

/// Transcript fetch configuration.
#[derive(Debug, Clone)]
pub struct TranscriptConfig {
    /// Subtitle languages to try in order, before an unrestricted pass.
    pub languages: Vec<String>,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            languages: vec!["ko".to_string(), "en".to_string()],
        }
    }
}

#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Plain transcript text, markup and rolling duplicates removed.
    async fn fetch(&self, video_id: &VideoId) -> YoutubeResult<String>;
}

/// yt-dlp backed transcript provider.
pub struct YtDlpTranscripts {
    config: TranscriptConfig,
}

impl YtDlpTranscripts {
    pub fn new(config: TranscriptConfig) -> Self {
        Self { config }
    }

    async fn try_language(
        &self,
        video_id: &VideoId,
        lang: Option<&str>,
    ) -> YoutubeResult<Option<String>> {
        let workdir = tempfile::tempdir()?;
        let output_template = workdir.path().join("%(id)s");
        let output_template_str = output_template.to_string_lossy();
        let url = video_id.watch_url();

        let mut args = vec![
            "--write-auto-sub",
            "--write-sub",
            "--skip-download",
            "--sub-format",
            "vtt",
            "--output",
            &output_template_str,
        ];
        if let Some(lang) = lang {
            args.push("--sub-lang");
            args.push(lang);
        }
        args.push(&url);

        let output = tokio::process::Command::new("yt-dlp")
            .args(&args)
            .output()
            .await
            .map_err(|e| YoutubeError::tool_failed(format!("failed to run yt-dlp: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                video_id = %video_id,
                lang = ?lang,
                error = %stderr.trim(),
                "yt-dlp subtitle download failed"
            );
            return Ok(None);
        }

        let mut vtt_files: Vec<PathBuf> = std::fs::read_dir(workdir.path())?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("vtt"))
            .collect();

        if vtt_files.is_empty() {
            return Ok(None);
        }

        // Prefer the requested language when several tracks came down
        if let Some(lang) = lang {
            let marker = format!(".{lang}");
            vtt_files.sort_by_key(|path| {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                if name.contains(&marker) {
                    0
                } else {
                    1
                }
            });
        }

        let content = tokio::fs::read_to_string(&vtt_files[0]).await?;
        let transcript = parse_vtt(&content);
        if transcript.is_empty() {
            return Ok(None);
        }
        Ok(Some(transcript))
    }
}

#[async_trait]
impl TranscriptProvider for YtDlpTranscripts {
    async fn fetch(&self, video_id: &VideoId) -> YoutubeResult<String> {
        for lang in &self.config.languages {
            if let Some(transcript) = self.try_language(video_id, Some(lang)).await? {
                debug!(video_id = %video_id, lang = %lang, "Transcript found");
                return Ok(transcript);
            }
        }
        if let Some(transcript) = self.try_language(video_id, None).await? {
            debug!(video_id = %video_id, "Transcript found without language restriction");
            return Ok(transcript);
        }
        Err(YoutubeError::TranscriptUnavailable(
            video_id.as_str().to_string(),
        ))
    }
}

/// Parse VTT content into plain transcript text.
fn parse_vtt(content: &str) -> String {
    let ts_pattern = Regex::new(r"((?:\d{2}:)?\d{2}:\d{2}\.\d{3}) -->.*").unwrap();
    let tag_pattern = Regex::new(r"<[^>]+>").unwrap();

    let mut transcript = String::new();
    let mut buffer_text = String::new();

    for line in content.lines() {
        let mut line = line.trim().to_string();

        // Remove tags
        line = tag_pattern.replace_all(&line, "").to_string();

        if line.is_empty() || line == "WEBVTT" {
            continue;
        }
        if line.starts_with("Kind:") || line.starts_with("Language:") || line.starts_with("NOTE") {
            continue;
        }
        if ts_pattern.is_match(&line) {
            continue;
        }

        // Skip cue numbers
        if line.chars().all(|c| c.is_numeric()) {
            continue;
        }

        // De-duplicate rolling captions
        if line != buffer_text {
            transcript.push_str(&line);
            transcript.push('\n');
            buffer_text = line;
        }
    }

    transcript.trim_end().to_string()
}
