//! Summary generation pipeline.
//!
//! Cache first, then transcript summarization, then audio as the last
//! resort. A summary is persisted only after it survives the invalid-
//! output screen, so failed attempts never poison the cache.

use std::sync::Arc;

use tracing::{debug, info};

use tbrief_ai::{is_invalid_summary, model_priority, prompts, AiProvider};
use tbrief_models::{SummaryRecord, Video};
use tbrief_store::SummaryRepository;
use tbrief_youtube::{AudioProvider, TranscriptProvider};

use crate::error::{MonitorError, MonitorResult};

/// Transcripts are capped before prompting; Gemini does not need an
/// hour of captions to produce five lines.
const DEFAULT_MAX_TRANSCRIPT_CHARS: usize = 10_000;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub max_transcript_chars: usize,
    /// Model priority list handed to every completion call.
    pub models: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_transcript_chars: DEFAULT_MAX_TRANSCRIPT_CHARS,
            models: model_priority(None),
        }
    }
}

impl PipelineConfig {
    /// Configuration from `TRANSCRIPT_MAX_CHARS` and `GEMINI_MODEL`.
    pub fn from_env() -> Self {
        let max_transcript_chars = std::env::var("TRANSCRIPT_MAX_CHARS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_TRANSCRIPT_CHARS);
        let preferred = std::env::var("GEMINI_MODEL")
            .ok()
            .filter(|v| !v.is_empty());
        Self {
            max_transcript_chars,
            models: model_priority(preferred.as_deref()),
        }
    }
}

pub struct SummaryPipeline {
    summaries: Arc<dyn SummaryRepository>,
    transcripts: Arc<dyn TranscriptProvider>,
    audio: Arc<dyn AudioProvider>,
    ai: Arc<dyn AiProvider>,
    config: PipelineConfig,
}

impl SummaryPipeline {
    pub fn new(
        summaries: Arc<dyn SummaryRepository>,
        transcripts: Arc<dyn TranscriptProvider>,
        audio: Arc<dyn AudioProvider>,
        ai: Arc<dyn AiProvider>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            summaries,
            transcripts,
            audio,
            ai,
            config,
        }
    }

    /// Return the cached summary for this video and tag set, or
    /// generate, persist, and return a fresh one.
    pub async fn get_or_generate(
        &self,
        video: &Video,
        channel_name: &str,
        tags: &[String],
    ) -> MonitorResult<String> {
        if let Some(cached) = self.summaries.find(&video.id, tags).await? {
            debug!(video_id = %video.id, "Summary cache hit");
            crate::metrics::record_summary_cache_hit();
            return Ok(cached);
        }

        let summary = self.generate(video, tags).await?;

        let record = SummaryRecord::new(
            video.id.clone(),
            &video.title,
            channel_name,
            &summary,
            tags.to_vec(),
        );
        self.summaries.save(&record).await?;
        Ok(summary)
    }

    async fn generate(&self, video: &Video, tags: &[String]) -> MonitorResult<String> {
        match self.summarize_transcript(video, tags).await {
            Ok(summary) => {
                crate::metrics::record_summary_generated("transcript");
                return Ok(summary);
            }
            Err(e) => {
                info!(
                    video_id = %video.id,
                    "Transcript strategy failed, falling back to audio: {}",
                    e
                );
            }
        }

        let summary = self.summarize_audio(video, tags).await?;
        crate::metrics::record_summary_generated("audio");
        Ok(summary)
    }

    async fn summarize_transcript(&self, video: &Video, tags: &[String]) -> MonitorResult<String> {
        let transcript = self.transcripts.fetch(&video.id).await?;
        let capped = truncate_chars(&transcript, self.config.max_transcript_chars);
        let prompt = prompts::video_summary_prompt(tags, capped);

        let summary = self.ai.complete(&prompt, &self.config.models).await?;
        if is_invalid_summary(&summary) {
            return Err(MonitorError::generation_failed(
                "model reported the transcript as unusable",
            ));
        }
        Ok(summary)
    }

    async fn summarize_audio(&self, video: &Video, tags: &[String]) -> MonitorResult<String> {
        let path = self.audio.download(&video.id).await?;
        let prompt = prompts::audio_summary_prompt(tags);

        // The temp file goes away no matter how the completion ends.
        let result = self
            .ai
            .complete_with_audio(&path, &prompt, &self.config.models)
            .await;
        self.audio.cleanup(&path).await;

        let summary = result?;
        if is_invalid_summary(&summary) {
            return Err(MonitorError::generation_failed(
                "audio summary reported no usable content",
            ));
        }
        Ok(summary)
    }
}

/// Cap `text` at `max_chars` characters, respecting char boundaries.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
