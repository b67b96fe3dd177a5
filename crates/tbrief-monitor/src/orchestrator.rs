//! The monitor run loop.
//!
//! One run walks every active subscription: fetch the recent window,
//! reconcile it into the cache, summarize videos newer than the
//! channel's marker (oldest first), and notify per video. Markers are
//! collected during the loop and persisted once at the end, after
//! every channel has been visited. An in-memory guard refuses
//! overlapping runs; it is deliberately not persisted, so a crashed
//! process starts clean.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use tbrief_ai::{model_priority, prompts, AiProvider};
use tbrief_models::summary::today_stamp;
use tbrief_models::{
    BriefingOutcome, ChannelId, RunReport, Subscription, SummaryRecord, Video, VideoId,
};
use tbrief_notify::{briefing_message, video_summary_message, Notifier};
use tbrief_store::Stores;
use tbrief_youtube::VideoSourceAdapter;

use crate::channels::ChannelService;
use crate::error::MonitorResult;
use crate::pipeline::SummaryPipeline;
use crate::reconciler::reconcile;

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Fetch window per subscription.
    pub window_days: i64,
    /// Pause between consecutive upstream-heavy steps.
    pub delay: Duration,
    /// Model priority list for briefing generation.
    pub models: Vec<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            window_days: 2,
            delay: Duration::from_millis(2000),
            models: model_priority(None),
        }
    }
}

impl MonitorConfig {
    /// Configuration from `MONITOR_WINDOW_DAYS`, `MONITOR_DELAY_MS`,
    /// and `GEMINI_MODEL`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let window_days = std::env::var("MONITOR_WINDOW_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.window_days);
        let delay = std::env::var("MONITOR_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.delay);
        let preferred = std::env::var("GEMINI_MODEL")
            .ok()
            .filter(|v| !v.is_empty());
        Self {
            window_days,
            delay,
            models: model_priority(preferred.as_deref()),
        }
    }
}

pub struct MonitorOrchestrator {
    stores: Stores,
    source: Arc<dyn VideoSourceAdapter>,
    channels: ChannelService,
    pipeline: Arc<SummaryPipeline>,
    notifier: Arc<dyn Notifier>,
    ai: Arc<dyn AiProvider>,
    running: AtomicBool,
    config: MonitorConfig,
}

/// Clears the run flag when the run ends, panics included.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl MonitorOrchestrator {
    pub fn new(
        stores: Stores,
        source: Arc<dyn VideoSourceAdapter>,
        pipeline: Arc<SummaryPipeline>,
        notifier: Arc<dyn Notifier>,
        ai: Arc<dyn AiProvider>,
        config: MonitorConfig,
    ) -> Self {
        let channels = ChannelService::new(stores.clone(), source.clone());
        Self {
            stores,
            source,
            channels,
            pipeline,
            notifier,
            ai,
            running: AtomicBool::new(false),
            config,
        }
    }

    /// Execute one monitor run, or refuse if one is already in flight.
    pub async fn run_once(&self, include_briefing: bool) -> RunReport {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            info!("Monitor run already in progress, refusing");
            crate::metrics::record_run("refused");
            return RunReport::refused();
        }
        let _guard = RunGuard(&self.running);

        let report = self.run_inner(include_briefing).await;
        crate::metrics::record_run("completed");
        report
    }

    async fn run_inner(&self, include_briefing: bool) -> RunReport {
        let mut report = RunReport::started();
        info!(run_id = %report.run_id, include_briefing, "Monitor run started");

        let subscriptions = match self.stores.subscriptions.list().await {
            Ok(subs) => subs,
            Err(e) => {
                error!("Could not load subscriptions: {}", e);
                report.record_error(format!("subscription load failed: {e}"));
                return report;
            }
        };

        let mut markers: Vec<(ChannelId, VideoId)> = Vec::new();
        let mut first = true;
        for sub in subscriptions.iter().filter(|s| s.active) {
            if !first {
                tokio::time::sleep(self.config.delay).await;
            }
            first = false;
            report.channels_checked += 1;

            let mut marker = None;
            let result = self
                .process_subscription(sub, &mut report, &mut marker)
                .await;
            if let Some(video_id) = marker {
                markers.push((sub.channel_id.clone(), video_id));
            }
            if let Err(e) = result {
                warn!(channel_id = %sub.channel_id, "Subscription check failed: {}", e);
                report.record_error(format!("{}: {e}", sub.channel_id));
            }
        }

        // Markers are written only after the full pass so a failure in
        // one channel never leaves earlier channels half-committed.
        for (channel_id, video_id) in markers {
            if let Err(e) = self
                .stores
                .subscriptions
                .set_last_processed(&channel_id, &video_id)
                .await
            {
                warn!(channel_id = %channel_id, "Could not persist marker: {}", e);
                report.record_error(format!("marker {channel_id}: {e}"));
            }
        }

        if include_briefing {
            report.briefing = self.run_briefing(&mut report.notifications_sent).await;
        }

        info!(
            run_id = %report.run_id,
            channels = report.channels_checked,
            videos = report.videos_processed,
            notifications = report.notifications_sent,
            errors = report.errors.len(),
            "Monitor run finished"
        );
        report
    }

    /// Check one subscription. `marker` tracks the newest successfully
    /// summarized video and stops advancing at the first failure, so a
    /// later run retries everything from the failed video onward.
    async fn process_subscription(
        &self,
        sub: &Subscription,
        report: &mut RunReport,
        marker: &mut Option<VideoId>,
    ) -> MonitorResult<()> {
        debug!(channel_id = %sub.channel_id, "Checking {}", sub.channel_name);

        let outcome = self
            .source
            .fetch_recent(&sub.channel_id, self.config.window_days)
            .await?;
        if !outcome.authoritative {
            crate::metrics::record_feed_served();
        }

        let cached = self.stores.videos.get(&sub.channel_id).await?;
        let reconciled = reconcile(
            self.source.as_ref(),
            &sub.channel_id,
            outcome.videos.clone(),
            outcome.authoritative,
            cached,
        )
        .await;
        self.channels.apply(&sub.channel_id, &reconciled).await?;

        let new_videos = filter_new_videos(&outcome.videos, sub.last_processed_video_id.as_ref());
        if new_videos.is_empty() {
            debug!(channel_id = %sub.channel_id, "No new videos");
            return Ok(());
        }
        info!(
            channel_id = %sub.channel_id,
            count = new_videos.len(),
            "Found new videos for {}",
            sub.channel_name
        );

        let mut marker_frozen = false;
        let mut first = true;
        // Oldest first, so the marker always moves forward in
        // publication order.
        for video in new_videos.iter().rev() {
            if !first {
                tokio::time::sleep(self.config.delay).await;
            }
            first = false;

            report.videos_processed += 1;
            crate::metrics::record_video_processed();

            match self
                .pipeline
                .get_or_generate(video, &sub.channel_name, &sub.tags)
                .await
            {
                Ok(summary) => {
                    self.notify_video(sub, video, &summary, report).await;
                    if !marker_frozen {
                        *marker = Some(video.id.clone());
                    }
                }
                Err(e) => {
                    warn!(video_id = %video.id, "Summary failed: {}", e);
                    report.record_error(format!("{}: {e}", video.id));
                    marker_frozen = true;
                }
            }
        }

        Ok(())
    }

    async fn notify_video(
        &self,
        sub: &Subscription,
        video: &Video,
        summary: &str,
        report: &mut RunReport,
    ) {
        if !self.notifier.is_configured() {
            debug!("Notifier not configured, skipping notification");
            return;
        }
        let message = video_summary_message(&sub.channel_name, video, summary);
        match self.notifier.send(&message).await {
            Ok(true) => {
                report.notifications_sent += 1;
                crate::metrics::record_notification_sent("video");
            }
            Ok(false) => debug!(video_id = %video.id, "Notification skipped"),
            Err(e) => warn!(video_id = %video.id, "Notification failed: {}", e),
        }
    }

    /// Build today's briefing from the summaries generated today.
    /// Failures are reported in the outcome, never propagated; the run
    /// itself succeeded.
    async fn run_briefing(&self, notifications_sent: &mut usize) -> BriefingOutcome {
        let today = today_stamp();
        info!(date = %today, "Generating daily briefing");

        let summaries = match self.stores.summaries.find_for_date(&today).await {
            Ok(summaries) => summaries,
            Err(e) => {
                warn!("Could not load today's summaries: {}", e);
                return BriefingOutcome::Failed {
                    error: e.to_string(),
                };
            }
        };
        if summaries.is_empty() {
            info!("No summaries today, skipping briefing");
            return BriefingOutcome::NoSummaries;
        }

        // Union of tags in first-seen order.
        let mut tags: Vec<String> = Vec::new();
        for record in &summaries {
            for tag in &record.tags {
                if !tags.contains(tag) {
                    tags.push(tag.clone());
                }
            }
        }

        let prompt = prompts::briefing_prompt(&tags, &summaries);
        let briefing = match self.ai.complete(&prompt, &self.config.models).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Briefing generation failed: {}", e);
                return BriefingOutcome::Failed {
                    error: e.to_string(),
                };
            }
        };

        let record = SummaryRecord::briefing(&today, &briefing);
        if let Err(e) = self.stores.summaries.save(&record).await {
            warn!("Could not persist briefing: {}", e);
            return BriefingOutcome::Failed {
                error: e.to_string(),
            };
        }

        if self.notifier.is_configured() {
            match self.notifier.send(&briefing_message(&today, &briefing)).await {
                Ok(true) => {
                    *notifications_sent += 1;
                    crate::metrics::record_notification_sent("briefing");
                }
                Ok(false) => {}
                Err(e) => warn!("Briefing notification failed: {}", e),
            }
        }

        info!(summaries = summaries.len(), "Daily briefing generated");
        BriefingOutcome::Generated
    }
}

/// Videos strictly newer than the marker, in the fetch's newest-first
/// order. An absent or unmatched marker means everything is new.
fn filter_new_videos<'a>(videos: &'a [Video], marker: Option<&VideoId>) -> &'a [Video] {
    if let Some(marker) = marker {
        if let Some(idx) = videos.iter().position(|v| &v.id == marker) {
            return &videos[..idx];
        }
    }
    videos
}
