//! Shared application state.

use std::sync::Arc;

use tracing::info;

use tbrief_ai::{AiProvider, GeminiClient, GeminiConfig};
use tbrief_monitor::{
    ChannelService, MonitorConfig, MonitorOrchestrator, NotificationService, PipelineConfig,
    SummaryPipeline,
};
use tbrief_notify::{Notifier, TelegramConfig, TelegramNotifier};
use tbrief_store::{Stores, SupabaseClient, SupabaseConfig};
use tbrief_youtube::{
    AudioProvider, TranscriptConfig, TranscriptProvider, VideoSourceAdapter, YouTubeClient,
    YouTubeConfig, YtDlpAudio, YtDlpTranscripts,
};

use crate::config::ApiConfig;

/// Application state shared across request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub stores: Stores,
    pub source: Arc<dyn VideoSourceAdapter>,
    pub channels: Arc<ChannelService>,
    pub notifications: Arc<NotificationService>,
    pub pipeline: Arc<SummaryPipeline>,
    pub orchestrator: Arc<MonitorOrchestrator>,
}

impl AppState {
    /// Wire storage, upstream clients, and services from the environment.
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let stores = match std::env::var("STORE_BACKEND").as_deref() {
            Ok("supabase") => {
                info!("Using Supabase storage backend");
                Stores::supabase(SupabaseClient::new(SupabaseConfig::from_env()?)?)
            }
            _ => {
                let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());
                info!(data_dir = %data_dir, "Using file storage backend");
                Stores::file(&data_dir)
            }
        };

        let source: Arc<dyn VideoSourceAdapter> =
            Arc::new(YouTubeClient::new(YouTubeConfig::from_env())?);
        let transcripts: Arc<dyn TranscriptProvider> =
            Arc::new(YtDlpTranscripts::new(TranscriptConfig::default()));
        let audio: Arc<dyn AudioProvider> = Arc::new(YtDlpAudio::new());
        let ai: Arc<dyn AiProvider> = Arc::new(GeminiClient::new(GeminiConfig::from_env()?)?);
        let notifier: Arc<dyn Notifier> =
            Arc::new(TelegramNotifier::new(TelegramConfig::from_env())?);

        let pipeline = Arc::new(SummaryPipeline::new(
            stores.summaries.clone(),
            transcripts,
            audio,
            ai.clone(),
            PipelineConfig::from_env(),
        ));
        let channels = Arc::new(ChannelService::new(stores.clone(), source.clone()));
        let notifications = Arc::new(NotificationService::new(stores.clone(), source.clone()));
        let orchestrator = Arc::new(MonitorOrchestrator::new(
            stores.clone(),
            source.clone(),
            pipeline.clone(),
            notifier,
            ai,
            MonitorConfig::from_env(),
        ));

        Ok(Self {
            config,
            stores,
            source,
            channels,
            notifications,
            pipeline,
            orchestrator,
        })
    }
}
