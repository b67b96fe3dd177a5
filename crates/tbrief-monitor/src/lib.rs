//! Channel monitoring services.
//!
//! This crate ties the storage, YouTube, AI, and notification layers
//! into the behaviors the API exposes:
//! - [`reconciler`]: merging fetch windows into the video cache
//! - [`channels`]: cached listings, starter fetches, and refreshes
//! - [`ledger`]: new-video detection against the notification ledger
//! - [`pipeline`]: cache-first summary generation with audio fallback
//! - [`orchestrator`]: the full monitor run
//! - [`scheduler`]: the daily cron trigger

pub mod channels;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod orchestrator;
pub mod pipeline;
pub mod reconciler;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod testutil;

pub use channels::ChannelService;
pub use error::{MonitorError, MonitorResult};
pub use ledger::NotificationService;
pub use orchestrator::{MonitorConfig, MonitorOrchestrator};
pub use pipeline::{PipelineConfig, SummaryPipeline};
pub use reconciler::{reconcile, PersistMode, ReconcileOutcome};
pub use scheduler::start_scheduler;
