//! Daily scheduled runs.
//!
//! A minute-resolution cron tick compares the wall clock against the
//! configured notification time and fires at most one full monitor run
//! (with briefing) per day. The last-run date is written before the
//! run starts, so a tick landing during a slow run cannot start a
//! second one.

use std::sync::Arc;

use chrono::Local;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use tbrief_models::summary::today_stamp;
use tbrief_models::UserSettings;
use tbrief_store::SettingsRepository;

use crate::error::{MonitorError, MonitorResult};
use crate::orchestrator::MonitorOrchestrator;

/// Start the every-minute scheduler tick. The returned handle keeps
/// the scheduler alive; dropping it stops the job.
pub async fn start_scheduler(
    orchestrator: Arc<MonitorOrchestrator>,
    settings: Arc<dyn SettingsRepository>,
) -> MonitorResult<JobScheduler> {
    let scheduler = JobScheduler::new().await.map_err(internal)?;

    let job = Job::new_async("0 * * * * *", move |_uuid, _lock| {
        let orchestrator = orchestrator.clone();
        let settings = settings.clone();
        Box::pin(async move {
            tick(orchestrator, settings).await;
        })
    })
    .map_err(internal)?;

    scheduler.add(job).await.map_err(internal)?;
    scheduler.start().await.map_err(internal)?;

    info!("Scheduler started, checking the notification time every minute");
    Ok(scheduler)
}

async fn tick(orchestrator: Arc<MonitorOrchestrator>, settings: Arc<dyn SettingsRepository>) {
    let current = match settings.get().await {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Scheduler could not load settings: {}", e);
            return;
        }
    };

    let now = Local::now().format("%H:%M").to_string();
    let today = today_stamp();
    if !should_run(&current, &now, &today) {
        return;
    }

    // The run date is stamped before the run; a same-day tick must see
    // it and bail.
    let mut updated = current;
    updated.last_run_date = Some(today.clone());
    if let Err(e) = settings.save(&updated).await {
        error!("Could not record the run date, skipping scheduled run: {}", e);
        return;
    }

    info!(date = %today, "Scheduled monitor run starting");
    let report = orchestrator.run_once(true).await;
    info!(
        run_id = %report.run_id,
        videos = report.videos_processed,
        "Scheduled monitor run finished"
    );
}

/// Whether this tick should fire the daily run.
fn should_run(settings: &UserSettings, now_hhmm: &str, today: &str) -> bool {
    settings.notification_enabled
        && settings.notification_time == now_hhmm
        && settings.last_run_date.as_deref() != Some(today)
}

fn internal(e: tokio_cron_scheduler::JobSchedulerError) -> MonitorError {
    MonitorError::internal(format!("scheduler error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(enabled: bool, time: &str, last_run: Option<&str>) -> UserSettings {
        let mut settings = UserSettings::default();
        settings.notification_enabled = enabled;
        settings.notification_time = time.to_string();
        settings.last_run_date = last_run.map(str::to_string);
        settings
    }

    #[test]
    fn test_fires_at_the_configured_minute() {
        let s = settings(true, "21:30", None);
        assert!(should_run(&s, "21:30", "2026-08-22"));
        assert!(!should_run(&s, "21:29", "2026-08-22"));
        assert!(!should_run(&s, "21:31", "2026-08-22"));
    }

    #[test]
    fn test_disabled_notifications_never_fire() {
        let s = settings(false, "21:30", None);
        assert!(!should_run(&s, "21:30", "2026-08-22"));
    }

    #[test]
    fn test_runs_once_per_day() {
        let s = settings(true, "21:30", Some("2026-08-22"));
        assert!(!should_run(&s, "21:30", "2026-08-22"));

        let s = settings(true, "21:30", Some("2026-08-21"));
        assert!(should_run(&s, "21:30", "2026-08-22"));
    }
}
