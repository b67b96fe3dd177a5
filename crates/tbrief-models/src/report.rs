//! Monitor run reporting.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::summary::datetime_stamp;

/// Request body for `POST /api/monitor/run`.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct RunRequest {
    #[serde(default)]
    pub include_briefing: bool,
}

/// What happened to the daily briefing during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BriefingOutcome {
    NotRequested,
    Generated,
    /// Requested but no summaries were produced today.
    NoSummaries,
    Failed { error: String },
}

/// Outcome of a single monitor run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RunReport {
    pub run_id: String,
    /// True when the run was refused because another was in flight.
    pub already_running: bool,
    pub channels_checked: usize,
    pub videos_processed: usize,
    pub notifications_sent: usize,
    #[serde(default)]
    pub errors: Vec<String>,
    pub briefing: BriefingOutcome,
    pub started_at: String,
}

impl RunReport {
    pub fn started() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            already_running: false,
            channels_checked: 0,
            videos_processed: 0,
            notifications_sent: 0,
            errors: Vec::new(),
            briefing: BriefingOutcome::NotRequested,
            started_at: datetime_stamp(),
        }
    }

    /// Report for a trigger that found a run already in progress.
    pub fn refused() -> Self {
        Self {
            already_running: true,
            ..Self::started()
        }
    }

    pub fn record_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refused_report() {
        let report = RunReport::refused();
        assert!(report.already_running);
        assert_eq!(report.videos_processed, 0);
        assert_eq!(report.briefing, BriefingOutcome::NotRequested);
    }

    #[test]
    fn test_run_request_defaults() {
        let req: RunRequest = serde_json::from_str("{}").unwrap();
        assert!(!req.include_briefing);
    }

    #[test]
    fn test_briefing_outcome_serialization() {
        assert_eq!(
            serde_json::to_string(&BriefingOutcome::NoSummaries).unwrap(),
            r#""no_summaries""#
        );
        let failed = BriefingOutcome::Failed {
            error: "quota".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&failed).unwrap(),
            r#"{"failed":{"error":"quota"}}"#
        );
    }
}
