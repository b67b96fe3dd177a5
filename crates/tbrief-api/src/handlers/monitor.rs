//! Monitor trigger handler.

use axum::extract::State;
use axum::Json;
use tracing::info;

use tbrief_models::{RunReport, RunRequest};

use crate::error::ApiResult;
use crate::state::AppState;

/// Trigger a monitor run and wait for its report.
///
/// A run already in flight is not interrupted; the report comes back
/// with `already_running` set instead.
pub async fn run_monitor(
    State(state): State<AppState>,
    body: Option<Json<RunRequest>>,
) -> ApiResult<Json<RunReport>> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    info!(include_briefing = req.include_briefing, "Monitor run requested");

    let report = state.orchestrator.run_once(req.include_briefing).await;
    Ok(Json(report))
}
