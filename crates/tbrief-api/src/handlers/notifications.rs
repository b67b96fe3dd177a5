//! Notification ledger handlers.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use tbrief_models::{MarkCheckedRequest, NewVideosReport};

use crate::error::ApiResult;
use crate::state::AppState;

/// Count videos not yet in the ledger, per subscribed channel.
pub async fn new_videos(State(state): State<AppState>) -> ApiResult<Json<NewVideosReport>> {
    let report = state.notifications.check_for_new_videos().await?;
    Ok(Json(report))
}

/// Response for `POST /api/notifications/check`.
#[derive(Serialize)]
pub struct MarkCheckedResponse {
    pub updated: u32,
}

/// Mark one channel, or `*` for every active one, as checked.
pub async fn mark_checked(
    State(state): State<AppState>,
    Json(req): Json<MarkCheckedRequest>,
) -> ApiResult<Json<MarkCheckedResponse>> {
    let updated = state
        .notifications
        .mark_notifications_checked(&req.channel_id)
        .await?;
    Ok(Json(MarkCheckedResponse { updated }))
}
