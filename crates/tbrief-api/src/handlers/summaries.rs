//! Summary and briefing handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tracing::info;
use validator::Validate;

use tbrief_models::{GenerateSummaryRequest, SummaryRecord, VideoId};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Response for `POST /api/summaries/generate`.
#[derive(Serialize)]
pub struct GenerateSummaryResponse {
    pub video_id: VideoId,
    pub summary: String,
}

/// Summarize one cached video.
///
/// Served from the summary cache when the same video and tag set were
/// already generated. Request tags override the subscription tags.
pub async fn generate_summary(
    State(state): State<AppState>,
    Json(req): Json<GenerateSummaryRequest>,
) -> ApiResult<Json<GenerateSummaryResponse>> {
    req.validate()?;

    let video_id = VideoId::from(req.video_id.as_str());
    let (channel_id, video) = state
        .stores
        .videos
        .find_video(&video_id)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(format!("video {video_id} is not in any channel cache"))
        })?;

    let subscription = state
        .stores
        .subscriptions
        .get(&channel_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("subscription {channel_id}")))?;

    let tags = req.tags.unwrap_or(subscription.tags);
    let summary = state
        .pipeline
        .get_or_generate(&video, &subscription.channel_name, &tags)
        .await?;

    info!(video_id = %video_id, "Summary ready");
    Ok(Json(GenerateSummaryResponse { video_id, summary }))
}

/// All cached summaries. Briefings are excluded.
pub async fn list_summaries(State(state): State<AppState>) -> ApiResult<Json<Vec<SummaryRecord>>> {
    let summaries = state.stores.summaries.find_all().await?;
    Ok(Json(summaries))
}

/// Summaries generated on one `YYYY-MM-DD` day.
pub async fn summaries_for_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> ApiResult<Json<Vec<SummaryRecord>>> {
    let summaries = state.stores.summaries.find_for_date(&date).await?;
    Ok(Json(summaries))
}

/// The stored daily briefing for a date.
pub async fn get_briefing(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> ApiResult<Json<SummaryRecord>> {
    let briefing = state
        .stores
        .summaries
        .find_briefing(&date)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("no briefing for {date}")))?;
    Ok(Json(briefing))
}
