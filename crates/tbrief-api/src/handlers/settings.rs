//! Notification settings handlers.

use axum::extract::State;
use axum::Json;
use validator::Validate;

use tbrief_models::{UpdateSettingsRequest, UserSettings};

use crate::error::ApiResult;
use crate::state::AppState;

/// Current notification settings.
pub async fn get_settings(State(state): State<AppState>) -> ApiResult<Json<UserSettings>> {
    let settings = state.stores.settings.get().await?;
    Ok(Json(settings))
}

/// Apply a partial settings update and return the result.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(req): Json<UpdateSettingsRequest>,
) -> ApiResult<Json<UserSettings>> {
    req.validate()?;

    let mut settings = state.stores.settings.get().await?;
    req.apply_to(&mut settings);
    state.stores.settings.save(&settings).await?;
    Ok(Json(settings))
}
