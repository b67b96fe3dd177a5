//! Subscription management handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;
use validator::Validate;

use tbrief_models::{
    ChannelId, CreateSubscriptionRequest, Subscription, UpdateSubscriptionRequest, Video,
};
use tbrief_monitor::MonitorError;
use tbrief_youtube::YoutubeError;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// List all subscriptions.
pub async fn list_subscriptions(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Subscription>>> {
    let subscriptions = state.stores.subscriptions.list().await?;
    Ok(Json(subscriptions))
}

/// Subscribe to a channel.
///
/// The channel reference is resolved upstream first, so an ID, a
/// handle, a channel URL, or free search text all work.
pub async fn create_subscription(
    State(state): State<AppState>,
    Json(req): Json<CreateSubscriptionRequest>,
) -> ApiResult<(StatusCode, Json<Subscription>)> {
    req.validate()?;

    let channel = match state.source.resolve_channel(&req.channel).await {
        Ok(info) => info,
        Err(e @ (YoutubeError::ChannelNotFound(_) | YoutubeError::InvalidReference(_))) => {
            return Err(ApiError::bad_request(e.to_string()));
        }
        Err(other) => return Err(MonitorError::from(other).into()),
    };

    if state
        .stores
        .subscriptions
        .get(&channel.channel_id)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict(format!(
            "already subscribed to {}",
            channel.channel_id
        )));
    }

    let mut subscription = Subscription::new(channel.channel_id, &channel.channel_name);
    subscription.tags = req.tags;
    subscription.categories = req.categories;
    state.stores.subscriptions.save(&subscription).await?;

    info!(
        channel_id = %subscription.channel_id,
        channel_name = %subscription.channel_name,
        "Subscription created"
    );
    Ok((StatusCode::CREATED, Json(subscription)))
}

/// Update a subscription's name, tags, categories, or active flag.
pub async fn update_subscription(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
    Json(req): Json<UpdateSubscriptionRequest>,
) -> ApiResult<Json<Subscription>> {
    req.validate()?;

    let channel_id = ChannelId::from(channel_id);
    let mut subscription = state
        .stores
        .subscriptions
        .get(&channel_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("subscription {channel_id}")))?;

    if let Some(name) = req.channel_name {
        subscription.channel_name = name;
    }
    if let Some(tags) = req.tags {
        subscription.tags = tags;
    }
    if let Some(categories) = req.categories {
        subscription.categories = categories;
    }
    if let Some(active) = req.active {
        subscription.active = active;
    }

    state.stores.subscriptions.save(&subscription).await?;
    Ok(Json(subscription))
}

/// Unsubscribe and drop the channel's video cache and ledger entry.
///
/// Cached summaries are kept. They are keyed by video and stay valid
/// if the channel is ever re-added.
pub async fn delete_subscription(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> ApiResult<StatusCode> {
    let channel_id = ChannelId::from(channel_id);

    if !state.stores.subscriptions.delete(&channel_id).await? {
        return Err(ApiError::not_found(format!("subscription {channel_id}")));
    }
    state.stores.videos.delete(&channel_id).await?;
    state.stores.notifications.delete(&channel_id).await?;

    info!(channel_id = %channel_id, "Subscription deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Cached videos for a subscribed channel, fetching a starter window
/// on a cache miss.
pub async fn get_channel_videos(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> ApiResult<Json<Vec<Video>>> {
    let channel_id = ChannelId::from(channel_id);
    let videos = state.channels.get_videos_for_channel(&channel_id).await?;
    Ok(Json(videos))
}

/// Refetch the channel over the wide window, bypassing the cache.
pub async fn refresh_channel(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> ApiResult<Json<Vec<Video>>> {
    let channel_id = ChannelId::from(channel_id);
    let videos = state.channels.refresh_channel(&channel_id).await?;
    Ok(Json(videos))
}
