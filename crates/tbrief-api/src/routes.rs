//! Route table and router assembly.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::{
    create_subscription, delete_subscription, generate_summary, get_briefing, get_channel_videos,
    get_settings, health, list_subscriptions, list_summaries, mark_checked, new_videos,
    refresh_channel, run_monitor, summaries_for_date, update_settings, update_subscription,
};
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, request_id, request_logging};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let subscription_routes = Router::new()
        .route(
            "/subscriptions",
            get(list_subscriptions).post(create_subscription),
        )
        .route(
            "/subscriptions/:channel_id",
            axum::routing::put(update_subscription).delete(delete_subscription),
        )
        .route("/subscriptions/:channel_id/videos", get(get_channel_videos))
        .route("/subscriptions/:channel_id/refresh", post(refresh_channel));

    let notification_routes = Router::new()
        .route("/notifications/new", get(new_videos))
        .route("/notifications/check", post(mark_checked));

    let summary_routes = Router::new()
        .route("/summaries/generate", post(generate_summary))
        .route("/summaries", get(list_summaries))
        .route("/summaries/date/:date", get(summaries_for_date))
        .route("/briefing/:date", get(get_briefing));

    let monitor_routes = Router::new().route("/monitor/run", post(run_monitor));

    let settings_routes =
        Router::new().route("/settings", get(get_settings).put(update_settings));

    let api_routes = Router::new()
        .merge(subscription_routes)
        .merge(notification_routes)
        .merge(summary_routes)
        .merge(monitor_routes)
        .merge(settings_routes);

    let health_routes = Router::new().route("/health", get(health));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        // Per-route so the matched path template is available as a label
        .route_layer(middleware::from_fn(metrics_middleware))
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
