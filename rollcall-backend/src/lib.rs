pub mod cache;
pub mod config;
mod error;
pub mod fetch;
pub mod refresh;
mod routes;
mod validation;

use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::cache::SnapshotCache;

pub struct AppState {
    pub cache: SnapshotCache,
    /// Wakes the refresher for a manual refresh.
    pub refresh_requests: Arc<Notify>,
}

/// Create the application router over the given snapshot cache
pub fn create_app(
    cache: SnapshotCache,
    refresh_requests: Arc<Notify>,
    request_timeout: Duration,
) -> Router {
    let state = Arc::new(AppState {
        cache,
        refresh_requests,
    });

    let world_routes = Router::new().route("/worlds/{world_id}", get(routes::world));

    let group_routes = Router::new()
        .route("/groups/{group_id}", get(routes::group))
        .route("/groups/{group_id}/roles/{role_id}", get(routes::group_role));

    let server_routes = Router::new()
        .route("/servers/{guild_id}", get(routes::server))
        .route(
            "/servers/{guild_id}/roles/{role_id}",
            get(routes::server_role),
        );

    let user_routes = Router::new()
        .route("/users/{name}", get(routes::user))
        .route("/users/{name}/groups/{group_id}", get(routes::user_group))
        .route(
            "/users/{name}/groups/{group_id}/roles/{role_id}",
            get(routes::user_group_role),
        )
        .route("/users/{name}/servers/{guild_id}", get(routes::user_server))
        .route(
            "/users/{name}/servers/{guild_id}/roles/{role_id}",
            get(routes::user_server_role),
        );

    Router::new()
        .route("/health", get(|| async { StatusCode::OK }))
        .route("/status", get(routes::status))
        .route("/refresh", post(routes::refresh))
        .merge(world_routes)
        .merge(group_routes)
        .merge(server_routes)
        .merge(user_routes)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
