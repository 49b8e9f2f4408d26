//! Router configuration for the HTTP API.

use axum::{extract::DefaultBodyLimit, middleware, routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::error::apply_strict_status;
use super::handlers::{delete_node, get_node, ping, post_node, put_node, AppState};
use super::middleware::create_cors_layer;
use crate::config::ServerConfig;

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, config: &ServerConfig) -> Router {
    let router = Router::new()
        .route(
            "/api/file/*path",
            get(get_node)
                .post(post_node)
                .put(put_node)
                .delete(delete_node),
        )
        .route("/ping", get(ping))
        .layer(DefaultBodyLimit::max(config.max_body_mb * 1024 * 1024))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(&config.cors_origins)),
        )
        .with_state(app_state);

    if config.strict_http_status {
        router.layer(middleware::map_response(apply_strict_status))
    } else {
        router
    }
}
