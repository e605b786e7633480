use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{catalog, handlers, middleware::metrics_middleware, player, search, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health, config and lifecycle
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/status", get(handlers::get_status))
        .route("/reload", post(handlers::reload))
        // Catalog browsing
        .route("/categories", get(catalog::list_categories))
        .route("/categories/{key}", get(catalog::get_category))
        .route("/content", get(catalog::list_content))
        .route("/featured", get(catalog::featured))
        // Search
        .route("/search", get(search::search))
        .route("/suggestions", get(search::suggestions))
        // Playback
        .route("/play", post(player::play))
        // Live updates
        .route("/ws", get(ws::ws_handler));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
