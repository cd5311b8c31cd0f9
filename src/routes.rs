use axum::{Router, routing::get, routing::post};
use std::sync::Arc;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::accounts::routes as account_routes;
use crate::archive::routes as archive_routes;
use crate::rooms;
use crate::state::AppState;
use crate::ws::handler as ws_handler;

/// Build the full axum Router with all routes and middleware.
pub fn build_router(state: AppState, static_dir: &str) -> Router {
    // Rate limiting: 5 requests per minute per IP on auth endpoints
    // Uses PeerIpKeyExtractor which reads from ConnectInfo<SocketAddr>
    let governor_config = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(PeerIpKeyExtractor)
            .per_second(12) // 1 token every 12 seconds = 5 per minute
            .burst_size(5) // Allow burst of 5
            .finish()
            .expect("Failed to build governor config"),
    );
    let governor_limiter = governor_config.limiter().clone();

    // Spawn background task to clean up rate limiter state
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            governor_limiter.retain_recent();
        }
    });

    // Auth routes with rate limiting
    let auth_routes = Router::new()
        .route("/api/auth/register", post(account_routes::register))
        .route("/api/auth/login", post(account_routes::login))
        .layer(GovernorLayer {
            config: governor_config,
        });

    // Catalog and history retrieval (plain request/response CRUD)
    let api_routes = Router::new()
        .route("/api/rooms", get(rooms::list_rooms))
        .route("/api/rooms/{room}/messages", get(archive_routes::room_history))
        .route("/api/dm/{a}/{b}/messages", get(archive_routes::pair_history));

    // WebSocket endpoint: all live chat traffic
    let ws_routes = Router::new().route("/ws", get(ws_handler::ws_upgrade));

    // Health check
    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(auth_routes)
        .merge(api_routes)
        .merge(ws_routes)
        .merge(health)
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Basic health check endpoint
async fn health_check() -> &'static str {
    "ok"
}
