use axum::{middleware, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use playhome::{abuse, api, broadcast, config::ServerConfig, state::AppState, ws};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "playhome=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting PlayHome...");

    let config = ServerConfig::from_env();
    let abuse_config = Arc::new(abuse::AbuseConfig::from_env());
    let static_dir = config.static_dir.clone();
    let port = config.port;

    let state = Arc::new(AppState::with_config(config));

    // Spawn background task for vote, blitz and duel deadlines
    broadcast::spawn_timer_ticker(state.clone());

    if let Some(limiter) = abuse_config.rate_limiter.clone() {
        broadcast::spawn_rate_limit_cleanup(limiter);
    }

    // WebSocket route with anti-abuse protection
    let ws_routes =
        Router::new()
            .route("/ws", get(ws::ws_handler))
            .layer(middleware::from_fn_with_state(
                abuse_config.clone(),
                abuse::ws_abuse_middleware,
            ));

    let api_routes = Router::new()
        .route("/health", get(api::health))
        .route("/api/categories", get(api::list_categories))
        .route("/api/stats", get(api::stats));

    let app = Router::new()
        .merge(ws_routes)
        .merge(api_routes)
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
