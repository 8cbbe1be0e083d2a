//! HTTP API endpoints.
//!
//! Small read-only helpers for the web client next to the WebSocket.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;
use crate::words;

/// Liveness check.
///
/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoriesResponse {
    pub categories: Vec<&'static str>,
}

/// Word categories offered in both lobbies.
///
/// GET /api/categories
pub async fn list_categories() -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        categories: words::categories(),
    })
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatsResponse {
    pub rooms: usize,
}

/// Number of open rooms.
///
/// GET /api/stats
pub async fn stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    Json(StatsResponse {
        rooms: state.room_count().await,
    })
}
