//! Health and monitoring endpoints

use axum::{extract::State, response::IntoResponse, Json};

use crate::api::server::SharedAppState;

/// GET /api/health
pub async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "ltc-payments",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /api/tracker/stats
pub async fn handle_tracker_stats(State(state): State<SharedAppState>) -> impl IntoResponse {
    let stats = state.stats.read().await.clone();
    Json(stats)
}
