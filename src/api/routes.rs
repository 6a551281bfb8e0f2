//! Route Definitions

use super::{handlers::*, websocket::websocket_handler};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Build the API router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        // Queries
        .route("/state", get(state_handler))
        .route("/history", get(history_handler))
        .route("/balance", get(balance_handler))
        .route("/player", get(player_handler))
        .route("/metrics", get(metrics_handler))
        // Player commands
        .route("/wager", post(place_wager_handler))
        .route("/wager/cancel", post(cancel_wager_handler))
        .route("/cashout", post(cash_out_handler))
        // Live event stream
        .route("/ws", get(websocket_handler))
        .with_state(state)
}
