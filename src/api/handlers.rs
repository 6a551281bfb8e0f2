//! Request Handlers

use super::{errors::ApiError, middleware::RequestId, models::*};
use crate::game::{PlayerView, RoundSnapshot, WagerRejection};
use crate::metrics::MetricsSnapshot;
use crate::runtime::GameHandle;
use chrono::Utc;
use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use std::sync::Arc;
use tracing::debug;

/// Shared application state
pub struct AppState {
    pub game: GameHandle,
    pub version: String,
}

impl AppState {
    pub fn new(game: GameHandle) -> Self {
        Self {
            game,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// GET /health
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let snapshot = state.game.snapshot();
    let halted = state.game.halt_reason();

    Json(HealthResponse {
        status: if halted.is_some() { "Halted" } else { "Running" }.to_string(),
        version: state.version.clone(),
        server_time: Utc::now(),
        round_id: snapshot.round_id,
        phase: snapshot.phase,
        halted,
    })
}

/// GET /state
pub async fn state_handler(State(state): State<Arc<AppState>>) -> Json<RoundSnapshot> {
    Json(state.game.snapshot())
}

/// GET /history
pub async fn history_handler(State(state): State<Arc<AppState>>) -> Json<HistoryResponse> {
    Json(HistoryResponse {
        history: state.game.history(),
    })
}

/// GET /balance
pub async fn balance_handler(State(state): State<Arc<AppState>>) -> Json<BalanceResponse> {
    Json(BalanceResponse {
        balance: state.game.balance(),
    })
}

/// GET /player
pub async fn player_handler(State(state): State<Arc<AppState>>) -> Json<PlayerView> {
    Json(state.game.player())
}

/// GET /metrics
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.game.metrics().snapshot())
}

/// Turn a command result into a response. A halted game is reported as
/// unavailable; every other rejection is a normal `accepted: false` answer.
fn command_response<T>(
    state: &AppState,
    request_id: RequestId,
    result: Result<T, WagerRejection>,
) -> Result<Json<CommandResponse>, ApiError> {
    if let Err(WagerRejection::Halted) = result {
        let reason = state
            .game
            .halt_reason()
            .unwrap_or_else(|| "game halted".to_string());
        return Err(ApiError::service_unavailable(request_id.0, reason));
    }
    if let Err(rejection) = &result {
        debug!(request_id = %request_id.0, "command rejected: {}", rejection);
    }

    Ok(Json(CommandResponse::new(
        &result,
        state.game.balance(),
        state.game.wager(),
    )))
}

/// POST /wager
pub async fn place_wager_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    body: Result<Json<WagerRequest>, JsonRejection>,
) -> Result<Json<CommandResponse>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::bad_request(request_id.0.clone(), e.body_text()))?;

    let result = state.game.try_place_wager(request.amount);
    command_response(&state, request_id, result)
}

/// POST /wager/cancel
pub async fn cancel_wager_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<CommandResponse>, ApiError> {
    let result = state.game.try_cancel_wager();
    command_response(&state, request_id, result)
}

/// POST /cashout
pub async fn cash_out_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<CommandResponse>, ApiError> {
    let result = state.game.try_cash_out();
    command_response(&state, request_id, result)
}
