//! API Request and Response Models

use crate::game::{RoundPhase, Wager, WagerRejection};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub server_time: DateTime<Utc>,
    pub round_id: u64,
    pub phase: RoundPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub halted: Option<String>,
}

/// Crash points, most recent first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub balance: f64,
}

/// POST /wager body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WagerRequest {
    pub amount: f64,
}

/// Result of a player command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub balance: f64,
    pub wager: Option<Wager>,
}

impl CommandResponse {
    pub fn new<T>(result: &Result<T, WagerRejection>, balance: f64, wager: Option<Wager>) -> Self {
        Self {
            accepted: result.is_ok(),
            reason: result.as_ref().err().map(|r| r.to_string()),
            balance,
            wager,
        }
    }
}
