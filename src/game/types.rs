use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of the current round
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RoundPhase {
    Betting,
    Running,
    Crashed,
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundPhase::Betting => write!(f, "betting"),
            RoundPhase::Running => write!(f, "running"),
            RoundPhase::Crashed => write!(f, "crashed"),
        }
    }
}

/// Round-local state owned by the scheduler.
///
/// A fresh value is built on every phase transition; fields from the previous
/// phase never carry over.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundState {
    pub phase: RoundPhase,
    pub multiplier: f64,
    /// 0.0 while betting, the round's secret while running
    pub crash_point: f64,
    pub elapsed_ms: u64,
    pub betting_time_left_ms: u64,
}

impl RoundState {
    /// Initial values of a betting window
    pub fn betting(betting_window_ms: u64) -> Self {
        Self {
            phase: RoundPhase::Betting,
            multiplier: 1.0,
            crash_point: 0.0,
            elapsed_ms: 0,
            betting_time_left_ms: betting_window_ms,
        }
    }

    /// Start of a running round with a freshly drawn crash point
    pub fn running(crash_point: f64) -> Self {
        Self {
            phase: RoundPhase::Running,
            multiplier: 1.0,
            crash_point,
            elapsed_ms: 0,
            betting_time_left_ms: 0,
        }
    }

    /// Terminal state of a round; the displayed multiplier is frozen at the crash point
    pub fn crashed(crash_point: f64, elapsed_ms: u64) -> Self {
        Self {
            phase: RoundPhase::Crashed,
            multiplier: crash_point,
            crash_point,
            elapsed_ms,
            betting_time_left_ms: 0,
        }
    }
}

/// Read-only projection of the round for hosts.
///
/// `crash_point` is only revealed once the round has crashed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub round_id: u64,
    pub phase: RoundPhase,
    pub multiplier: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crash_point: Option<f64>,
    pub elapsed_ms: u64,
    pub betting_time_left_ms: u64,
}

impl RoundSnapshot {
    pub fn from_state(round_id: u64, state: &RoundState) -> Self {
        let crash_point = match state.phase {
            RoundPhase::Crashed => Some(state.crash_point),
            RoundPhase::Betting | RoundPhase::Running => None,
        };

        Self {
            round_id,
            phase: state.phase,
            multiplier: state.multiplier,
            crash_point,
            elapsed_ms: state.elapsed_ms,
            betting_time_left_ms: state.betting_time_left_ms,
        }
    }
}

/// Settlement status of a wager
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WagerStatus {
    /// Placed and still riding the multiplier
    Live,
    CashedOut { multiplier: f64, profit: f64 },
    /// The round crashed before a cash-out
    Lost { profit: f64 },
}

/// The player's wager for the current round
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Wager {
    pub amount: f64,
    #[serde(flatten)]
    pub status: WagerStatus,
}

impl Wager {
    pub fn new(amount: f64) -> Self {
        Self {
            amount,
            status: WagerStatus::Live,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self.status, WagerStatus::Live)
    }

    pub fn cashed_out_at(&self) -> Option<f64> {
        match self.status {
            WagerStatus::CashedOut { multiplier, .. } => Some(multiplier),
            WagerStatus::Live | WagerStatus::Lost { .. } => None,
        }
    }

    pub fn profit(&self) -> Option<f64> {
        match self.status {
            WagerStatus::CashedOut { profit, .. } | WagerStatus::Lost { profit } => Some(profit),
            WagerStatus::Live => None,
        }
    }
}

/// Final outcome of a settled wager
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WagerOutcome {
    Win,
    Loss,
}

/// Player-facing view of the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub balance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wager: Option<Wager>,
    /// What a cash-out would pay right now; only while running with a live wager
    #[serde(skip_serializing_if = "Option::is_none")]
    pub potential_payout: Option<f64>,
}

/// Events published by the runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    BettingOpened {
        round_id: u64,
        betting_window_ms: u64,
    },
    RoundStarted {
        round_id: u64,
    },
    Tick {
        snapshot: RoundSnapshot,
    },
    Crashed {
        round_id: u64,
        crash_point: f64,
    },
    WagerSettled {
        round_id: u64,
        amount: f64,
        outcome: WagerOutcome,
        profit: f64,
    },
    /// The engine stopped; no further rounds will run
    Halted {
        reason: String,
    },
}
