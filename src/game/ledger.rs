//! Player balance and the single active wager
//!
//! Every operation either applies completely or is rejected without touching
//! the balance or the wager.

use crate::game::types::{RoundPhase, Wager, WagerStatus};
use thiserror::Error;
use tracing::{debug, info};

/// Why a player command was not applied
#[derive(Debug, Clone, Copy, Error, PartialEq)]
pub enum WagerRejection {
    #[error("command not allowed while {0}")]
    WrongPhase(RoundPhase),

    #[error("wager amount must be a positive number, got {0}")]
    InvalidAmount(f64),

    #[error("wager of {amount} exceeds balance {balance}")]
    InsufficientBalance { amount: f64, balance: f64 },

    #[error("a wager is already placed for this round")]
    WagerAlreadyPlaced,

    #[error("no wager placed")]
    NoWager,

    #[error("wager already settled")]
    AlreadySettled,

    #[error("balance must be a non-negative number, got {0}")]
    InvalidBalance(f64),

    #[error("game halted")]
    Halted,
}

/// Outcome of a crash-loss settlement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettledLoss {
    pub amount: f64,
    pub profit: f64,
}

/// Balance plus at most one wager
#[derive(Debug, Clone, PartialEq)]
pub struct WagerLedger {
    balance: f64,
    wager: Option<Wager>,
}

impl WagerLedger {
    pub fn new(starting_balance: f64) -> Self {
        debug_assert!(starting_balance.is_finite() && starting_balance >= 0.0);
        Self {
            balance: starting_balance,
            wager: None,
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn wager(&self) -> Option<&Wager> {
        self.wager.as_ref()
    }

    /// Debit `amount` and open a live wager
    pub fn place(&mut self, phase: RoundPhase, amount: f64) -> Result<&Wager, WagerRejection> {
        if phase != RoundPhase::Betting {
            return Err(WagerRejection::WrongPhase(phase));
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(WagerRejection::InvalidAmount(amount));
        }
        if amount > self.balance {
            return Err(WagerRejection::InsufficientBalance {
                amount,
                balance: self.balance,
            });
        }
        if self.wager.is_some() {
            return Err(WagerRejection::WagerAlreadyPlaced);
        }

        self.balance -= amount;
        debug!(amount, balance = self.balance, "wager placed");
        Ok(&*self.wager.insert(Wager::new(amount)))
    }

    /// Refund and drop the wager; returns the refunded amount
    pub fn cancel(&mut self, phase: RoundPhase) -> Result<f64, WagerRejection> {
        if phase != RoundPhase::Betting {
            return Err(WagerRejection::WrongPhase(phase));
        }
        let wager = self.wager.take().ok_or(WagerRejection::NoWager)?;
        debug_assert!(wager.is_live(), "settled wager during betting");

        self.balance += wager.amount;
        debug!(amount = wager.amount, balance = self.balance, "wager cancelled");
        Ok(wager.amount)
    }

    /// Lock in `multiplier` for the live wager and credit the payout
    pub fn cash_out(&mut self, phase: RoundPhase, multiplier: f64) -> Result<&Wager, WagerRejection> {
        if phase != RoundPhase::Running {
            return Err(WagerRejection::WrongPhase(phase));
        }
        let wager = self.wager.as_mut().ok_or(WagerRejection::NoWager)?;
        if !wager.is_live() {
            return Err(WagerRejection::AlreadySettled);
        }
        debug_assert!(multiplier >= 1.0);

        let profit = wager.amount * multiplier - wager.amount;
        wager.status = WagerStatus::CashedOut { multiplier, profit };
        self.balance += wager.amount + profit;

        info!(
            amount = wager.amount,
            multiplier,
            profit,
            balance = self.balance,
            "cashed out"
        );
        Ok(&*wager)
    }

    /// Mark a still-live wager as lost. The stake was debited at placement,
    /// so the balance does not move.
    pub fn settle_crash(&mut self) -> Option<SettledLoss> {
        let wager = self.wager.as_mut().filter(|w| w.is_live())?;
        let profit = -wager.amount;
        wager.status = WagerStatus::Lost { profit };

        info!(amount = wager.amount, "wager lost on crash");
        Some(SettledLoss {
            amount: wager.amount,
            profit,
        })
    }

    /// Drop whatever wager remains from the previous round
    pub fn clear(&mut self) -> Option<Wager> {
        let previous = self.wager.take();
        debug_assert!(
            previous.map_or(true, |w| !w.is_live()),
            "live wager cleared without settlement"
        );
        previous
    }

    /// Host-side balance override (top-ups in demos)
    pub fn set_balance(&mut self, balance: f64) -> Result<(), WagerRejection> {
        if !balance.is_finite() || balance < 0.0 {
            return Err(WagerRejection::InvalidBalance(balance));
        }
        self.balance = balance;
        Ok(())
    }
}
