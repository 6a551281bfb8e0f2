//! The crash game aggregate
//!
//! [`CrashGame`] owns the scheduler, the ledger and the history log. All of its
//! mutating methods take `&mut self`, so a single owner (or a single lock, see
//! [`crate::runtime`]) serializes ticks against player commands. Independent
//! instances share nothing.

use crate::config::GameConfig;
use crate::errors::{CrashlineError, CrashlineResult};
use crate::game::{
    Clock, CrashPointGenerator, EntropySource, GameEvent, HistoryLog, MonotonicClock, OsEntropy,
    PlayerView, RoundPhase, RoundScheduler, RoundSnapshot, RoundTransition, Wager, WagerLedger,
    WagerOutcome, WagerRejection,
};
use crate::metrics::GameMetrics;
use std::sync::Arc;
use tracing::{debug, error, warn};

pub struct CrashGame {
    clock: Arc<dyn Clock>,
    scheduler: RoundScheduler<Box<dyn EntropySource>>,
    ledger: WagerLedger,
    history: HistoryLog,
    metrics: GameMetrics,
    halted: Option<String>,
}

impl CrashGame {
    /// Game on the real monotonic clock with OS entropy
    pub fn new(config: &GameConfig) -> Self {
        Self::with_parts(config, Arc::new(MonotonicClock::new()), OsEntropy)
    }

    /// Game with an injected clock and entropy source. The first betting
    /// window opens at the clock's current reading.
    pub fn with_parts(
        config: &GameConfig,
        clock: Arc<dyn Clock>,
        entropy: impl EntropySource + 'static,
    ) -> Self {
        let generator = CrashPointGenerator::new(Box::new(entropy) as Box<dyn EntropySource>);
        let scheduler = RoundScheduler::new(config.timing(), generator, clock.now_ms());

        Self {
            clock,
            scheduler,
            ledger: WagerLedger::new(config.starting_balance),
            history: HistoryLog::new(config.history_capacity),
            metrics: GameMetrics::new(),
            halted: None,
        }
    }

    /// Report into an existing metrics handle instead of a private one
    pub fn with_metrics(mut self, metrics: GameMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Advance the round to the clock's current time
    pub fn tick(&mut self) -> CrashlineResult<Vec<GameEvent>> {
        let mut events = Vec::new();
        self.tick_into(&mut events)?;
        Ok(events)
    }

    /// Like [`tick`](Self::tick), but events produced before a failure are kept in `events`
    pub fn tick_into(&mut self, events: &mut Vec<GameEvent>) -> CrashlineResult<()> {
        if let Some(reason) = &self.halted {
            return Err(CrashlineError::Halted(reason.clone()));
        }

        let now = self.clock.now_ms();
        loop {
            match self.scheduler.step(now) {
                Ok(Some(transition)) => self.apply(transition, events),
                Ok(None) => return Ok(()),
                Err(e) => {
                    self.halt(e.to_string());
                    return Err(e.into());
                }
            }
        }
    }

    fn apply(&mut self, transition: RoundTransition, events: &mut Vec<GameEvent>) {
        match transition {
            RoundTransition::RoundStarted { round_id } => {
                self.metrics.record_round_started();
                events.push(GameEvent::RoundStarted { round_id });
            }
            RoundTransition::Crashed {
                round_id,
                crash_point,
                ..
            } => {
                self.history.record(crash_point);
                self.metrics.record_round_crashed();
                events.push(GameEvent::Crashed {
                    round_id,
                    crash_point,
                });

                if let Some(loss) = self.ledger.settle_crash() {
                    self.metrics.record_loss();
                    events.push(GameEvent::WagerSettled {
                        round_id,
                        amount: loss.amount,
                        outcome: WagerOutcome::Loss,
                        profit: loss.profit,
                    });
                }
            }
            RoundTransition::BettingOpened { round_id } => {
                self.ledger.clear();
                events.push(GameEvent::BettingOpened {
                    round_id,
                    betting_window_ms: self.scheduler.timing().betting_window_ms,
                });
            }
        }
    }

    /// Stop the game for good. A wager placed for the round that never started is refunded.
    fn halt(&mut self, reason: String) {
        error!("halting game: {}", reason);
        if let Ok(refund) = self.ledger.cancel(self.scheduler.phase()) {
            warn!(refund, "refunded wager of unstarted round");
        }
        self.halted = Some(reason);
    }

    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    pub fn halt_reason(&self) -> Option<&str> {
        self.halted.as_deref()
    }

    fn check_command<T>(&self, result: Result<T, WagerRejection>) -> Result<T, WagerRejection> {
        if let Err(rejection) = &result {
            self.metrics.record_rejection();
            debug!(round_id = self.scheduler.round_id(), "command rejected: {}", rejection);
        }
        result
    }

    pub fn try_place_wager(&mut self, amount: f64) -> Result<Wager, WagerRejection> {
        if self.is_halted() {
            return self.check_command(Err(WagerRejection::Halted));
        }
        let result = self
            .ledger
            .place(self.scheduler.phase(), amount)
            .map(|w| *w);
        if result.is_ok() {
            self.metrics.record_wager_placed();
        }
        self.check_command(result)
    }

    /// Returns the refunded amount
    pub fn try_cancel_wager(&mut self) -> Result<f64, WagerRejection> {
        if self.is_halted() {
            return self.check_command(Err(WagerRejection::Halted));
        }
        let result = self.ledger.cancel(self.scheduler.phase());
        if result.is_ok() {
            self.metrics.record_wager_cancelled();
        }
        self.check_command(result)
    }

    /// Cash out at the multiplier of the last tick
    pub fn try_cash_out(&mut self) -> Result<Wager, WagerRejection> {
        if self.is_halted() {
            return self.check_command(Err(WagerRejection::Halted));
        }
        let state = self.scheduler.state();
        let result = self
            .ledger
            .cash_out(state.phase, state.multiplier)
            .map(|w| *w);
        if result.is_ok() {
            self.metrics.record_cash_out();
        }
        self.check_command(result)
    }

    pub fn place_wager(&mut self, amount: f64) -> bool {
        self.try_place_wager(amount).is_ok()
    }

    pub fn cancel_wager(&mut self) -> bool {
        self.try_cancel_wager().is_ok()
    }

    pub fn cash_out(&mut self) -> bool {
        self.try_cash_out().is_ok()
    }

    pub fn set_balance(&mut self, balance: f64) -> Result<(), WagerRejection> {
        self.ledger.set_balance(balance)
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        self.scheduler.snapshot()
    }

    pub fn phase(&self) -> RoundPhase {
        self.scheduler.phase()
    }

    pub fn round_id(&self) -> u64 {
        self.scheduler.round_id()
    }

    pub fn history(&self) -> Vec<f64> {
        self.history.entries()
    }

    pub fn balance(&self) -> f64 {
        self.ledger.balance()
    }

    pub fn wager(&self) -> Option<Wager> {
        self.ledger.wager().copied()
    }

    pub fn player(&self) -> PlayerView {
        let wager = self.wager();
        let state = self.scheduler.state();
        let potential_payout = wager
            .filter(|w| w.is_live() && state.phase == RoundPhase::Running)
            .map(|w| w.amount * state.multiplier);

        PlayerView {
            balance: self.ledger.balance(),
            wager,
            potential_payout,
        }
    }

    pub fn metrics(&self) -> &GameMetrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{ManualClock, ScriptedEntropy, WagerStatus};
    use crate::game::multiplier::elapsed_for_multiplier;

    fn game(points: &[f64]) -> (CrashGame, ManualClock) {
        let clock = ManualClock::new();
        let game = CrashGame::with_parts(
            &GameConfig::default(),
            Arc::new(clock.clone()),
            ScriptedEntropy::from_crash_points(points.iter().copied()),
        );
        (game, clock)
    }

    #[test]
    fn test_cash_out_pays_last_tick_multiplier() {
        let (mut game, clock) = game(&[5.0]);
        assert!(game.place_wager(50.0));

        clock.advance_ms(5_000);
        game.tick().unwrap();
        clock.advance_ms(elapsed_for_multiplier(3.0));
        game.tick().unwrap();
        let multiplier = game.snapshot().multiplier;
        assert!(multiplier >= 3.0 && multiplier < 3.001);

        let potential = game.player().potential_payout.unwrap();
        assert!((potential - 50.0 * multiplier).abs() < 1e-9);

        assert!(game.cash_out());
        let wager = game.wager().unwrap();
        assert_eq!(wager.cashed_out_at(), Some(multiplier));
        assert!((game.balance() - (950.0 + 50.0 * multiplier)).abs() < 1e-9);
        assert_eq!(game.player().potential_payout, None);

        let balance = game.balance();
        assert!(!game.cash_out());
        assert_eq!(game.balance(), balance);
    }

    #[test]
    fn test_crash_emits_events_and_settles_loss() {
        let (mut game, clock) = game(&[1.5]);
        assert!(game.place_wager(50.0));

        clock.advance_ms(5_000 + elapsed_for_multiplier(1.5) + 1);
        let events = game.tick().unwrap();

        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], GameEvent::RoundStarted { round_id: 1 }));
        assert!(matches!(events[1], GameEvent::Crashed { round_id: 1, .. }));
        assert!(matches!(
            events[2],
            GameEvent::WagerSettled { outcome: WagerOutcome::Loss, .. }
        ));
        assert_eq!(game.wager().unwrap().status, WagerStatus::Lost { profit: -50.0 });
        assert_eq!(game.balance(), 950.0);
        assert_eq!(game.history().len(), 1);
    }

    #[test]
    fn test_entropy_failure_halts_and_refunds() {
        let (mut game, clock) = game(&[]);
        assert!(game.place_wager(100.0));
        assert_eq!(game.balance(), 900.0);

        clock.advance_ms(5_000);
        assert!(matches!(game.tick(), Err(CrashlineError::Entropy(_))));
        assert!(game.is_halted());
        assert_eq!(game.balance(), 1_000.0);
        assert!(game.wager().is_none());

        assert!(matches!(game.tick(), Err(CrashlineError::Halted(_))));
        assert_eq!(game.try_place_wager(10.0), Err(WagerRejection::Halted));
        assert_eq!(game.phase(), RoundPhase::Betting);
    }

    #[test]
    fn test_metrics_follow_commands() {
        let (mut game, _clock) = game(&[2.0]);
        assert!(game.place_wager(10.0));
        assert!(!game.place_wager(10.0));
        assert!(game.cancel_wager());

        let snapshot = game.metrics().snapshot();
        assert_eq!(snapshot.wagers_placed, 1);
        assert_eq!(snapshot.wagers_cancelled, 1);
        assert_eq!(snapshot.rejections, 1);
    }
}
