//! Round scheduler: Betting → Running → Crashed → Betting
//!
//! The scheduler is a pure state machine over monotonic timestamps. Callers
//! feed it the current clock reading through [`RoundScheduler::step`]; it does
//! not read a clock of its own.
//!
//! Phase boundaries are anchored to the previous boundary rather than to the
//! tick that observed them, so late ticks do not push later rounds back:
//! a round starts exactly one betting window after its betting phase opened,
//! and the next betting window opens exactly `crashed_delay_ms` after the crash
//! was observed.

use crate::errors::EntropyError;
use crate::game::fairness::{CrashPointGenerator, EntropySource};
use crate::game::multiplier::multiplier_at;
use crate::game::types::{RoundPhase, RoundSnapshot, RoundState};
use tracing::{debug, error, info};

/// Fixed phase durations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundTiming {
    pub betting_window_ms: u64,
    pub crashed_delay_ms: u64,
}

impl Default for RoundTiming {
    fn default() -> Self {
        Self {
            betting_window_ms: 5_000,
            crashed_delay_ms: 3_000,
        }
    }
}

/// A phase change reported by [`RoundScheduler::step`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoundTransition {
    /// Betting closed and the multiplier started climbing
    RoundStarted { round_id: u64 },
    /// The multiplier reached the crash point
    Crashed {
        round_id: u64,
        crash_point: f64,
        elapsed_ms: u64,
    },
    /// A new betting window opened for `round_id`
    BettingOpened { round_id: u64 },
}

pub struct RoundScheduler<E: EntropySource> {
    timing: RoundTiming,
    generator: CrashPointGenerator<E>,
    state: RoundState,
    round_id: u64,
    /// Clock reading at which the current phase began
    phase_started_at: u64,
}

impl<E: EntropySource> RoundScheduler<E> {
    /// Opens the first betting window at `now_ms`
    pub fn new(timing: RoundTiming, generator: CrashPointGenerator<E>, now_ms: u64) -> Self {
        Self {
            timing,
            generator,
            state: RoundState::betting(timing.betting_window_ms),
            round_id: 1,
            phase_started_at: now_ms,
        }
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn phase(&self) -> RoundPhase {
        self.state.phase
    }

    pub fn round_id(&self) -> u64 {
        self.round_id
    }

    pub fn timing(&self) -> RoundTiming {
        self.timing
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot::from_state(self.round_id, &self.state)
    }

    /// Bring the round up to `now_ms`, performing at most one phase transition.
    ///
    /// Call repeatedly until it returns `Ok(None)` to catch up after a stall.
    /// An entropy failure leaves the scheduler in Betting with no time left;
    /// the next call retries the draw.
    pub fn step(&mut self, now_ms: u64) -> Result<Option<RoundTransition>, EntropyError> {
        let since = now_ms.saturating_sub(self.phase_started_at);

        match self.state.phase {
            RoundPhase::Betting => {
                let window = self.timing.betting_window_ms;
                if since < window {
                    self.state.betting_time_left_ms = window - since;
                    return Ok(None);
                }

                let crash_point = match self.generator.generate_crash_point() {
                    Ok(point) => point,
                    Err(e) => {
                        self.state.betting_time_left_ms = 0;
                        error!(round_id = self.round_id, "cannot start round: {}", e);
                        return Err(e);
                    }
                };

                self.phase_started_at += window;
                self.state = RoundState::running(crash_point);
                info!(round_id = self.round_id, "round started");
                Ok(Some(RoundTransition::RoundStarted {
                    round_id: self.round_id,
                }))
            }
            RoundPhase::Running => {
                let multiplier = multiplier_at(since);
                let crash_point = self.state.crash_point;

                if multiplier < crash_point {
                    self.state.multiplier = multiplier;
                    self.state.elapsed_ms = since;
                    return Ok(None);
                }

                self.phase_started_at = now_ms;
                self.state = RoundState::crashed(crash_point, since);
                info!(round_id = self.round_id, crash_point, elapsed_ms = since, "round crashed");
                Ok(Some(RoundTransition::Crashed {
                    round_id: self.round_id,
                    crash_point,
                    elapsed_ms: since,
                }))
            }
            RoundPhase::Crashed => {
                let delay = self.timing.crashed_delay_ms;
                if since < delay {
                    return Ok(None);
                }

                self.phase_started_at += delay;
                self.round_id += 1;
                self.state = RoundState::betting(self.timing.betting_window_ms);
                debug!(round_id = self.round_id, "betting opened");
                Ok(Some(RoundTransition::BettingOpened {
                    round_id: self.round_id,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::fairness::ScriptedEntropy;
    use crate::game::multiplier::elapsed_for_multiplier;

    fn scheduler(points: &[f64]) -> RoundScheduler<ScriptedEntropy> {
        let generator = CrashPointGenerator::new(ScriptedEntropy::from_crash_points(
            points.iter().copied(),
        ));
        RoundScheduler::new(RoundTiming::default(), generator, 0)
    }

    fn drain(scheduler: &mut RoundScheduler<ScriptedEntropy>, now: u64) -> Vec<RoundTransition> {
        let mut transitions = Vec::new();
        while let Some(t) = scheduler.step(now).unwrap() {
            transitions.push(t);
        }
        transitions
    }

    #[test]
    fn test_betting_countdown_uses_elapsed_time() {
        let mut s = scheduler(&[2.0]);
        assert_eq!(s.state().betting_time_left_ms, 5_000);

        assert!(drain(&mut s, 1_234).is_empty());
        assert_eq!(s.phase(), RoundPhase::Betting);
        assert_eq!(s.state().betting_time_left_ms, 3_766);
        assert_eq!(s.state().crash_point, 0.0);
    }

    #[test]
    fn test_full_cycle() {
        let mut s = scheduler(&[2.0, 1.5]);

        assert_eq!(drain(&mut s, 5_000), vec![RoundTransition::RoundStarted { round_id: 1 }]);
        assert_eq!(s.phase(), RoundPhase::Running);
        assert_eq!(s.state().multiplier, 1.0);

        assert!(drain(&mut s, 6_000).is_empty());
        assert_eq!(s.state().elapsed_ms, 1_000);
        assert_eq!(s.state().multiplier, multiplier_at(1_000));
        assert_eq!(s.snapshot().crash_point, None);

        let crash_at = 5_000 + elapsed_for_multiplier(s.state().crash_point);
        assert!(drain(&mut s, crash_at - 1).is_empty());
        let transitions = drain(&mut s, crash_at);
        assert!(matches!(
            transitions.as_slice(),
            [RoundTransition::Crashed { round_id: 1, .. }]
        ));
        assert_eq!(s.phase(), RoundPhase::Crashed);
        assert_eq!(s.state().multiplier, s.state().crash_point);
        assert!(s.snapshot().crash_point.is_some());

        assert!(drain(&mut s, crash_at + 2_999).is_empty());
        assert_eq!(
            drain(&mut s, crash_at + 3_000),
            vec![RoundTransition::BettingOpened { round_id: 2 }]
        );
        assert_eq!(s.state(), &RoundState::betting(5_000));
    }

    #[test]
    fn test_late_tick_does_not_shift_round_start() {
        let mut s = scheduler(&[50.0]);

        // first tick after the window lands 180ms late
        assert_eq!(drain(&mut s, 5_180).len(), 1);
        assert_eq!(s.state().elapsed_ms, 180);
        assert_eq!(s.state().multiplier, multiplier_at(180));

        drain(&mut s, 6_000);
        assert_eq!(s.state().elapsed_ms, 1_000);
    }

    #[test]
    fn test_instant_bust_crashes_on_first_tick() {
        let mut s = scheduler(&[1.0]);
        let transitions = drain(&mut s, 5_000);

        assert_eq!(transitions.len(), 2);
        assert_eq!(s.phase(), RoundPhase::Crashed);
        assert_eq!(s.state().multiplier, 1.0);
        assert_eq!(s.state().elapsed_ms, 0);
    }

    #[test]
    fn test_entropy_failure_keeps_betting_phase() {
        let mut s = scheduler(&[]);

        assert!(s.step(5_500).is_err());
        assert_eq!(s.phase(), RoundPhase::Betting);
        assert_eq!(s.state().betting_time_left_ms, 0);
        assert_eq!(s.round_id(), 1);
    }
}
