//! Tokio driver for a [`CrashGame`]
//!
//! [`GameRuntime`] spawns one ticker task that advances the game every tick
//! interval. The game lives behind a single mutex, so ticks, commands and
//! queries from any number of [`GameHandle`] clones are applied one at a time.
//! Shutting the runtime down (or dropping it) stops the ticker before the game
//! is released.

use crate::config::CrashlineConfig;
use crate::engine::CrashGame;
use crate::errors::CrashlineResult;
use crate::game::{
    GameEvent, PlayerView, RoundPhase, RoundSnapshot, Wager, WagerOutcome, WagerRejection,
};
use crate::metrics::GameMetrics;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

/// Cloneable access to a running game
#[derive(Clone)]
pub struct GameHandle {
    game: Arc<Mutex<CrashGame>>,
    events: broadcast::Sender<GameEvent>,
    metrics: GameMetrics,
}

impl GameHandle {
    pub fn new(game: CrashGame, event_buffer: usize) -> Self {
        let metrics = game.metrics().clone();
        let (events, _) = broadcast::channel(event_buffer.max(1));
        Self {
            game: Arc::new(Mutex::new(game)),
            events,
            metrics,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CrashGame> {
        self.game.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: GameEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    fn publish_all(&self, events: Vec<GameEvent>) {
        for event in events {
            self.publish(event);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }

    /// Advance the game to now and publish what happened, followed by a `Tick` snapshot
    pub fn tick(&self) -> CrashlineResult<()> {
        let mut events = Vec::new();
        let result = {
            let mut game = self.lock();
            let result = game.tick_into(&mut events);
            if result.is_ok() {
                events.push(GameEvent::Tick {
                    snapshot: game.snapshot(),
                });
            }
            result
        };
        self.publish_all(events);
        result
    }

    /// Runs `command` against a game that has been brought up to the current time
    fn command<T>(&self, command: impl FnOnce(&mut CrashGame) -> T) -> T {
        let mut events = Vec::new();
        let output = {
            let mut game = self.lock();
            if let Err(e) = game.tick_into(&mut events) {
                // the ticker reports and halts; the command sees the halted game
                debug!("sync before command failed: {}", e);
            }
            command(&mut game)
        };
        self.publish_all(events);
        output
    }

    pub fn try_place_wager(&self, amount: f64) -> Result<Wager, WagerRejection> {
        self.command(|game| game.try_place_wager(amount))
    }

    pub fn try_cancel_wager(&self) -> Result<f64, WagerRejection> {
        self.command(|game| game.try_cancel_wager())
    }

    pub fn try_cash_out(&self) -> Result<Wager, WagerRejection> {
        let (result, round_id) = self.command(|game| (game.try_cash_out(), game.round_id()));
        if let Ok(wager) = &result {
            self.publish(GameEvent::WagerSettled {
                round_id,
                amount: wager.amount,
                outcome: WagerOutcome::Win,
                profit: wager.profit().unwrap_or_default(),
            });
        }
        result
    }

    pub fn place_wager(&self, amount: f64) -> bool {
        self.try_place_wager(amount).is_ok()
    }

    pub fn cancel_wager(&self) -> bool {
        self.try_cancel_wager().is_ok()
    }

    pub fn cash_out(&self) -> bool {
        self.try_cash_out().is_ok()
    }

    pub fn set_balance(&self, balance: f64) -> Result<(), WagerRejection> {
        self.lock().set_balance(balance)
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        self.lock().snapshot()
    }

    pub fn phase(&self) -> RoundPhase {
        self.lock().phase()
    }

    pub fn history(&self) -> Vec<f64> {
        self.lock().history()
    }

    pub fn balance(&self) -> f64 {
        self.lock().balance()
    }

    pub fn wager(&self) -> Option<Wager> {
        self.lock().wager()
    }

    pub fn player(&self) -> PlayerView {
        self.lock().player()
    }

    pub fn halt_reason(&self) -> Option<String> {
        self.lock().halt_reason().map(str::to_string)
    }

    pub fn metrics(&self) -> &GameMetrics {
        &self.metrics
    }
}

/// Owns the ticker task of a game
pub struct GameRuntime {
    handle: GameHandle,
    shutdown_tx: watch::Sender<bool>,
    ticker: Option<JoinHandle<()>>,
}

impl GameRuntime {
    /// Spawn the ticker. Must be called from within a tokio runtime.
    pub fn start(game: CrashGame, tick_interval: Duration, event_buffer: usize) -> Self {
        let handle = GameHandle::new(game, event_buffer);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let ticker = tokio::spawn(run_ticker(handle.clone(), tick_interval, shutdown_rx));
        info!(tick_interval_ms = tick_interval.as_millis() as u64, "game runtime started");

        Self {
            handle,
            shutdown_tx,
            ticker: Some(ticker),
        }
    }

    /// Fresh game on the monotonic clock and OS entropy, ticking at the configured interval
    pub fn from_config(config: &CrashlineConfig) -> Self {
        Self::start(
            CrashGame::new(&config.game),
            config.game.tick_interval(),
            config.api.event_buffer,
        )
    }

    pub fn handle(&self) -> GameHandle {
        self.handle.clone()
    }

    /// Stop the ticker and wait for it to finish
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(ticker) = self.ticker.take() {
            if let Err(e) = ticker.await {
                error!("ticker task failed: {}", e);
            }
        }
        info!("game runtime stopped");
    }
}

impl Drop for GameRuntime {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

async fn run_ticker(handle: GameHandle, tick_interval: Duration, mut shutdown_rx: watch::Receiver<bool>) {
    let mut tick = tokio::time::interval(tick_interval);
    // elapsed time comes from the clock, so dropped ticks cost nothing but latency
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = shutdown_rx.changed() => break,
            _ = tick.tick() => {
                if let Err(e) = handle.tick() {
                    error!("game stopped: {}", e);
                    handle.publish(GameEvent::Halted { reason: e.to_string() });
                    break;
                }
            }
        }
    }
}
