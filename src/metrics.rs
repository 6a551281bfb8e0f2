//! Round and wager counters

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Lock-free counters shared between the game and readers such as the API
#[derive(Debug, Clone)]
pub struct GameMetrics {
    inner: Arc<Counters>,
}

#[derive(Debug)]
struct Counters {
    start_time: Instant,
    rounds_started: AtomicU64,
    rounds_crashed: AtomicU64,
    wagers_placed: AtomicU64,
    wagers_cancelled: AtomicU64,
    cash_outs: AtomicU64,
    losses: AtomicU64,
    rejections: AtomicU64,
}

/// Point-in-time copy of [`GameMetrics`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub rounds_started: u64,
    pub rounds_crashed: u64,
    pub wagers_placed: u64,
    pub wagers_cancelled: u64,
    pub cash_outs: u64,
    pub losses: u64,
    pub rejections: u64,
    pub rounds_per_minute: f64,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Counters {
                start_time: Instant::now(),
                rounds_started: AtomicU64::new(0),
                rounds_crashed: AtomicU64::new(0),
                wagers_placed: AtomicU64::new(0),
                wagers_cancelled: AtomicU64::new(0),
                cash_outs: AtomicU64::new(0),
                losses: AtomicU64::new(0),
                rejections: AtomicU64::new(0),
            }),
        }
    }

    pub fn record_round_started(&self) {
        self.inner.rounds_started.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_round_crashed(&self) {
        self.inner.rounds_crashed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_wager_placed(&self) {
        self.inner.wagers_placed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_wager_cancelled(&self) {
        self.inner.wagers_cancelled.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_cash_out(&self) {
        self.inner.cash_outs.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_loss(&self) {
        self.inner.losses.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_rejection(&self) {
        self.inner.rejections.fetch_add(1, Ordering::SeqCst);
    }

    pub fn total_runtime(&self) -> Duration {
        self.inner.start_time.elapsed()
    }

    pub fn rounds_per_minute(&self) -> f64 {
        let total_minutes = self.total_runtime().as_secs_f64() / 60.0;
        if total_minutes <= 0.0 {
            return 0.0;
        }
        self.inner.rounds_crashed.load(Ordering::SeqCst) as f64 / total_minutes
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let c = &self.inner;
        MetricsSnapshot {
            uptime_secs: self.total_runtime().as_secs(),
            rounds_started: c.rounds_started.load(Ordering::SeqCst),
            rounds_crashed: c.rounds_crashed.load(Ordering::SeqCst),
            wagers_placed: c.wagers_placed.load(Ordering::SeqCst),
            wagers_cancelled: c.wagers_cancelled.load(Ordering::SeqCst),
            cash_outs: c.cash_outs.load(Ordering::SeqCst),
            losses: c.losses.load(Ordering::SeqCst),
            rejections: c.rejections.load(Ordering::SeqCst),
            rounds_per_minute: self.rounds_per_minute(),
        }
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_counters() {
        let metrics = GameMetrics::new();
        let reader = metrics.clone();

        metrics.record_round_started();
        metrics.record_wager_placed();
        metrics.record_cash_out();
        metrics.record_round_crashed();

        let snapshot = reader.snapshot();
        assert_eq!(snapshot.rounds_started, 1);
        assert_eq!(snapshot.rounds_crashed, 1);
        assert_eq!(snapshot.wagers_placed, 1);
        assert_eq!(snapshot.cash_outs, 1);
        assert_eq!(snapshot.losses, 0);
    }
}
