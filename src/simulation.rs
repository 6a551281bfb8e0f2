//! Offline crash point statistics
//!
//! Draws crash points straight from a [`CrashPointGenerator`] without running
//! rounds, and measures what a player who always cashes out at one target
//! would get back.

use crate::errors::CrashlineResult;
use crate::game::{CrashPointGenerator, EntropySource};
use serde::{Deserialize, Serialize};

/// Upper bounds of the distribution buckets; the last bucket is open
pub const BUCKET_BOUNDS: [f64; 7] = [1.01, 1.5, 2.0, 5.0, 10.0, 100.0, 1_000.0];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bucket {
    /// Exclusive upper bound, inclusive for the last (clamped) bucket
    pub below: f64,
    pub count: u64,
    pub share: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationReport {
    pub rounds: u64,
    pub target: f64,
    /// Share of rounds whose crash point reached `target`
    pub win_rate: f64,
    /// Average amount returned per unit staked
    pub return_to_player: f64,
    /// Share of rounds crashing at exactly 1.00x
    pub instant_bust_rate: f64,
    pub max_crash_point: f64,
    pub mean_crash_point: f64,
    pub buckets: Vec<Bucket>,
}

/// Draw `rounds` crash points and cash out every one of them at `target`
pub fn simulate<E: EntropySource>(
    generator: &mut CrashPointGenerator<E>,
    rounds: u64,
    target: f64,
) -> CrashlineResult<SimulationReport> {
    let mut wins = 0u64;
    let mut busts = 0u64;
    let mut sum = 0.0;
    let mut max = 1.0f64;
    let mut counts = vec![0u64; BUCKET_BOUNDS.len()];

    for _ in 0..rounds {
        let crash_point = generator.generate_crash_point()?;
        if crash_point >= target {
            wins += 1;
        }
        if crash_point <= 1.0 {
            busts += 1;
        }
        sum += crash_point;
        max = max.max(crash_point);

        let slot = BUCKET_BOUNDS
            .iter()
            .position(|&bound| crash_point < bound)
            .unwrap_or(BUCKET_BOUNDS.len() - 1);
        counts[slot] += 1;
    }

    let total = rounds.max(1) as f64;
    let win_rate = wins as f64 / total;

    Ok(SimulationReport {
        rounds,
        target,
        win_rate,
        return_to_player: win_rate * target,
        instant_bust_rate: busts as f64 / total,
        max_crash_point: max,
        mean_crash_point: sum / total,
        buckets: BUCKET_BOUNDS
            .iter()
            .zip(counts)
            .map(|(&below, count)| Bucket {
                below,
                count,
                share: count as f64 / total,
            })
            .collect(),
    })
}
