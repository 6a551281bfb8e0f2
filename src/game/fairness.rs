//! Crash point generation
//!
//! A crash point is drawn once per round from a uniform value `u` in [0, 1):
//!
//! ```text
//! crash_point = min(MAX_CRASH_POINT, max(1, (1 - HOUSE_EDGE) / (1 - u)))
//! ```
//!
//! For any cash-out target `m >= 1` the probability that the round reaches
//! `m` is `(1 - HOUSE_EDGE) / m`, so a player cashing out at `m` has an expected
//! return of `1 - HOUSE_EDGE` whatever `m` they pick. The clamp at
//! [`MAX_CRASH_POINT`] cuts the tail above 1000x; targets above the cap can
//! never be reached, which favours the house by a bounded amount.

use crate::errors::EntropyError;
use rand::{rngs::StdRng, RngCore, SeedableRng};
use rand_core::OsRng;

/// Fraction of every wager the house keeps in expectation
pub const HOUSE_EDGE: f64 = 0.03;

/// Upper bound applied to every crash point
pub const MAX_CRASH_POINT: f64 = 1000.0;

/// 2^53, the number of distinct f64 values in [0, 1) at uniform spacing
const UNIT_SCALE: f64 = (1u64 << 53) as f64;

/// Source of uniform values in [0, 1)
pub trait EntropySource: Send {
    fn next_unit(&mut self) -> Result<f64, EntropyError>;
}

impl<E: EntropySource + ?Sized> EntropySource for Box<E> {
    fn next_unit(&mut self) -> Result<f64, EntropyError> {
        (**self).next_unit()
    }
}

/// Operating system CSPRNG
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn next_unit(&mut self) -> Result<f64, EntropyError> {
        let mut bytes = [0u8; 8];
        OsRng.try_fill_bytes(&mut bytes)?;
        Ok(unit_from_bits(u64::from_le_bytes(bytes)))
    }
}

/// ChaCha-based generator with an explicit seed, for reproducible simulations
pub struct SeededEntropy {
    rng: StdRng,
}

impl SeededEntropy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl EntropySource for SeededEntropy {
    fn next_unit(&mut self) -> Result<f64, EntropyError> {
        let mut bytes = [0u8; 8];
        self.rng.try_fill_bytes(&mut bytes)?;
        Ok(unit_from_bits(u64::from_le_bytes(bytes)))
    }
}

/// Replays a fixed list of unit values, then reports exhaustion
#[derive(Debug, Clone, Default)]
pub struct ScriptedEntropy {
    values: std::collections::VecDeque<f64>,
}

impl ScriptedEntropy {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    /// Script that yields exactly the given crash points (each must be in [1, 1000])
    pub fn from_crash_points(points: impl IntoIterator<Item = f64>) -> Self {
        Self::new(points.into_iter().map(unit_for_crash_point))
    }
}

impl EntropySource for ScriptedEntropy {
    fn next_unit(&mut self) -> Result<f64, EntropyError> {
        let u = self.values.pop_front().ok_or(EntropyError::Exhausted)?;
        if !(0.0..1.0).contains(&u) {
            return Err(EntropyError::OutOfRange(u));
        }
        Ok(u)
    }
}

/// Keep the top 53 bits so every output is an exact multiple of 2^-53
fn unit_from_bits(bits: u64) -> f64 {
    (bits >> 11) as f64 / UNIT_SCALE
}

/// Apply the house-edge transform and the cap to a uniform draw
pub fn crash_point_from_unit(u: f64) -> f64 {
    let raw = (1.0 - HOUSE_EDGE) / (1.0 - u);
    raw.max(1.0).min(MAX_CRASH_POINT)
}

/// Unit value that maps back to `crash_point` (within float tolerance)
pub fn unit_for_crash_point(crash_point: f64) -> f64 {
    if crash_point <= 1.0 {
        return 0.0;
    }
    1.0 - (1.0 - HOUSE_EDGE) / crash_point
}

/// Draws one crash point per round
pub struct CrashPointGenerator<E = OsEntropy> {
    source: E,
}

impl CrashPointGenerator<OsEntropy> {
    pub fn new_os() -> Self {
        Self::new(OsEntropy)
    }
}

impl<E: EntropySource> CrashPointGenerator<E> {
    pub fn new(source: E) -> Self {
        Self { source }
    }

    /// Always in `[1, MAX_CRASH_POINT]`
    pub fn generate_crash_point(&mut self) -> Result<f64, EntropyError> {
        let u = self.source.next_unit()?;
        Ok(crash_point_from_unit(u))
    }
}
