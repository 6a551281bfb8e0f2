//! Crashline - crash wagering game engine
//!
//! A round opens with a betting window, then a multiplier grows as `e^(0.1 t)`
//! from 1.00x until it reaches a crash point drawn from a cryptographic
//! source, and a short pause follows before the next window. One player with a
//! balance may place a single wager per round and cash out while the
//! multiplier is rising.
//!
//! - [`game`]: fairness generator, multiplier curve, round scheduler, wager
//!   ledger and history log
//! - [`engine::CrashGame`]: the aggregate that ties them to a clock
//! - [`runtime::GameRuntime`]: tokio ticker and shared handle
//! - [`api`]: axum HTTP and WebSocket front end
//! - [`simulation`]: offline crash point statistics

pub mod api;
pub mod config;
pub mod engine;
pub mod errors;
pub mod game;
pub mod metrics;
pub mod runtime;
pub mod simulation;

pub use config::{ConfigBuilder, ConfigLoader, CrashlineConfig, GameConfig};
pub use engine::CrashGame;
pub use errors::{CrashlineError, CrashlineResult};
pub use game::{GameEvent, PlayerView, RoundPhase, RoundSnapshot, Wager, WagerRejection, WagerStatus};
pub use metrics::{GameMetrics, MetricsSnapshot};
pub use runtime::{GameHandle, GameRuntime};
