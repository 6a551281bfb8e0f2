pub mod types;
pub mod clock;
pub mod fairness;
pub mod multiplier;
pub mod round;
pub mod ledger;
pub mod history;

pub use types::*;
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use fairness::{CrashPointGenerator, EntropySource, OsEntropy, ScriptedEntropy, SeededEntropy};
pub use history::HistoryLog;
pub use ledger::{WagerLedger, WagerRejection};
pub use multiplier::multiplier_at;
pub use round::{RoundScheduler, RoundTiming, RoundTransition};
