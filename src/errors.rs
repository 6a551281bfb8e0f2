//! Error types for the crashline engine
//!
//! Rejected player commands are not errors at this level; they are reported as
//! [`WagerRejection`](crate::game::ledger::WagerRejection) values. The types here
//! cover configuration problems and the failure of the randomness source, which
//! is fatal to the round that needed it.

use thiserror::Error;

/// Root error type for all crashline operations
#[derive(Debug, Error)]
pub enum CrashlineError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The entropy source could not produce a crash point
    #[error("Entropy error: {0}")]
    Entropy(#[from] EntropyError),

    /// A previous entropy failure stopped the game
    #[error("Game halted: {0}")]
    Halted(String),

    /// Socket and file errors from the binaries
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration and validation errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Missing required field: {0}")]
    MissingRequired(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),
}

/// Failure of the cryptographic randomness source.
///
/// There is no fallback generator: a round cannot start without a crash point
/// drawn from a strong source.
#[derive(Debug, Error)]
pub enum EntropyError {
    #[error("Operating system RNG unavailable: {0}")]
    Unavailable(String),

    #[error("Entropy source exhausted")]
    Exhausted,

    #[error("Entropy source produced {0}, expected a value in [0, 1)")]
    OutOfRange(f64),
}

impl From<rand_core::Error> for EntropyError {
    fn from(e: rand_core::Error) -> Self {
        EntropyError::Unavailable(e.to_string())
    }
}

impl From<toml::de::Error> for CrashlineError {
    fn from(e: toml::de::Error) -> Self {
        CrashlineError::Configuration(ConfigurationError::LoadFailed(e.to_string()))
    }
}

// Convenience type alias for Results
pub type CrashlineResult<T> = Result<T, CrashlineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn test_error_display() {
        let config_error = ConfigurationError::ValidationFailed("test".to_string());
        let error = CrashlineError::Configuration(config_error);

        assert!(error.to_string().contains("Configuration error"));
        assert!(error.to_string().contains("test"));
    }

    #[test]
    fn test_invalid_value_details() {
        let error = ConfigurationError::InvalidValue {
            field: "game.tick_interval_ms".to_string(),
            value: "0".to_string(),
            reason: "Tick interval cannot be zero".to_string(),
        };

        assert!(error.to_string().contains("game.tick_interval_ms"));
        assert!(error.to_string().contains("cannot be zero"));
    }

    #[test]
    fn test_error_conversion() {
        let error: CrashlineError = EntropyError::Exhausted.into();

        match error {
            CrashlineError::Entropy(EntropyError::Exhausted) => {}
            _ => panic!("Expected entropy error"),
        }
    }

    #[test]
    fn test_error_source() {
        let error = CrashlineError::Configuration(ConfigurationError::MissingRequired(
            "api.host".to_string(),
        ));

        assert!(error.source().is_some());
    }
}
