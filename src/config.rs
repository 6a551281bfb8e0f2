//! Configuration management with validation and defaults
//!
//! Values come from (in increasing precedence) built-in defaults, an optional
//! TOML file, and `CRASHLINE_*` environment variables.

use crate::errors::{ConfigurationError, CrashlineResult};
use crate::game::history::DEFAULT_HISTORY_CAPACITY;
use crate::game::round::RoundTiming;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrashlineConfig {
    pub game: GameConfig,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

/// Round timing and player defaults
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub betting_window_ms: u64,
    pub crashed_delay_ms: u64,
    pub tick_interval_ms: u64,
    pub starting_balance: f64,
    pub history_capacity: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            betting_window_ms: 5_000,
            crashed_delay_ms: 3_000,
            tick_interval_ms: 50,
            starting_balance: 1_000.0,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl GameConfig {
    pub fn timing(&self) -> RoundTiming {
        RoundTiming {
            betting_window_ms: self.betting_window_ms,
            crashed_delay_ms: self.crashed_delay_ms,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// HTTP/WebSocket front end
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// Capacity of the event broadcast channel
    pub event_buffer: usize,
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            allowed_origins: vec!["*".to_string()],
            request_timeout_secs: 30,
            event_buffer: 1_024,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "crashline=info,tower_http=info".to_string(),
        }
    }
}

impl CrashlineConfig {
    /// Short rounds for demos and tests
    pub fn fast() -> Self {
        Self {
            game: GameConfig {
                betting_window_ms: 200,
                crashed_delay_ms: 100,
                tick_interval_ms: 10,
                ..GameConfig::default()
            },
            ..Self::default()
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> CrashlineResult<()> {
        let game = &self.game;

        if game.betting_window_ms == 0 {
            return Err(invalid("game.betting_window_ms", "0", "Betting window cannot be zero"));
        }

        if game.crashed_delay_ms == 0 {
            return Err(invalid("game.crashed_delay_ms", "0", "Crashed delay cannot be zero"));
        }

        if game.tick_interval_ms == 0 {
            return Err(invalid("game.tick_interval_ms", "0", "Tick interval cannot be zero"));
        }

        if game.tick_interval_ms > game.betting_window_ms {
            return Err(invalid(
                "game.tick_interval_ms",
                &game.tick_interval_ms.to_string(),
                "Tick interval must not exceed the betting window",
            ));
        }

        if !game.starting_balance.is_finite() || game.starting_balance < 0.0 {
            return Err(invalid(
                "game.starting_balance",
                &game.starting_balance.to_string(),
                "Starting balance must be a non-negative number",
            ));
        }

        if game.history_capacity == 0 {
            return Err(invalid("game.history_capacity", "0", "History capacity cannot be zero"));
        }

        if self.api.host.is_empty() {
            return Err(ConfigurationError::MissingRequired("api.host".to_string()).into());
        }

        if self.api.port == 0 {
            return Err(invalid("api.port", "0", "Port cannot be zero"));
        }

        if self.api.event_buffer == 0 {
            return Err(invalid("api.event_buffer", "0", "Event buffer cannot be zero"));
        }

        Ok(())
    }
}

fn invalid(field: &str, value: &str, reason: &str) -> crate::errors::CrashlineError {
    ConfigurationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

fn parse_env<T: std::str::FromStr>(key: &str, reason: &str) -> CrashlineResult<Option<T>> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid(key, &raw, reason)),
        Err(_) => Ok(None),
    }
}

/// Configuration loader with environment variable support
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    /// Create a new config loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> CrashlineResult<CrashlineConfig> {
        let mut config = match self.config_path {
            Some(ref path) => self.load_from_file(path)?,
            None => CrashlineConfig::default(),
        };

        self.apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML file
    fn load_from_file(&self, path: &str) -> CrashlineResult<CrashlineConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&self, config: &mut CrashlineConfig) -> CrashlineResult<()> {
        if let Ok(host) = env::var("CRASHLINE_API_HOST") {
            config.api.host = host;
        }
        if let Some(port) = parse_env("CRASHLINE_API_PORT", "Invalid port number")? {
            config.api.port = port;
        }

        if let Some(ms) = parse_env("CRASHLINE_BETTING_WINDOW_MS", "Invalid duration")? {
            config.game.betting_window_ms = ms;
        }
        if let Some(ms) = parse_env("CRASHLINE_CRASHED_DELAY_MS", "Invalid duration")? {
            config.game.crashed_delay_ms = ms;
        }
        if let Some(ms) = parse_env("CRASHLINE_TICK_INTERVAL_MS", "Invalid duration")? {
            config.game.tick_interval_ms = ms;
        }
        if let Some(balance) = parse_env("CRASHLINE_STARTING_BALANCE", "Invalid balance")? {
            config.game.starting_balance = balance;
        }

        if let Ok(filter) = env::var("CRASHLINE_LOG") {
            config.logging.filter = filter;
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, config: &CrashlineConfig, path: &str) -> CrashlineResult<()> {
        let toml_string = toml::to_string_pretty(config)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, toml_string)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to write to {}: {}", path, e)).into())
    }
}

/// Builder pattern for creating configurations
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: CrashlineConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: CrashlineConfig::default(),
        }
    }

    pub fn game(mut self, game: GameConfig) -> Self {
        self.config.game = game;
        self
    }

    pub fn api(mut self, api: ApiConfig) -> Self {
        self.config.api = api;
        self
    }

    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.config.logging = logging;
        self
    }

    pub fn starting_balance(mut self, balance: f64) -> Self {
        self.config.game.starting_balance = balance;
        self
    }

    /// Build and validate the final configuration
    pub fn build(self) -> CrashlineResult<CrashlineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Generate a sample configuration file
pub fn generate_sample_config(path: &str) -> CrashlineResult<()> {
    ConfigLoader::new().save(&CrashlineConfig::default(), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = CrashlineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.game.betting_window_ms, 5_000);
        assert_eq!(config.game.crashed_delay_ms, 3_000);
        assert_eq!(config.game.tick_interval_ms, 50);
        assert_eq!(config.game.starting_balance, 1_000.0);
        assert_eq!(config.game.history_capacity, 20);
    }

    #[test]
    fn test_fast_config_is_valid() {
        assert!(CrashlineConfig::fast().validate().is_ok());
    }

    #[test]
    fn test_invalid_config_validation() {
        let mut config = CrashlineConfig::default();
        config.game.tick_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = CrashlineConfig::default();
        config.game.tick_interval_ms = 6_000;
        assert!(config.validate().is_err());

        let mut config = CrashlineConfig::default();
        config.game.starting_balance = -1.0;
        assert!(config.validate().is_err());

        let mut config = CrashlineConfig::default();
        config.api.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: CrashlineConfig = toml::from_str(
            r#"
            [game]
            betting_window_ms = 8000

            [api]
            port = 9000
            "#,
        )
        .unwrap();

        assert_eq!(config.game.betting_window_ms, 8_000);
        assert_eq!(config.game.crashed_delay_ms, 3_000);
        assert_eq!(config.api.port, 9_000);
        assert_eq!(config.api.host, "0.0.0.0");
    }

    #[test]
    fn test_builder_validates() {
        let config = ConfigBuilder::new().starting_balance(250.0).build().unwrap();
        assert_eq!(config.game.starting_balance, 250.0);

        assert!(ConfigBuilder::new().starting_balance(f64::NAN).build().is_err());
    }

    #[test]
    fn test_save_and_load_config() -> CrashlineResult<()> {
        let temp_file = NamedTempFile::new()?;
        let path = temp_file.path().to_str().unwrap();

        let mut original = CrashlineConfig::default();
        original.game.betting_window_ms = 7_500;
        original.api.allowed_origins = vec!["http://localhost:5173".to_string()];

        let loader = ConfigLoader::new();
        loader.save(&original, path)?;
        let loaded = ConfigLoader::new().with_path(path).load_from_file(path)?;

        assert_eq!(loaded, original);
        Ok(())
    }

    #[test]
    fn test_missing_file_fails_to_load() {
        let result = ConfigLoader::new()
            .with_path("/nonexistent/crashline.toml")
            .load();
        assert!(result.is_err());
    }
}
