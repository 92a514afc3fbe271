//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `HABIT_NUDGE` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use habit_nudge::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Quick responses within {}s", config.streak.quick_threshold_secs);
//! ```

mod error;
mod service;
mod storage;
mod streak;

pub use error::{ConfigError, ValidationError};
pub use service::{Environment, ServiceConfig};
pub use storage::StorageConfig;
pub use streak::StreakConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a runnable
/// development setup. Load using [`AppConfig::load()`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Service configuration (environment, logging, shutdown)
    #[serde(default)]
    pub service: ServiceConfig,

    /// Streak thresholds
    #[serde(default)]
    pub streak: StreakConfig,

    /// Preference storage
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `HABIT_NUDGE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `HABIT_NUDGE__STREAK__MAX_LATENCY_SECS=900` -> `streak.max_latency_secs = 900`
    /// - `HABIT_NUDGE__STORAGE__PREFERENCES_FILE=...` -> `storage.preferences_file = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("HABIT_NUDGE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.service.validate()?;
        self.streak.validate()?;
        self.storage.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.service.is_production()
    }
}
