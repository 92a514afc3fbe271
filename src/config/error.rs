//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid log filter: {0}")]
    InvalidLogLevel(String),

    #[error("Shutdown grace period must be between 1 and 600 seconds")]
    InvalidShutdownGrace,

    #[error("Streak setting '{0}' must be greater than zero")]
    ZeroStreakSetting(&'static str),

    #[error("max_latency_secs must be at least quick_threshold_secs")]
    LatencyBelowQuickThreshold,

    #[error("Preferences file path is empty")]
    EmptyPreferencesPath,
}
