//! Streak policy configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::streak::StreakPolicy;

const SECOND_MS: u64 = 1_000;
const DAY_MS: u64 = 24 * 60 * 60 * SECOND_MS;

/// Latency thresholds and protection cooldown
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct StreakConfig {
    /// Responses at or under this count as quick
    #[serde(default = "default_quick_threshold")]
    pub quick_threshold_secs: u64,

    /// Responses over this count as a miss; also the listener timeout
    #[serde(default = "default_max_latency")]
    pub max_latency_secs: u64,

    /// Minimum days between streak protections
    #[serde(default = "default_protection_cooldown")]
    pub protection_cooldown_days: u64,
}

impl StreakConfig {
    pub fn policy(&self) -> StreakPolicy {
        StreakPolicy::new(
            self.quick_threshold_secs * SECOND_MS,
            self.max_latency_secs * SECOND_MS,
            self.protection_cooldown_days * DAY_MS,
        )
    }

    /// Validate streak configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.quick_threshold_secs == 0 {
            return Err(ValidationError::ZeroStreakSetting("quick_threshold_secs"));
        }
        if self.max_latency_secs == 0 {
            return Err(ValidationError::ZeroStreakSetting("max_latency_secs"));
        }
        if self.protection_cooldown_days == 0 {
            return Err(ValidationError::ZeroStreakSetting("protection_cooldown_days"));
        }
        if self.max_latency_secs < self.quick_threshold_secs {
            return Err(ValidationError::LatencyBelowQuickThreshold);
        }
        Ok(())
    }
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            quick_threshold_secs: default_quick_threshold(),
            max_latency_secs: default_max_latency(),
            protection_cooldown_days: default_protection_cooldown(),
        }
    }
}

fn default_quick_threshold() -> u64 {
    5 * 60
}

fn default_max_latency() -> u64 {
    30 * 60
}

fn default_protection_cooldown() -> u64 {
    7
}
