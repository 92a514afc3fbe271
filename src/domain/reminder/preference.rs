//! Per-user reminder configuration.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::{DeliveryWindow, JitterPolicy, TimeOfDay};
use crate::domain::foundation::{ReminderType, ScheduleKey, Timestamp, UserId, ValidationError};

/// Upper bound for `frequency_minutes` (one day).
pub const MAX_FREQUENCY_MINUTES: u32 = 24 * 60;

/// A user's configuration for one reminder type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderPreference {
    pub user_id: UserId,
    pub reminder_type: ReminderType,
    pub enabled: bool,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub timezone: Tz,
    pub frequency_minutes: u32,
    #[serde(default)]
    pub random: bool,
    #[serde(default = "default_random_multiple")]
    pub frequency_random_multiple: f64,
    #[serde(default)]
    pub last_sent: Option<Timestamp>,
}

fn default_random_multiple() -> f64 {
    1.0
}

impl ReminderPreference {
    pub fn key(&self) -> ScheduleKey {
        ScheduleKey::new(self.user_id.clone(), self.reminder_type.clone())
    }

    /// Checks the invariants a schedulable preference must hold.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.window()?;
        if self.frequency_minutes == 0 || self.frequency_minutes > MAX_FREQUENCY_MINUTES {
            return Err(ValidationError::out_of_range(
                "frequency_minutes",
                1,
                i64::from(MAX_FREQUENCY_MINUTES),
                i64::from(self.frequency_minutes),
            ));
        }
        if !self.frequency_random_multiple.is_finite() || self.frequency_random_multiple < 1.0 {
            return Err(ValidationError::invalid_format(
                "frequency_random_multiple",
                format!("must be at least 1.0, got {}", self.frequency_random_multiple),
            ));
        }
        Ok(())
    }

    pub fn window(&self) -> Result<DeliveryWindow, ValidationError> {
        DeliveryWindow::new(self.start_time, self.end_time, self.timezone)
    }

    /// Jitter policy for this chain; `fallback_minutes` fills a zero frequency.
    pub fn jitter(&self, fallback_minutes: u32) -> JitterPolicy {
        let base = if self.frequency_minutes == 0 {
            fallback_minutes
        } else {
            self.frequency_minutes
        };
        JitterPolicy::new(base, self.random, self.frequency_random_multiple)
    }
}
