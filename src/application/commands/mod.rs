//! Command and query handlers for reminder configuration.
//!
//! ## Commands
//! - `ConfigureReminder` - Validate and save a preference, then restart its chain
//!
//! ## Queries
//! - `GetStreak` - Current streak record for a user and reminder type

mod configure_reminder;
mod get_streak;

pub use configure_reminder::{
    ConfigureReminderCommand, ConfigureReminderHandler, ConfigureReminderResult,
};
pub use get_streak::{GetStreakHandler, GetStreakQuery};
