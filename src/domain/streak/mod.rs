//! Streak module - engagement streaks, levels and protection.

mod engine;
mod level;
mod outcome;
mod record;

pub use engine::{advance, StreakChange, StreakPolicy};
pub use level::StreakLevel;
pub use outcome::ReminderOutcome;
pub use record::StreakRecord;
