//! User-facing summary of a streak transition.

use serde::{Deserialize, Serialize};

use super::{StreakChange, StreakLevel, StreakRecord};

/// Flat payload handed to the messaging layer after each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderOutcome {
    pub streak_increased: bool,
    pub new_streak: u32,
    pub new_level: Option<StreakLevel>,
    /// Only set when a non-zero streak was lost.
    pub streak_broken: bool,
    pub protection_used: bool,
}

impl ReminderOutcome {
    pub fn from_transition(record: &StreakRecord, change: &StreakChange) -> Self {
        let (streak_increased, new_level, streak_broken, protection_used) = match *change {
            StreakChange::Increased { new_level } => (true, new_level, false, false),
            StreakChange::Broken { previous } => (false, None, previous > 0, false),
            StreakChange::Protected => (false, None, false, true),
            StreakChange::Unchanged => (false, None, false, false),
        };
        Self {
            streak_increased,
            new_streak: record.current_streak,
            new_level,
            streak_broken,
            protection_used,
        }
    }

    /// True if the user should be told something about their streak.
    pub fn is_noteworthy(&self) -> bool {
        self.streak_increased || self.streak_broken || self.protection_used
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;

    fn record(streak: u32) -> StreakRecord {
        let mut r = StreakRecord::new(Timestamp::from_unix_millis(0));
        r.current_streak = streak;
        r.longest_streak = streak;
        r.streak_level = StreakLevel::for_streak(streak);
        r
    }

    #[test]
    fn level_up_is_reported() {
        let outcome = ReminderOutcome::from_transition(
            &record(3),
            &StreakChange::Increased {
                new_level: Some(StreakLevel::Bronze),
            },
        );
        assert!(outcome.streak_increased);
        assert_eq!(outcome.new_streak, 3);
        assert_eq!(outcome.new_level, Some(StreakLevel::Bronze));
    }

    #[test]
    fn breaking_an_empty_streak_is_not_reported() {
        let outcome =
            ReminderOutcome::from_transition(&record(0), &StreakChange::Broken { previous: 0 });
        assert!(!outcome.streak_broken);
        assert!(!outcome.is_noteworthy());
    }

    #[test]
    fn breaking_a_real_streak_is_reported() {
        let outcome =
            ReminderOutcome::from_transition(&record(0), &StreakChange::Broken { previous: 6 });
        assert!(outcome.streak_broken);
        assert_eq!(outcome.new_streak, 0);
    }

    #[test]
    fn new_level_serializes_as_null_when_absent() {
        let outcome = ReminderOutcome::from_transition(&record(5), &StreakChange::Protected);
        let json = serde_json::to_value(outcome).unwrap();
        assert!(json["new_level"].is_null());
        assert_eq!(json["protection_used"], true);
    }
}
