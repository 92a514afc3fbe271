//! Persistent streak state for one user and reminder type.

use serde::{Deserialize, Serialize};

use super::StreakLevel;
use crate::domain::foundation::Timestamp;

/// Consecutive-engagement record.
///
/// Created with zero defaults on first resolution, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakRecord {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub streak_level: StreakLevel,
    pub protection_used_count: u32,
    pub last_protection_used_at: Option<Timestamp>,
    pub last_updated: Timestamp,
}

impl StreakRecord {
    /// Fresh record with everything at zero.
    pub fn new(now: Timestamp) -> Self {
        Self {
            current_streak: 0,
            longest_streak: 0,
            streak_level: StreakLevel::None,
            protection_used_count: 0,
            last_protection_used_at: None,
            last_updated: now,
        }
    }

    /// True if the level and longest-streak invariants hold.
    pub fn is_consistent(&self) -> bool {
        self.streak_level == StreakLevel::for_streak(self.current_streak)
            && self.longest_streak >= self.current_streak
    }
}

impl Default for StreakRecord {
    fn default() -> Self {
        Self::new(Timestamp::now())
    }
}
