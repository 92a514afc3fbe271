//! Streak transition function.
//!
//! `advance` classifies a response latency and moves a [`StreakRecord`]
//! forward. Rules are checked in order and the first match wins:
//!
//! | Latency | Effect |
//! |---------|--------|
//! | `> max_latency` | protect the streak if allowed, else break it |
//! | `<= quick_threshold` | increment, maybe level up |
//! | otherwise | unchanged |
//!
//! Both boundaries are inclusive on the lenient side.

use serde::{Deserialize, Serialize};

use super::{StreakLevel, StreakRecord};
use crate::domain::foundation::Timestamp;

/// Thresholds that classify a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakPolicy {
    /// Responses at or under this latency extend the streak.
    pub quick_threshold_ms: u64,
    /// Responses over this latency count as missed.
    pub max_latency_ms: u64,
    /// Minimum time between two uses of streak protection.
    pub protection_cooldown_ms: u64,
}

impl StreakPolicy {
    pub fn new(quick_threshold_ms: u64, max_latency_ms: u64, protection_cooldown_ms: u64) -> Self {
        Self {
            quick_threshold_ms,
            max_latency_ms,
            protection_cooldown_ms,
        }
    }

    /// Latency to report for a cycle that got no response at all.
    pub fn timed_out_latency(&self) -> u64 {
        self.max_latency_ms.saturating_add(1)
    }
}

impl Default for StreakPolicy {
    fn default() -> Self {
        Self {
            quick_threshold_ms: 5 * 60 * 1000,
            max_latency_ms: 30 * 60 * 1000,
            protection_cooldown_ms: 7 * 24 * 60 * 60 * 1000,
        }
    }
}

/// What a transition did to the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StreakChange {
    /// Streak grew; `new_level` is set when a threshold was just crossed.
    Increased { new_level: Option<StreakLevel> },
    /// Missed response; streak reset to zero from `previous`.
    Broken { previous: u32 },
    /// Missed response absorbed by protection.
    Protected,
    /// Slow but in-time response.
    Unchanged,
}

/// Applies one response to a streak record.
pub fn advance(
    record: &StreakRecord,
    latency_ms: u64,
    policy: &StreakPolicy,
    now: Timestamp,
) -> (StreakRecord, StreakChange) {
    let mut next = record.clone();
    next.last_updated = now;

    if latency_ms > policy.max_latency_ms {
        if protection_available(record, policy, now) {
            next.protection_used_count = next.protection_used_count.saturating_add(1);
            next.last_protection_used_at = Some(now);
            return (next, StreakChange::Protected);
        }

        next.current_streak = 0;
        next.streak_level = StreakLevel::None;
        return (
            next,
            StreakChange::Broken {
                previous: record.current_streak,
            },
        );
    }

    if latency_ms <= policy.quick_threshold_ms {
        next.current_streak = next.current_streak.saturating_add(1);
        next.streak_level = StreakLevel::for_streak(next.current_streak);
        next.longest_streak = next.longest_streak.max(next.current_streak);

        let new_level = (next.streak_level != record.streak_level).then_some(next.streak_level);
        return (next, StreakChange::Increased { new_level });
    }

    (next, StreakChange::Unchanged)
}

/// Protection needs a streak worth keeping and an elapsed cooldown.
fn protection_available(record: &StreakRecord, policy: &StreakPolicy, now: Timestamp) -> bool {
    if record.current_streak == 0 {
        return false;
    }
    match record.last_protection_used_at {
        None => true,
        Some(last) => now.millis_since(&last) >= policy.protection_cooldown_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_MS: u64 = 24 * 60 * 60 * 1000;

    fn policy() -> StreakPolicy {
        StreakPolicy::new(60_000, 600_000, 7 * DAY_MS)
    }

    fn now() -> Timestamp {
        Timestamp::from_unix_millis(1_717_000_000_000)
    }

    fn record_at(streak: u32) -> StreakRecord {
        let mut record = StreakRecord::new(Timestamp::from_unix_millis(0));
        record.current_streak = streak;
        record.longest_streak = streak;
        record.streak_level = StreakLevel::for_streak(streak);
        record
    }

    #[test]
    fn quick_response_crosses_into_bronze() {
        let (next, change) = advance(&record_at(2), 1_000, &policy(), now());
        assert_eq!(next.current_streak, 3);
        assert_eq!(next.streak_level, StreakLevel::Bronze);
        assert_eq!(
            change,
            StreakChange::Increased {
                new_level: Some(StreakLevel::Bronze)
            }
        );
    }

    #[test]
    fn quick_response_without_threshold_carries_no_level() {
        let (next, change) = advance(&record_at(4), 1_000, &policy(), now());
        assert_eq!(next.current_streak, 5);
        assert_eq!(change, StreakChange::Increased { new_level: None });
    }

    #[test]
    fn latency_equal_to_quick_threshold_counts_as_quick() {
        let (next, change) = advance(&record_at(0), 60_000, &policy(), now());
        assert_eq!(next.current_streak, 1);
        assert!(matches!(change, StreakChange::Increased { .. }));
    }

    #[test]
    fn latency_equal_to_max_is_not_a_timeout() {
        let (next, change) = advance(&record_at(5), 600_000, &policy(), now());
        assert_eq!(change, StreakChange::Unchanged);
        assert_eq!(next.current_streak, 5);
        assert_eq!(next.protection_used_count, 0);
    }

    #[test]
    fn latency_one_past_max_takes_timeout_path() {
        let (next, change) = advance(&record_at(5), 600_001, &policy(), now());
        assert_eq!(change, StreakChange::Protected);
        assert_eq!(next.protection_used_count, 1);
    }

    #[test]
    fn first_timeout_uses_protection() {
        let (next, change) = advance(&record_at(5), policy().timed_out_latency(), &policy(), now());
        assert_eq!(change, StreakChange::Protected);
        assert_eq!(next.current_streak, 5);
        assert_eq!(next.protection_used_count, 1);
        assert_eq!(next.last_protection_used_at, Some(now()));
    }

    #[test]
    fn timeout_within_cooldown_breaks_streak() {
        let mut record = record_at(5);
        record.protection_used_count = 1;
        record.last_protection_used_at = Some(now().minus_days(2));

        let (next, change) = advance(&record, policy().timed_out_latency(), &policy(), now());
        assert_eq!(change, StreakChange::Broken { previous: 5 });
        assert_eq!(next.current_streak, 0);
        assert_eq!(next.streak_level, StreakLevel::None);
        assert_eq!(next.longest_streak, 5);
        assert_eq!(next.protection_used_count, 1);
    }

    #[test]
    fn protection_returns_after_cooldown() {
        let mut record = record_at(8);
        record.last_protection_used_at = Some(now().minus_days(7));

        let (_, change) = advance(&record, policy().timed_out_latency(), &policy(), now());
        assert_eq!(change, StreakChange::Protected);
    }

    #[test]
    fn timeout_at_zero_streak_is_a_break_without_protection() {
        let (next, change) = advance(&record_at(0), policy().timed_out_latency(), &policy(), now());
        assert_eq!(change, StreakChange::Broken { previous: 0 });
        assert_eq!(next.protection_used_count, 0);
    }

    #[test]
    fn slow_response_leaves_streak_alone() {
        let (next, change) = advance(&record_at(9), 120_000, &policy(), now());
        assert_eq!(change, StreakChange::Unchanged);
        assert_eq!(next.current_streak, 9);
        assert_eq!(next.streak_level, StreakLevel::Silver);
    }

    #[test]
    fn every_branch_stamps_last_updated() {
        for latency in [0, 120_000, 600_001] {
            let (next, _) = advance(&record_at(3), latency, &policy(), now());
            assert_eq!(next.last_updated, now());
        }
    }

    #[test]
    fn longest_streak_tracks_new_maximum() {
        let mut record = record_at(3);
        record.longest_streak = 3;
        let (next, _) = advance(&record, 0, &policy(), now());
        assert_eq!(next.longest_streak, 4);
    }
}
