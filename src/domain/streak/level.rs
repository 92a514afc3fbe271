//! Streak level tiers.

use serde::{Deserialize, Serialize};

/// Named tier unlocked at a streak-length threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreakLevel {
    #[default]
    None,
    Bronze,
    Silver,
    Gold,
    Diamond,
}

impl StreakLevel {
    /// Tiers above `None`, highest threshold first.
    const TIERS: [StreakLevel; 4] = [
        StreakLevel::Diamond,
        StreakLevel::Gold,
        StreakLevel::Silver,
        StreakLevel::Bronze,
    ];

    /// Streak length at which this level is reached.
    pub fn threshold(&self) -> u32 {
        match self {
            StreakLevel::None => 0,
            StreakLevel::Bronze => 3,
            StreakLevel::Silver => 7,
            StreakLevel::Gold => 14,
            StreakLevel::Diamond => 30,
        }
    }

    /// Highest level whose threshold is at most `streak`.
    pub fn for_streak(streak: u32) -> Self {
        Self::TIERS
            .into_iter()
            .find(|level| streak >= level.threshold())
            .unwrap_or(StreakLevel::None)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StreakLevel::None => "none",
            StreakLevel::Bronze => "bronze",
            StreakLevel::Silver => "silver",
            StreakLevel::Gold => "gold",
            StreakLevel::Diamond => "diamond",
        }
    }
}

impl std::fmt::Display for StreakLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
