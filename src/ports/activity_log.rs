//! Activity Log Port - append-only activity entries and streak records.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ReminderType, Timestamp, UserId};
use crate::domain::streak::StreakRecord;

/// One logged user action, e.g. 250 ml of water.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub user_id: UserId,
    pub kind: String,
    pub amount: f64,
    pub unit: String,
    pub note: Option<String>,
    pub recorded_at: Timestamp,
}

impl ActivityEntry {
    pub fn new(
        user_id: UserId,
        kind: impl Into<String>,
        amount: f64,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            kind: kind.into(),
            amount,
            unit: unit.into(),
            note: None,
            recorded_at: Timestamp::now(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Errors from the activity log.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ActivityLogError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Corrupt streak record for {user_id}/{reminder_type}: {reason}")]
    CorruptRecord {
        user_id: UserId,
        reminder_type: ReminderType,
        reason: String,
    },
}

/// Port for durable activity and streak persistence.
#[async_trait]
pub trait ActivityLog: Send + Sync {
    /// Append an activity entry.
    async fn record_activity(&self, entry: &ActivityEntry) -> Result<(), ActivityLogError>;

    /// Load the streak record, returning a zeroed record if none exists yet.
    async fn load_streak(
        &self,
        user_id: &UserId,
        reminder_type: &ReminderType,
    ) -> Result<StreakRecord, ActivityLogError>;

    /// Upsert the streak record.
    async fn save_streak(
        &self,
        user_id: &UserId,
        reminder_type: &ReminderType,
        record: &StreakRecord,
    ) -> Result<(), ActivityLogError>;
}
