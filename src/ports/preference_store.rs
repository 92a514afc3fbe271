//! Preference Store Port - durable reminder configuration.

use async_trait::async_trait;

use crate::domain::foundation::{ReminderType, UserId};
use crate::domain::reminder::ReminderPreference;

/// Errors that can occur during preference storage operations
#[derive(Debug, thiserror::Error)]
pub enum PreferenceStoreError {
    #[error("Failed to serialize preferences: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize preferences: {0}")]
    DeserializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Port for reading and writing reminder preferences.
///
/// Implementations need point lookups and upserts keyed by
/// `(user_id, reminder_type)`.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Load one preference, or `None` if the user never configured it.
    async fn load(
        &self,
        user_id: &UserId,
        reminder_type: &ReminderType,
    ) -> Result<Option<ReminderPreference>, PreferenceStoreError>;

    /// Insert or replace a preference.
    async fn save(&self, preference: &ReminderPreference) -> Result<(), PreferenceStoreError>;

    /// Every preference with `enabled = true`, used to re-arm on startup.
    async fn list_enabled(&self) -> Result<Vec<ReminderPreference>, PreferenceStoreError>;
}
