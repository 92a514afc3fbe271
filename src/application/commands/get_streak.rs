//! GetStreakHandler - Query the current streak record

use std::sync::Arc;

use crate::application::errors::ReminderError;
use crate::domain::foundation::{ReminderType, UserId};
use crate::domain::streak::StreakRecord;
use crate::ports::ActivityLog;

/// Query for one user's streak on one reminder type
#[derive(Debug, Clone)]
pub struct GetStreakQuery {
    pub user_id: UserId,
    pub reminder_type: ReminderType,
}

/// Handler for streak queries
pub struct GetStreakHandler {
    activity_log: Arc<dyn ActivityLog>,
}

impl GetStreakHandler {
    pub fn new(activity_log: Arc<dyn ActivityLog>) -> Self {
        Self { activity_log }
    }

    /// Returns a zeroed record for users who never responded.
    pub async fn handle(&self, query: GetStreakQuery) -> Result<StreakRecord, ReminderError> {
        let record = self
            .activity_log
            .load_streak(&query.user_id, &query.reminder_type)
            .await?;
        Ok(record)
    }
}
