//! Outcome Publisher Port - delivers cycle outcomes to the messaging layer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode, ReminderType, Timestamp, UserId};
use crate::domain::reminder::ResolutionKind;
use crate::domain::streak::ReminderOutcome;

/// Emitted once per resolved delivery cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeEvent {
    pub user_id: UserId,
    pub reminder_type: ReminderType,
    pub resolution: ResolutionKind,
    pub outcome: ReminderOutcome,
    pub occurred_at: Timestamp,
}

impl OutcomeEvent {
    /// Wire form handed to messaging layers outside the process.
    pub fn to_json(&self) -> Result<String, DomainError> {
        serde_json::to_string(self).map_err(|e| {
            DomainError::new(ErrorCode::InternalError, format!("Outcome serialization failed: {}", e))
        })
    }
}

/// Port for publishing outcome events.
#[async_trait]
pub trait OutcomePublisher: Send + Sync {
    async fn publish(&self, event: OutcomeEvent) -> Result<(), DomainError>;
}
