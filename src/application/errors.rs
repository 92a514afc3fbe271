//! Error taxonomy of the reminder core.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, MessageHandle, ReminderType, ValidationError};
use crate::ports::{ActivityLogError, NotificationError, PreferenceStoreError};

/// Errors raised while configuring or running reminder chains.
///
/// Only `Configuration` and `UnknownReminderType` reach users; the rest
/// are reported to the error sink while the chain keeps running.
#[derive(Debug, Error)]
pub enum ReminderError {
    #[error("Invalid reminder configuration: {0}")]
    Configuration(#[from] ValidationError),

    #[error("Delivery failed: {0}")]
    Delivery(#[from] NotificationError),

    #[error("Preference store failed: {0}")]
    PreferenceStore(#[from] PreferenceStoreError),

    #[error("Activity log failed: {0}")]
    ActivityLog(#[from] ActivityLogError),

    #[error("Outcome publishing failed: {0}")]
    Publish(DomainError),

    #[error("Message {0} was already resolved by another listener")]
    RaceResolution(MessageHandle),

    #[error("No handler registered for reminder type '{0}'")]
    UnknownReminderType(ReminderType),
}

impl ReminderError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ReminderError::Configuration(err) => err.code(),
            ReminderError::Delivery(NotificationError::Unreachable(_)) => {
                ErrorCode::RecipientUnreachable
            }
            ReminderError::Delivery(_) => ErrorCode::DeliveryFailed,
            ReminderError::PreferenceStore(_) | ReminderError::ActivityLog(_) => {
                ErrorCode::StorageError
            }
            ReminderError::Publish(_) | ReminderError::RaceResolution(_) => {
                ErrorCode::InternalError
            }
            ReminderError::UnknownReminderType(_) => ErrorCode::UnknownReminderType,
        }
    }

    /// True for store read/write failures.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            ReminderError::PreferenceStore(_) | ReminderError::ActivityLog(_)
        )
    }

    /// True for errors a user caused and can fix.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            ReminderError::Configuration(_) | ReminderError::UnknownReminderType(_)
        )
    }
}

impl From<&ReminderError> for DomainError {
    fn from(err: &ReminderError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
