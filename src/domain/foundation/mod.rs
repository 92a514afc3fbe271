//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types
//! that form the vocabulary of the reminder domain.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{MessageHandle, ReminderType, ScheduleKey, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
