//! Tracing-backed reporting adapters.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ScheduleKey};
use crate::ports::{ErrorSink, OutcomeEvent, OutcomePublisher};

/// Error sink that writes failures to the tracing output.
#[derive(Debug, Clone, Default)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn report(&self, key: &ScheduleKey, error: &DomainError) {
        tracing::error!(
            user_id = %key.user_id,
            reminder_type = %key.reminder_type,
            code = %error.code,
            details = ?error.details,
            "{}",
            error.message
        );
    }
}

/// Outcome publisher that logs each outcome.
#[derive(Debug, Clone, Default)]
pub struct TracingOutcomePublisher;

#[async_trait]
impl OutcomePublisher for TracingOutcomePublisher {
    async fn publish(&self, event: OutcomeEvent) -> Result<(), DomainError> {
        let outcome = &event.outcome;
        let payload = event.to_json()?;
        if outcome.is_noteworthy() {
            tracing::info!(
                user_id = %event.user_id,
                reminder_type = %event.reminder_type,
                resolution = ?event.resolution,
                new_streak = outcome.new_streak,
                new_level = ?outcome.new_level,
                streak_broken = outcome.streak_broken,
                protection_used = outcome.protection_used,
                payload = %payload,
                "Streak changed"
            );
        } else {
            tracing::debug!(
                user_id = %event.user_id,
                reminder_type = %event.reminder_type,
                resolution = ?event.resolution,
                new_streak = outcome.new_streak,
                "Reminder cycle resolved, streak unchanged"
            );
        }
        Ok(())
    }
}
