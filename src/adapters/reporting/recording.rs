//! Recording reporting adapters for test assertions.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::domain::foundation::{DomainError, ErrorCode, ScheduleKey};
use crate::ports::{ErrorSink, OutcomeEvent, OutcomePublisher};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Captures every published outcome.
#[derive(Debug, Default)]
pub struct RecordingOutcomePublisher {
    events: Mutex<Vec<OutcomeEvent>>,
    fail: AtomicBool,
}

impl RecordingOutcomePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `publish` fail (events are not recorded while set).
    pub fn fail_publishes(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<OutcomeEvent> {
        lock(&self.events).clone()
    }

    pub fn event_count(&self) -> usize {
        lock(&self.events).len()
    }
}

#[async_trait]
impl OutcomePublisher for RecordingOutcomePublisher {
    async fn publish(&self, event: OutcomeEvent) -> Result<(), DomainError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::InternalError,
                "Simulated publish failure",
            ));
        }
        lock(&self.events).push(event);
        Ok(())
    }
}

/// Captures every reported error.
#[derive(Debug, Default)]
pub struct RecordingErrorSink {
    errors: Mutex<Vec<(ScheduleKey, DomainError)>>,
}

impl RecordingErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> Vec<(ScheduleKey, DomainError)> {
        lock(&self.errors).clone()
    }

    /// Number of reported errors carrying `code`.
    pub fn count_of(&self, code: ErrorCode) -> usize {
        lock(&self.errors).iter().filter(|(_, e)| e.code == code).count()
    }
}

impl ErrorSink for RecordingErrorSink {
    fn report(&self, key: &ScheduleKey, error: &DomainError) {
        lock(&self.errors).push((key.clone(), error.clone()));
    }
}
