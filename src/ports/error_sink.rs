//! Error Sink Port - out-of-band reporting of non-fatal failures.
//!
//! The scheduler never stops a reminder chain because of a storage or
//! delivery failure; it hands the failure to an error sink instead.

use crate::domain::foundation::{DomainError, ScheduleKey};

/// Receives failures that must not interrupt scheduling.
pub trait ErrorSink: Send + Sync {
    fn report(&self, key: &ScheduleKey, error: &DomainError);
}
