//! Handler Registry - per-type reminder behavior.
//!
//! A handler owns everything that differs between reminder types: the
//! message it sends, the choices it offers, what a choice records, and the
//! defaults used when a preference leaves scheduling fields unset. The
//! scheduler only ever talks to handlers through [`ReminderHandler`].

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::errors::ReminderError;
use crate::domain::foundation::{ReminderType, UserId};
use crate::domain::reminder::Resolution;
use crate::domain::streak::StreakPolicy;
use crate::ports::{ActivityLog, NotificationChannel};

/// Everything a handler needs for one delivery.
#[derive(Clone)]
pub struct DeliveryContext {
    pub user_id: UserId,
    pub reminder_type: ReminderType,
    pub channel: Arc<dyn NotificationChannel>,
    pub activity_log: Arc<dyn ActivityLog>,
    pub policy: StreakPolicy,
    /// Number of deliveries made by this scheduler so far; handlers use it
    /// to rotate message text.
    pub sequence: u64,
}

impl fmt::Debug for DeliveryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryContext")
            .field("user_id", &self.user_id)
            .field("reminder_type", &self.reminder_type)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}

/// Result of one delivery: how it settled plus any non-fatal failures.
#[derive(Debug)]
pub struct DeliveryReport {
    pub resolution: Resolution,
    pub failures: Vec<ReminderError>,
}

impl DeliveryReport {
    pub fn resolved(resolution: Resolution) -> Self {
        Self {
            resolution,
            failures: Vec::new(),
        }
    }

    pub fn with_failure(mut self, failure: ReminderError) -> Self {
        self.failures.push(failure);
        self
    }
}

/// Behavior of one reminder type.
#[async_trait]
pub trait ReminderHandler: Send + Sync {
    fn reminder_type(&self) -> ReminderType;

    /// Interval used when a preference's frequency is unset.
    fn default_frequency_minutes(&self) -> u32;

    fn default_random(&self) -> bool;

    fn default_random_multiple(&self) -> f64;

    /// Send the reminder, wait for it to settle, and record side effects.
    ///
    /// Must always settle; failures belong in the report, not in a panic.
    async fn on_deliver(&self, ctx: &DeliveryContext) -> DeliveryReport;
}

/// Lookup from reminder type to handler.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<ReminderType, Arc<dyn ReminderHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous handler for its type.
    pub fn register(&mut self, handler: Arc<dyn ReminderHandler>) -> &mut Self {
        let reminder_type = handler.reminder_type();
        if self.handlers.insert(reminder_type.clone(), handler).is_some() {
            tracing::warn!(reminder_type = %reminder_type, "Replaced reminder handler");
        }
        self
    }

    pub fn with_handler(mut self, handler: Arc<dyn ReminderHandler>) -> Self {
        self.register(handler);
        self
    }

    pub fn get(&self, reminder_type: &ReminderType) -> Option<Arc<dyn ReminderHandler>> {
        self.handlers.get(reminder_type).cloned()
    }

    pub fn require(
        &self,
        reminder_type: &ReminderType,
    ) -> Result<Arc<dyn ReminderHandler>, ReminderError> {
        self.get(reminder_type)
            .ok_or_else(|| ReminderError::UnknownReminderType(reminder_type.clone()))
    }

    pub fn contains(&self, reminder_type: &ReminderType) -> bool {
        self.handlers.contains_key(reminder_type)
    }

    /// Registered types, sorted.
    pub fn reminder_types(&self) -> Vec<ReminderType> {
        let mut types: Vec<_> = self.handlers.keys().cloned().collect();
        types.sort();
        types
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("reminder_types", &self.reminder_types())
            .finish()
    }
}
