//! StretchHandler - movement breaks.

use async_trait::async_trait;

use crate::application::delivery::deliver_and_await;
use crate::application::errors::ReminderError;
use crate::application::registry::{DeliveryContext, DeliveryReport, ReminderHandler};
use crate::domain::foundation::ReminderType;
use crate::ports::{ActivityEntry, MessageSpec};

const DONE: &str = "done";

/// Stretch reminder: fixed 90 minute cadence, one "done" choice.
#[derive(Debug, Default)]
pub struct StretchHandler;

impl StretchHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn message(&self) -> MessageSpec {
        MessageSpec::new("Stand up and stretch for a minute.").with_choice(DONE, "Done")
    }
}

#[async_trait]
impl ReminderHandler for StretchHandler {
    fn reminder_type(&self) -> ReminderType {
        ReminderType::builtin("stretch")
    }

    fn default_frequency_minutes(&self) -> u32 {
        90
    }

    fn default_random(&self) -> bool {
        false
    }

    fn default_random_multiple(&self) -> f64 {
        1.0
    }

    async fn on_deliver(&self, ctx: &DeliveryContext) -> DeliveryReport {
        let mut report = deliver_and_await(ctx, &self.message()).await;

        if report.resolution.chosen() == Some(DONE) {
            let entry = ActivityEntry::new(ctx.user_id.clone(), "stretch", 1.0, "count");
            if let Err(err) = ctx.activity_log.record_activity(&entry).await {
                report.failures.push(ReminderError::ActivityLog(err));
            }
        }
        report
    }
}
