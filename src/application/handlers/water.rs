//! WaterHandler - hydration reminders.

use async_trait::async_trait;
use once_cell::sync::Lazy;

use crate::application::delivery::deliver_and_await;
use crate::application::errors::ReminderError;
use crate::application::registry::{DeliveryContext, DeliveryReport, ReminderHandler};
use crate::domain::foundation::ReminderType;
use crate::ports::{ActivityEntry, MessageSpec};

const REMINDER_TYPE: &str = "water";
const ACTIVITY_KIND: &str = "water";
const UNIT: &str = "ml";
const SKIP: &str = "skip";

static MESSAGES: &[&str] = &[
    "Time for some water.",
    "Quick hydration break?",
    "Your glass is waiting.",
    "A few sips now keeps the headache away.",
];

/// Choice id, label, and millilitres recorded.
static CHOICES: Lazy<Vec<(&'static str, &'static str, f64)>> = Lazy::new(|| {
    vec![
        ("250ml", "250 ml", 250.0),
        ("500ml", "500 ml", 500.0),
    ]
});

/// Hydration reminder: hourly with jitter, records the amount chosen.
#[derive(Debug, Default)]
pub struct WaterHandler;

impl WaterHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn message(&self, sequence: u64) -> MessageSpec {
        let text = MESSAGES[(sequence % MESSAGES.len() as u64) as usize];
        let spec = CHOICES
            .iter()
            .fold(MessageSpec::new(text), |spec, (id, label, _)| {
                spec.with_choice(*id, *label)
            });
        spec.with_choice(SKIP, "Skip")
    }

    /// Millilitres recorded for `choice`; `None` for skip or unknown ids.
    pub fn amount_for(choice: &str) -> Option<f64> {
        CHOICES
            .iter()
            .find(|(id, _, _)| *id == choice)
            .map(|(_, _, amount)| *amount)
    }
}

#[async_trait]
impl ReminderHandler for WaterHandler {
    fn reminder_type(&self) -> ReminderType {
        ReminderType::builtin(REMINDER_TYPE)
    }

    fn default_frequency_minutes(&self) -> u32 {
        60
    }

    fn default_random(&self) -> bool {
        true
    }

    fn default_random_multiple(&self) -> f64 {
        1.5
    }

    async fn on_deliver(&self, ctx: &DeliveryContext) -> DeliveryReport {
        let message = self.message(ctx.sequence);
        let mut report = deliver_and_await(ctx, &message).await;

        let Some(amount) = report.resolution.chosen().and_then(Self::amount_for) else {
            return report;
        };

        let entry = ActivityEntry::new(ctx.user_id.clone(), ACTIVITY_KIND, amount, UNIT);
        match ctx.activity_log.record_activity(&entry).await {
            Ok(()) => {
                tracing::info!(user_id = %ctx.user_id, amount_ml = amount, "Water intake logged");
            }
            Err(err) => report.failures.push(ReminderError::ActivityLog(err)),
        }
        report
    }
}
