//! ConfigureReminderHandler - Save a preference and apply it to the scheduler.

use std::sync::Arc;

use crate::application::errors::ReminderError;
use crate::application::scheduler::ReminderScheduler;
use crate::domain::foundation::{ReminderType, UserId};
use crate::domain::reminder::{parse_timezone, ReminderPreference, ScheduleState, TimeOfDay};
use crate::ports::PreferenceStore;

/// Command to create or replace a reminder preference.
///
/// Unset scheduling fields take the handler's defaults.
#[derive(Debug, Clone)]
pub struct ConfigureReminderCommand {
    pub user_id: String,
    pub reminder_type: String,
    pub enabled: bool,
    pub start_time: String,
    pub end_time: String,
    pub timezone: String,
    pub frequency_minutes: Option<u32>,
    pub random: Option<bool>,
    pub frequency_random_multiple: Option<f64>,
}

/// Result of configuring a reminder
#[derive(Debug, Clone)]
pub struct ConfigureReminderResult {
    pub preference: ReminderPreference,
    pub state: ScheduleState,
}

/// Handler for configuring reminders
pub struct ConfigureReminderHandler {
    preferences: Arc<dyn PreferenceStore>,
    scheduler: ReminderScheduler,
}

impl ConfigureReminderHandler {
    pub fn new(preferences: Arc<dyn PreferenceStore>, scheduler: ReminderScheduler) -> Self {
        Self {
            preferences,
            scheduler,
        }
    }

    pub async fn handle(
        &self,
        cmd: ConfigureReminderCommand,
    ) -> Result<ConfigureReminderResult, ReminderError> {
        let user_id = UserId::new(cmd.user_id)?;
        let reminder_type = ReminderType::new(cmd.reminder_type)?;
        let handler = self.scheduler.registry().require(&reminder_type)?;

        let previous = self.preferences.load(&user_id, &reminder_type).await?;

        let preference = ReminderPreference {
            user_id: user_id.clone(),
            reminder_type: reminder_type.clone(),
            enabled: cmd.enabled,
            start_time: TimeOfDay::parse("start_time", &cmd.start_time)?,
            end_time: TimeOfDay::parse("end_time", &cmd.end_time)?,
            timezone: parse_timezone(&cmd.timezone)?,
            frequency_minutes: cmd
                .frequency_minutes
                .unwrap_or_else(|| handler.default_frequency_minutes()),
            random: cmd.random.unwrap_or_else(|| handler.default_random()),
            frequency_random_multiple: cmd
                .frequency_random_multiple
                .unwrap_or_else(|| handler.default_random_multiple()),
            last_sent: previous.and_then(|p| p.last_sent),
        };
        preference.validate()?;

        self.preferences.save(&preference).await?;

        let state = if preference.enabled {
            self.scheduler.start_reminders(&user_id, &reminder_type).await?
        } else {
            self.scheduler.disable_reminders(&user_id, &reminder_type);
            ScheduleState::Idle
        };

        tracing::info!(
            user_id = %user_id,
            reminder_type = %reminder_type,
            enabled = preference.enabled,
            state = %state,
            "Reminder configured"
        );

        Ok(ConfigureReminderResult { preference, state })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{
        InMemoryActivityLog, InMemoryPreferenceStore, RecordingErrorSink, RecordingOutcomePublisher,
        ScriptedNotificationChannel, TokioClock,
    };
    use crate::application::handlers::WaterHandler;
    use crate::application::registry::HandlerRegistry;
    use crate::application::scheduler::SchedulerPorts;
    use crate::domain::foundation::ValidationError;
    use crate::domain::streak::StreakPolicy;
    use chrono::{TimeZone, Utc};

    fn setup() -> (ConfigureReminderHandler, Arc<InMemoryPreferenceStore>, ReminderScheduler) {
        let store = Arc::new(InMemoryPreferenceStore::new());
        let ports = SchedulerPorts {
            preferences: store.clone(),
            channel: Arc::new(ScriptedNotificationChannel::new()),
            activity_log: Arc::new(InMemoryActivityLog::new()),
            outcomes: Arc::new(RecordingOutcomePublisher::new()),
            errors: Arc::new(RecordingErrorSink::new()),
            // 03:00 UTC, before any window used below
            clock: Arc::new(TokioClock::starting_at(
                Utc.with_ymd_and_hms(2024, 6, 1, 3, 0, 0).unwrap(),
            )),
        };
        let registry = HandlerRegistry::new().with_handler(Arc::new(WaterHandler::new()));
        let scheduler = ReminderScheduler::with_seed(ports, registry, StreakPolicy::default(), 7);
        let handler = ConfigureReminderHandler::new(store.clone(), scheduler.clone());
        (handler, store, scheduler)
    }

    fn command() -> ConfigureReminderCommand {
        ConfigureReminderCommand {
            user_id: "u-1".to_string(),
            reminder_type: "Water".to_string(),
            enabled: true,
            start_time: "09:00".to_string(),
            end_time: "21:00".to_string(),
            timezone: "UTC".to_string(),
            frequency_minutes: None,
            random: None,
            frequency_random_multiple: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn enabled_preference_is_saved_and_armed() {
        let (handler, store, scheduler) = setup();

        let result = handler.handle(command()).await.unwrap();

        assert_eq!(result.state, ScheduleState::Armed);
        assert_eq!(result.preference.frequency_minutes, 60);
        assert!(result.preference.random);
        assert_eq!(result.preference.frequency_random_multiple, 1.5);
        assert_eq!(store.len().await, 1);
        assert_eq!(scheduler.active_keys().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn disabling_cancels_chain() {
        let (handler, _store, scheduler) = setup();
        handler.handle(command()).await.unwrap();

        let result = handler
            .handle(ConfigureReminderCommand {
                enabled: false,
                ..command()
            })
            .await
            .unwrap();

        assert_eq!(result.state, ScheduleState::Idle);
        assert!(scheduler.active_keys().is_empty());
    }

    #[tokio::test]
    async fn inverted_window_is_rejected_without_saving() {
        let (handler, store, _) = setup();

        let result = handler
            .handle(ConfigureReminderCommand {
                start_time: "22:00".to_string(),
                ..command()
            })
            .await;

        assert!(matches!(result, Err(ReminderError::Configuration(_))));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn unknown_timezone_is_rejected() {
        let (handler, _, _) = setup();

        let result = handler
            .handle(ConfigureReminderCommand {
                timezone: "Mars/Olympus_Mons".to_string(),
                ..command()
            })
            .await;

        assert!(matches!(
            result,
            Err(ReminderError::Configuration(ValidationError::UnknownTimezone(_)))
        ));
    }

    #[tokio::test]
    async fn unregistered_type_is_rejected() {
        let (handler, _, _) = setup();

        let result = handler
            .handle(ConfigureReminderCommand {
                reminder_type: "meditate".to_string(),
                ..command()
            })
            .await;

        assert!(matches!(result, Err(ReminderError::UnknownReminderType(_))));
    }

    #[tokio::test]
    async fn frequency_above_one_day_is_rejected() {
        let (handler, _, _) = setup();

        let result = handler
            .handle(ConfigureReminderCommand {
                frequency_minutes: Some(2000),
                ..command()
            })
            .await;

        assert!(matches!(
            result,
            Err(ReminderError::Configuration(ValidationError::OutOfRange { .. }))
        ));
    }
}
