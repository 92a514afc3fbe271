//! Integration tests for reminder chains.
//!
//! These tests drive the scheduler end to end with in-memory adapters:
//! 1. Chains deliver inside the window and wait outside it
//! 2. Responses become streak transitions and outcome events
//! 3. Choice and ack for one message resolve exactly once
//! 4. Stop, disable, and restart never leave a second chain behind, and
//!    never overlap two deliveries for one key
//! 5. Collaborator failures are reported while the chain keeps running
//!
//! All tests run on paused tokio time; `TokioClock` keeps wall-clock window
//! checks in step with the virtual timers.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;

use habit_nudge::adapters::{
    InMemoryActivityLog, InMemoryPreferenceStore, RecordingErrorSink, RecordingOutcomePublisher,
    ScriptedNotificationChannel, ScriptedReply, TokioClock,
};
use habit_nudge::application::{
    HandlerRegistry, ReminderScheduler, SchedulerPorts, StretchHandler, WaterHandler,
};
use habit_nudge::domain::foundation::{ErrorCode, ReminderType, ScheduleKey, UserId};
use habit_nudge::domain::reminder::{ReminderPreference, ResolutionKind, ScheduleState};
use habit_nudge::domain::streak::StreakPolicy;
use habit_nudge::ports::PreferenceStore;

// =============================================================================
// Test Infrastructure
// =============================================================================

const MINUTE: Duration = Duration::from_secs(60);

struct Harness {
    scheduler: ReminderScheduler,
    preferences: Arc<InMemoryPreferenceStore>,
    channel: Arc<ScriptedNotificationChannel>,
    activity: Arc<InMemoryActivityLog>,
    outcomes: Arc<RecordingOutcomePublisher>,
    errors: Arc<RecordingErrorSink>,
}

impl Harness {
    /// Scheduler whose wall clock starts at `hh:mm` UTC on 2024-06-03.
    fn at(hour: u32, minute: u32) -> Self {
        Self::starting(Utc.with_ymd_and_hms(2024, 6, 3, hour, minute, 0).unwrap())
    }

    fn starting(anchor: DateTime<Utc>) -> Self {
        let preferences = Arc::new(InMemoryPreferenceStore::new());
        let channel = Arc::new(ScriptedNotificationChannel::new());
        let activity = Arc::new(InMemoryActivityLog::new());
        let outcomes = Arc::new(RecordingOutcomePublisher::new());
        let errors = Arc::new(RecordingErrorSink::new());

        let ports = SchedulerPorts {
            preferences: preferences.clone(),
            channel: channel.clone(),
            activity_log: activity.clone(),
            outcomes: outcomes.clone(),
            errors: errors.clone(),
            clock: Arc::new(TokioClock::starting_at(anchor)),
        };
        let registry = HandlerRegistry::new()
            .with_handler(Arc::new(WaterHandler::new()))
            .with_handler(Arc::new(StretchHandler::new()));
        let scheduler = ReminderScheduler::with_seed(ports, registry, StreakPolicy::default(), 42);

        Self {
            scheduler,
            preferences,
            channel,
            activity,
            outcomes,
            errors,
        }
    }

    async fn save(&self, preference: &ReminderPreference) {
        self.preferences.save(preference).await.unwrap();
    }

    async fn start(&self) -> ScheduleState {
        self.scheduler.start_reminders(&user(), &water()).await.unwrap()
    }

    fn reply(&self, reply: ScriptedReply) {
        self.channel.push_reply(&user(), reply);
    }

    fn sent(&self) -> usize {
        self.channel.sent_to(&user())
    }

    fn state(&self) -> ScheduleState {
        self.scheduler.state(&user(), &water())
    }

    async fn streak(&self) -> u32 {
        self.activity
            .streak(&key())
            .await
            .map(|r| r.current_streak)
            .unwrap_or(0)
    }
}

fn user() -> UserId {
    UserId::new("user-1").unwrap()
}

fn water() -> ReminderType {
    ReminderType::new("water").unwrap()
}

fn key() -> ScheduleKey {
    ScheduleKey::new(user(), water())
}

/// Hourly water reminder, 09:00-21:00 UTC, no jitter.
fn preference() -> ReminderPreference {
    ReminderPreference {
        user_id: user(),
        reminder_type: water(),
        enabled: true,
        start_time: "09:00".parse().unwrap(),
        end_time: "21:00".parse().unwrap(),
        timezone: chrono_tz::UTC,
        frequency_minutes: 60,
        random: false,
        frequency_random_multiple: 1.0,
        last_sent: None,
    }
}

async fn advance(duration: Duration) {
    tokio::time::sleep(duration).await;
}

// =============================================================================
// Window handling
// =============================================================================

#[tokio::test(start_paused = true)]
async fn delivers_immediately_inside_window() {
    let h = Harness::at(10, 0);
    h.save(&preference()).await;
    h.reply(ScriptedReply::choice("250ml", Duration::from_secs(30)));

    assert_eq!(h.start().await, ScheduleState::Delivering);
    assert_eq!(h.state(), ScheduleState::Delivering);
    advance(MINUTE).await;

    assert_eq!(h.sent(), 1);
    assert_eq!(h.state(), ScheduleState::Armed);
}

#[tokio::test(start_paused = true)]
async fn jittered_cadence_stays_within_multiplier() {
    let h = Harness::at(10, 0);
    h.save(&ReminderPreference {
        random: true,
        frequency_random_multiple: 1.5,
        ..preference()
    })
    .await;
    h.channel
        .set_fallback(&user(), ScriptedReply::choice("250ml", Duration::from_secs(1)));

    h.start().await;
    advance(MINUTE).await;
    assert_eq!(h.sent(), 1);

    // Next send lands between 60 and 90 minutes after the first resolved
    advance(59 * MINUTE).await;
    assert_eq!(h.sent(), 1);
    advance(31 * MINUTE).await;
    assert_eq!(h.sent(), 2);
}

#[tokio::test(start_paused = true)]
async fn waits_for_window_start() {
    let h = Harness::at(7, 30);
    h.save(&preference()).await;

    assert_eq!(h.start().await, ScheduleState::Armed);
    assert_eq!(h.state(), ScheduleState::Armed);

    advance(89 * MINUTE).await;
    assert_eq!(h.sent(), 0);

    advance(2 * MINUTE).await;
    assert_eq!(h.sent(), 1);
}

#[tokio::test(start_paused = true)]
async fn closed_window_defers_to_next_day() {
    let h = Harness::at(20, 30);
    h.save(&preference()).await;
    h.reply(ScriptedReply::choice("250ml", Duration::from_secs(1)));

    h.start().await;
    advance(62 * MINUTE).await;

    // Fire at 21:30 found the window closed
    assert_eq!(h.sent(), 1);
    assert_eq!(h.state(), ScheduleState::Armed);

    // Next window opens at 09:00, 11.5 hours after 21:30
    advance(11 * 60 * MINUTE).await;
    assert_eq!(h.sent(), 1);
    advance(40 * MINUTE).await;
    assert_eq!(h.sent(), 2);
}

#[tokio::test(start_paused = true)]
async fn keeps_hourly_cadence() {
    let h = Harness::at(10, 0);
    h.save(&preference()).await;
    h.channel
        .set_fallback(&user(), ScriptedReply::choice("500ml", Duration::from_secs(1)));

    h.start().await;
    advance(3 * 60 * MINUTE + MINUTE).await;

    // t=0, ~1h, ~2h, ~3h
    assert_eq!(h.sent(), 4);
    assert_eq!(h.streak().await, 4);
}

// =============================================================================
// Streaks and outcomes
// =============================================================================

#[tokio::test(start_paused = true)]
async fn quick_choice_extends_streak_and_logs_water() {
    let h = Harness::at(10, 0);
    h.save(&preference()).await;
    h.reply(ScriptedReply::choice("250ml", Duration::from_secs(60)));

    h.start().await;
    advance(2 * MINUTE).await;

    assert_eq!(h.streak().await, 1);
    let events = h.outcomes.events();
    assert_eq!(events.len(), 1);
    assert!(events[0].outcome.streak_increased);
    assert_eq!(
        events[0].resolution,
        ResolutionKind::Choice {
            choice: "250ml".to_string()
        }
    );

    let entries = h.activity.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].amount, 250.0);
}

#[tokio::test(start_paused = true)]
async fn silence_uses_protection_then_breaks() {
    let h = Harness::at(10, 0);
    h.save(&preference()).await;
    h.reply(ScriptedReply::ack(Duration::from_secs(10)));
    h.reply(ScriptedReply::Silence);
    h.reply(ScriptedReply::Silence);

    h.start().await;
    // Cycle 1 resolves at 10s, cycle 2 at ~60m + 30m, cycle 3 at ~150m + 30m
    advance(4 * 60 * MINUTE).await;

    let events = h.outcomes.events();
    assert_eq!(events.len(), 3);
    assert!(events[0].outcome.streak_increased);
    assert!(events[1].outcome.protection_used);
    assert_eq!(events[1].outcome.new_streak, 1);
    assert_eq!(events[2].resolution, ResolutionKind::TimedOut);
    assert!(events[2].outcome.streak_broken);
    assert_eq!(h.streak().await, 0);

    let record = h.activity.streak(&key()).await.unwrap();
    assert_eq!(record.protection_used_count, 1);
    assert_eq!(record.longest_streak, 1);
}

#[tokio::test(start_paused = true)]
async fn choice_and_ack_for_same_message_resolve_once() {
    let h = Harness::at(10, 0);
    h.save(&preference()).await;
    h.reply(ScriptedReply::Both {
        choice: "250ml".to_string(),
        choice_after: Duration::from_secs(20),
        ack_after: Duration::from_secs(20),
    });

    h.start().await;
    advance(5 * MINUTE).await;

    assert_eq!(h.outcomes.event_count(), 1);
    assert_eq!(h.activity.streak_save_count(), 1);
    assert_eq!(h.streak().await, 1);
}

#[tokio::test(start_paused = true)]
async fn ack_one_millisecond_after_choice_is_discarded() {
    let h = Harness::at(10, 0);
    h.save(&preference()).await;
    h.reply(ScriptedReply::Both {
        choice: "500ml".to_string(),
        choice_after: Duration::from_millis(20_000),
        ack_after: Duration::from_millis(20_001),
    });

    h.start().await;
    advance(5 * MINUTE).await;

    let events = h.outcomes.events();
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].resolution,
        ResolutionKind::Choice {
            choice: "500ml".to_string()
        }
    );
    assert_eq!(h.activity.streak_save_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn last_sent_is_recorded() {
    let h = Harness::at(10, 0);
    h.save(&preference()).await;
    h.reply(ScriptedReply::ack(Duration::from_secs(5)));

    h.start().await;
    advance(MINUTE).await;

    let stored = h.preferences.load(&user(), &water()).await.unwrap().unwrap();
    assert!(stored.last_sent.is_some());
    assert!(stored.enabled);
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test(start_paused = true)]
async fn stop_is_idempotent_and_prevents_delivery() {
    let h = Harness::at(5, 0);
    h.save(&preference()).await;
    h.start().await;

    assert!(h.scheduler.stop_reminders(&user(), &water()));
    assert!(!h.scheduler.stop_reminders(&user(), &water()));
    assert_eq!(h.state(), ScheduleState::Stopped);

    advance(5 * 60 * MINUTE).await;
    assert_eq!(h.sent(), 0);
    assert!(h.scheduler.active_keys().is_empty());
}

#[tokio::test(start_paused = true)]
async fn stop_for_unknown_key_is_a_no_op() {
    let h = Harness::at(10, 0);
    assert!(!h.scheduler.stop_reminders(&user(), &water()));
    assert_eq!(h.state(), ScheduleState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn stop_during_delivery_finishes_cycle_without_rearming() {
    let h = Harness::at(10, 0);
    h.save(&preference()).await;
    h.reply(ScriptedReply::choice("250ml", 2 * MINUTE));

    h.start().await;
    advance(MINUTE).await;
    assert_eq!(h.state(), ScheduleState::Delivering);

    h.scheduler.stop_reminders(&user(), &water());
    advance(3 * 60 * MINUTE).await;

    // The in-flight cycle still recorded its result
    assert_eq!(h.outcomes.event_count(), 1);
    assert_eq!(h.streak().await, 1);
    assert_eq!(h.sent(), 1);
    assert_eq!(h.state(), ScheduleState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn disabling_while_armed_ends_chain_at_next_fire() {
    let h = Harness::at(10, 0);
    h.save(&preference()).await;
    h.reply(ScriptedReply::choice("250ml", Duration::from_secs(1)));

    h.start().await;
    advance(MINUTE).await;
    assert_eq!(h.state(), ScheduleState::Armed);

    let mut disabled = h.preferences.load(&user(), &water()).await.unwrap().unwrap();
    disabled.enabled = false;
    h.save(&disabled).await;

    advance(2 * 60 * MINUTE).await;
    assert_eq!(h.sent(), 1);
    assert_eq!(h.state(), ScheduleState::Idle);
    assert!(h.scheduler.active_keys().is_empty());
}

#[tokio::test(start_paused = true)]
async fn restart_replaces_existing_chain() {
    let h = Harness::at(7, 0);
    h.save(&preference()).await;

    h.start().await;
    h.start().await;
    assert_eq!(h.scheduler.active_keys(), vec![key()]);

    advance(2 * 60 * MINUTE + MINUTE).await;
    assert_eq!(h.sent(), 1);
}

#[tokio::test(start_paused = true)]
async fn disabled_preference_starts_idle() {
    let h = Harness::at(10, 0);
    h.save(&ReminderPreference {
        enabled: false,
        ..preference()
    })
    .await;

    assert_eq!(h.start().await, ScheduleState::Idle);
    assert!(h.scheduler.active_keys().is_empty());
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_all_chains() {
    let h = Harness::at(5, 0);
    h.save(&preference()).await;
    h.start().await;

    h.scheduler.shutdown(Duration::from_secs(1)).await;

    assert!(h.scheduler.active_keys().is_empty());
    assert_eq!(h.state(), ScheduleState::Stopped);
    advance(5 * 60 * MINUTE).await;
    assert_eq!(h.sent(), 0);
}

#[tokio::test(start_paused = true)]
async fn restart_during_delivery_waits_for_pending_cycle() {
    let h = Harness::at(10, 0);
    h.save(&preference()).await;
    h.reply(ScriptedReply::choice("250ml", 20 * MINUTE));
    h.reply(ScriptedReply::choice("250ml", 20 * MINUTE));

    h.start().await;
    advance(MINUTE).await;
    assert_eq!(h.state(), ScheduleState::Delivering);

    assert_eq!(h.start().await, ScheduleState::Delivering);
    advance(MINUTE).await;
    assert_eq!(h.sent(), 1);
    assert_eq!(h.outcomes.event_count(), 0);

    // First cycle resolves at 10:20, then the new chain sends
    advance(20 * MINUTE).await;
    assert_eq!(h.outcomes.event_count(), 1);
    assert_eq!(h.activity.streak_save_count(), 1);
    assert_eq!(h.sent(), 2);

    advance(20 * MINUTE).await;
    assert_eq!(h.outcomes.event_count(), 2);
    assert_eq!(h.activity.streak_save_count(), 2);
    assert_eq!(h.scheduler.active_keys(), vec![key()]);
}

#[tokio::test(start_paused = true)]
async fn stop_then_start_during_delivery_keeps_sends_sequential() {
    let h = Harness::at(10, 0);
    h.save(&preference()).await;
    h.reply(ScriptedReply::choice("250ml", 10 * MINUTE));

    h.start().await;
    advance(MINUTE).await;
    h.scheduler.stop_reminders(&user(), &water());
    h.start().await;

    advance(8 * MINUTE).await;
    assert_eq!(h.sent(), 1);

    advance(2 * MINUTE).await;
    assert_eq!(h.outcomes.event_count(), 1);
    assert_eq!(h.sent(), 2);
}

// =============================================================================
// Initialization
// =============================================================================

#[tokio::test(start_paused = true)]
async fn initialize_all_starts_enabled_and_reports_unknown_types() {
    let h = Harness::at(7, 0);
    h.save(&preference()).await;
    h.save(&ReminderPreference {
        user_id: UserId::new("user-2").unwrap(),
        enabled: false,
        ..preference()
    })
    .await;
    h.save(&ReminderPreference {
        reminder_type: ReminderType::new("meditate").unwrap(),
        ..preference()
    })
    .await;

    let summary = h.scheduler.initialize_all().await.unwrap();

    assert_eq!(summary.started, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(h.errors.count_of(ErrorCode::UnknownReminderType), 1);
    assert_eq!(h.scheduler.active_keys(), vec![key()]);
}

#[tokio::test(start_paused = true)]
async fn initialize_all_fails_when_store_is_down() {
    let h = Harness::at(7, 0);
    h.preferences.set_unavailable(true);

    assert!(h.scheduler.initialize_all().await.is_err());
}

// =============================================================================
// Failure isolation
// =============================================================================

#[tokio::test(start_paused = true)]
async fn send_failure_is_reported_and_chain_continues() {
    let h = Harness::at(10, 0);
    h.save(&preference()).await;
    h.reply(ScriptedReply::Unreachable);
    h.reply(ScriptedReply::choice("250ml", Duration::from_secs(1)));

    h.start().await;
    advance(MINUTE).await;

    assert_eq!(h.errors.count_of(ErrorCode::RecipientUnreachable), 1);
    let events = h.outcomes.events();
    assert_eq!(events[0].resolution, ResolutionKind::DeliveryFailed);
    assert!(!events[0].outcome.streak_broken);

    advance(61 * MINUTE).await;
    assert_eq!(h.sent(), 1);
    assert_eq!(h.streak().await, 1);
}

#[tokio::test(start_paused = true)]
async fn storage_failure_is_reported_and_chain_continues() {
    let h = Harness::at(10, 0);
    h.save(&preference()).await;
    h.channel
        .set_fallback(&user(), ScriptedReply::choice("250ml", Duration::from_secs(1)));
    h.activity.fail_writes(true);

    h.start().await;
    advance(MINUTE).await;

    // Activity entry and streak save both failed
    assert_eq!(h.errors.count_of(ErrorCode::StorageError), 2);
    assert_eq!(h.outcomes.event_count(), 1);
    assert_eq!(h.state(), ScheduleState::Armed);

    h.activity.fail_writes(false);
    advance(61 * MINUTE).await;

    assert_eq!(h.sent(), 2);
    assert_eq!(h.streak().await, 1);
}

#[tokio::test(start_paused = true)]
async fn unreadable_streak_skips_only_that_update() {
    let h = Harness::at(10, 0);
    h.save(&preference()).await;
    h.channel
        .set_fallback(&user(), ScriptedReply::choice("250ml", Duration::from_secs(1)));
    h.activity.fail_reads(true);

    h.start().await;
    advance(MINUTE).await;

    assert_eq!(h.outcomes.event_count(), 0);
    assert_eq!(h.errors.count_of(ErrorCode::StorageError), 1);

    h.activity.fail_reads(false);
    advance(61 * MINUTE).await;
    assert_eq!(h.outcomes.event_count(), 1);
    assert_eq!(h.streak().await, 1);
}

#[tokio::test(start_paused = true)]
async fn preference_outage_at_fire_time_retries() {
    let h = Harness::at(8, 0);
    h.save(&preference()).await;
    h.start().await;

    h.preferences.set_unavailable(true);
    advance(61 * MINUTE).await;
    assert_eq!(h.sent(), 0);
    assert!(h.errors.count_of(ErrorCode::StorageError) >= 1);
    assert_eq!(h.state(), ScheduleState::Armed);

    h.preferences.set_unavailable(false);
    advance(61 * MINUTE).await;
    assert_eq!(h.sent(), 1);
}

#[tokio::test(start_paused = true)]
async fn publish_failure_does_not_stop_chain() {
    let h = Harness::at(10, 0);
    h.save(&preference()).await;
    h.channel
        .set_fallback(&user(), ScriptedReply::choice("250ml", Duration::from_secs(1)));
    h.outcomes.fail_publishes(true);

    h.start().await;
    advance(61 * MINUTE + MINUTE).await;

    assert_eq!(h.sent(), 2);
    assert_eq!(h.streak().await, 2);
    assert_eq!(h.errors.count_of(ErrorCode::InternalError), 2);
}
