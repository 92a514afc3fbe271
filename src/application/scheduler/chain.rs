//! The task driving one reminder chain.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::timers::ChainTicket;
use super::SchedulerInner;
use crate::application::errors::ReminderError;
use crate::application::registry::{DeliveryContext, ReminderHandler};
use crate::domain::foundation::{ScheduleKey, Timestamp};
use crate::domain::reminder::{ReminderPreference, Resolution, ScheduleState};
use crate::domain::streak::{advance, ReminderOutcome};
use crate::ports::OutcomeEvent;

/// Wait used when neither a preference nor a handler supplies a frequency.
const FALLBACK_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Slack on top of the response timeout for a superseded cycle's writes.
const PREDECESSOR_GRACE: Duration = Duration::from_secs(30);

/// Resolves once the chain is cancelled or its table entry is dropped.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        let is_cancelled = *rx.borrow_and_update();
        if is_cancelled || rx.changed().await.is_err() {
            return;
        }
    }
}

pub(super) async fn run(
    inner: Arc<SchedulerInner>,
    key: ScheduleKey,
    ticket: ChainTicket,
    first_wait: Duration,
) {
    let ChainTicket {
        generation,
        mut cancel,
        predecessor,
    } = ticket;
    let mut wait = first_wait;

    if let Some(predecessor) = predecessor {
        let deadline = Instant::now() + first_wait;
        await_predecessor(&inner, &key, predecessor).await;
        wait = deadline.saturating_duration_since(Instant::now());
    }

    loop {
        if !wait.is_zero() {
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = cancelled(&mut cancel) => {
                    tracing::debug!(key = %key, "Chain cancelled while armed");
                    return;
                }
            }
        }
        if !inner.timers.is_current(&key, generation) {
            return;
        }

        let preference = match load_enabled(&inner, &key).await {
            Ok(Some(preference)) => preference,
            Ok(None) => {
                tracing::info!(key = %key, "Reminders disabled, chain ends");
                inner.timers.release(&key, generation);
                return;
            }
            Err(err) => {
                inner.report(&key, &err);
                if !inner.timers.defer(&key, generation) {
                    return;
                }
                wait = fallback_interval(&inner, &key);
                continue;
            }
        };

        let window = match preference.window() {
            Ok(window) => window,
            Err(err) => {
                inner.report(&key, &ReminderError::Configuration(err));
                inner.timers.release(&key, generation);
                return;
            }
        };

        let now = inner.ports.clock.now();
        if !window.contains(now) {
            wait = window.wait_from(now);
            tracing::debug!(key = %key, wait_secs = wait.as_secs(), "Outside window, waiting");
            if !inner.timers.defer(&key, generation) {
                return;
            }
            continue;
        }

        if !inner.timers.advance(&key, generation, ScheduleState::Delivering) {
            return;
        }
        run_cycle(&inner, &key, generation).await;

        // A disable saved during the cycle takes effect before re-arming
        let next = match load_enabled(&inner, &key).await {
            Ok(Some(latest)) => latest,
            Ok(None) => {
                tracing::info!(key = %key, "Reminders disabled during delivery, chain ends");
                inner.timers.release(&key, generation);
                return;
            }
            Err(err) => {
                inner.report(&key, &err);
                preference
            }
        };

        if !inner.timers.advance(&key, generation, ScheduleState::Armed) {
            tracing::debug!(key = %key, "Chain stopped during delivery, not re-arming");
            return;
        }
        wait = next_delay(&inner, &key, &next);
        tracing::debug!(key = %key, wait_secs = wait.as_secs(), "Chain re-armed");
    }
}

/// Let the chain this one replaced finish its in-flight cycle.
///
/// A predecessor still running past the response timeout plus grace is
/// aborted so the key cannot stall.
async fn await_predecessor(inner: &SchedulerInner, key: &ScheduleKey, predecessor: JoinHandle<()>) {
    let abort = predecessor.abort_handle();
    let bound = Duration::from_millis(inner.policy.max_latency_ms) + PREDECESSOR_GRACE;
    tracing::debug!(key = %key, "Waiting for superseded chain to settle");
    if tokio::time::timeout(bound, predecessor).await.is_err() {
        tracing::warn!(key = %key, "Superseded chain did not settle in time, aborting it");
        abort.abort();
    }
}

/// One delivery: send, resolve, update streak, publish.
///
/// Runs to completion even if the chain is stopped meanwhile.
async fn run_cycle(inner: &SchedulerInner, key: &ScheduleKey, generation: u64) {
    let handler = match inner.registry.require(&key.reminder_type) {
        Ok(handler) => handler,
        Err(err) => {
            inner.report(key, &err);
            let _ = inner.timers.advance(key, generation, ScheduleState::Resolved);
            return;
        }
    };

    let ctx = DeliveryContext {
        user_id: key.user_id.clone(),
        reminder_type: key.reminder_type.clone(),
        channel: inner.ports.channel.clone(),
        activity_log: inner.ports.activity_log.clone(),
        policy: inner.policy,
        sequence: inner.deliveries.fetch_add(1, Ordering::Relaxed),
    };
    let sent_at = Timestamp::from(inner.ports.clock.now());

    let report = handler.on_deliver(&ctx).await;
    for failure in &report.failures {
        inner.report(key, failure);
    }
    let _ = inner.timers.advance(key, generation, ScheduleState::Resolved);

    apply_streak(inner, key, &report.resolution).await;
    record_last_sent(inner, key, sent_at).await;
}

async fn apply_streak(inner: &SchedulerInner, key: &ScheduleKey, resolution: &Resolution) {
    let activity = &inner.ports.activity_log;
    let record = match activity.load_streak(&key.user_id, &key.reminder_type).await {
        Ok(record) => record,
        Err(err) => {
            inner.report(key, &ReminderError::ActivityLog(err));
            return;
        }
    };

    let now = Timestamp::from(inner.ports.clock.now());
    let (next, change) = advance(&record, resolution.latency_ms, &inner.policy, now);
    tracing::info!(
        key = %key,
        latency_ms = resolution.latency_ms,
        change = ?change,
        streak = next.current_streak,
        level = %next.streak_level,
        "Streak updated"
    );

    if let Err(err) = activity
        .save_streak(&key.user_id, &key.reminder_type, &next)
        .await
    {
        inner.report(key, &ReminderError::ActivityLog(err));
    }

    let event = OutcomeEvent {
        user_id: key.user_id.clone(),
        reminder_type: key.reminder_type.clone(),
        resolution: resolution.kind.clone(),
        outcome: ReminderOutcome::from_transition(&next, &change),
        occurred_at: now,
    };
    if let Err(err) = inner.ports.outcomes.publish(event).await {
        inner.report(key, &ReminderError::Publish(err));
    }
}

/// Stamp `last_sent` on the latest stored preference.
async fn record_last_sent(inner: &SchedulerInner, key: &ScheduleKey, sent_at: Timestamp) {
    let store = &inner.ports.preferences;
    let result = match store.load(&key.user_id, &key.reminder_type).await {
        Ok(Some(mut latest)) => {
            latest.last_sent = Some(sent_at);
            store.save(&latest).await
        }
        Ok(None) => Ok(()),
        Err(err) => Err(err),
    };
    if let Err(err) = result {
        inner.report(key, &ReminderError::PreferenceStore(err));
    }
}

async fn load_enabled(
    inner: &SchedulerInner,
    key: &ScheduleKey,
) -> Result<Option<ReminderPreference>, ReminderError> {
    let preference = inner
        .ports
        .preferences
        .load(&key.user_id, &key.reminder_type)
        .await?;
    Ok(preference.filter(|p| p.enabled))
}

fn handler_for(inner: &SchedulerInner, key: &ScheduleKey) -> Option<Arc<dyn ReminderHandler>> {
    inner.registry.get(&key.reminder_type)
}

fn next_delay(inner: &SchedulerInner, key: &ScheduleKey, preference: &ReminderPreference) -> Duration {
    let fallback = handler_for(inner, key)
        .map(|handler| handler.default_frequency_minutes())
        .unwrap_or(60);
    let jitter = preference.jitter(fallback);
    let mut rng = inner
        .rng
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    jitter.next_delay(&mut *rng)
}

fn fallback_interval(inner: &SchedulerInner, key: &ScheduleKey) -> Duration {
    handler_for(inner, key)
        .map(|handler| Duration::from_secs(u64::from(handler.default_frequency_minutes()) * 60))
        .unwrap_or(FALLBACK_INTERVAL)
}
