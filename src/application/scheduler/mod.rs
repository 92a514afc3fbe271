//! Reminder Scheduler - per-user, per-type reminder chains.
//!
//! Every enabled `(user, reminder type)` pair owns one chain: a tokio task
//! that sleeps until the next fire time, delivers through the registered
//! handler, applies the streak transition, and re-arms with jitter. Chains
//! never die on collaborator failures; those go to the error sink and the
//! chain keeps its cadence.
//!
//! Stopping is non-blocking. A chain caught mid-delivery finishes its
//! resolution write but never re-arms, and a chain started for the same key
//! meanwhile holds its first delivery until that write is done.

mod chain;
mod timers;

use timers::TimerTable;

use futures::future::join_all;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::errors::ReminderError;
use super::registry::HandlerRegistry;
use crate::domain::foundation::{DomainError, ReminderType, ScheduleKey, UserId};
use crate::domain::reminder::ScheduleState;
use crate::domain::streak::StreakPolicy;
use crate::ports::{ActivityLog, Clock, ErrorSink, NotificationChannel, OutcomePublisher, PreferenceStore};

/// Collaborators a scheduler drives.
#[derive(Clone)]
pub struct SchedulerPorts {
    pub preferences: Arc<dyn PreferenceStore>,
    pub channel: Arc<dyn NotificationChannel>,
    pub activity_log: Arc<dyn ActivityLog>,
    pub outcomes: Arc<dyn OutcomePublisher>,
    pub errors: Arc<dyn ErrorSink>,
    pub clock: Arc<dyn Clock>,
}

/// Tally of an `initialize_all` pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitializeSummary {
    pub started: usize,
    pub skipped: usize,
    pub failed: usize,
}

struct SchedulerInner {
    ports: SchedulerPorts,
    registry: HandlerRegistry,
    policy: StreakPolicy,
    timers: TimerTable,
    rng: Mutex<StdRng>,
    deliveries: AtomicU64,
}

impl SchedulerInner {
    fn report(&self, key: &ScheduleKey, err: &ReminderError) {
        tracing::warn!(key = %key, code = %err.code(), error = %err, "Reminder chain error");
        let error = DomainError::from(err)
            .with_detail("user_id", key.user_id.as_str())
            .with_detail("reminder_type", key.reminder_type.as_str());
        self.ports.errors.report(key, &error);
    }
}

/// Owns all reminder chains of one process.
#[derive(Clone)]
pub struct ReminderScheduler {
    inner: Arc<SchedulerInner>,
}

impl ReminderScheduler {
    pub fn new(ports: SchedulerPorts, registry: HandlerRegistry, policy: StreakPolicy) -> Self {
        Self::with_rng(ports, registry, policy, StdRng::from_entropy())
    }

    /// Deterministic jitter for tests and simulations.
    pub fn with_seed(
        ports: SchedulerPorts,
        registry: HandlerRegistry,
        policy: StreakPolicy,
        seed: u64,
    ) -> Self {
        Self::with_rng(ports, registry, policy, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        ports: SchedulerPorts,
        registry: HandlerRegistry,
        policy: StreakPolicy,
        rng: StdRng,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                ports,
                registry,
                policy,
                timers: TimerTable::new(),
                rng: Mutex::new(rng),
                deliveries: AtomicU64::new(0),
            }),
        }
    }

    pub fn policy(&self) -> &StreakPolicy {
        &self.inner.policy
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.inner.registry
    }

    /// Start (or restart) the chain for one user and reminder type.
    ///
    /// Returns `Delivering` when the window is open now, `Armed` when the
    /// chain waits for the next window start, and `Idle` when the
    /// preference is missing or disabled.
    pub async fn start_reminders(
        &self,
        user_id: &UserId,
        reminder_type: &ReminderType,
    ) -> Result<ScheduleState, ReminderError> {
        let key = ScheduleKey::new(user_id.clone(), reminder_type.clone());
        self.inner.registry.require(reminder_type)?;

        let preference = match self.inner.ports.preferences.load(user_id, reminder_type).await? {
            Some(preference) if preference.enabled => preference,
            _ => {
                self.inner.timers.cancel(&key, ScheduleState::Idle);
                tracing::info!(key = %key, "Reminders disabled, nothing to start");
                return Ok(ScheduleState::Idle);
            }
        };

        let window = preference.window()?;
        let now = self.inner.ports.clock.now();
        let (reported, first_wait) = if window.contains(now) {
            (ScheduleState::Delivering, Duration::ZERO)
        } else {
            (ScheduleState::Armed, window.wait_from(now))
        };

        let ticket = self.inner.timers.arm(&key, reported);
        let generation = ticket.generation;
        let task = tokio::spawn(chain::run(
            self.inner.clone(),
            key.clone(),
            ticket,
            first_wait,
        ));
        self.inner.timers.attach(&key, generation, task);

        tracing::info!(
            key = %key,
            state = %reported,
            wait_secs = first_wait.as_secs(),
            "Reminder chain started"
        );
        Ok(reported)
    }

    /// Cancel the chain for one user and reminder type.
    ///
    /// Idempotent and non-blocking. Returns true if a live chain was cancelled.
    pub fn stop_reminders(&self, user_id: &UserId, reminder_type: &ReminderType) -> bool {
        let key = ScheduleKey::new(user_id.clone(), reminder_type.clone());
        let cancelled = self.inner.timers.cancel(&key, ScheduleState::Stopped);
        if cancelled {
            tracing::info!(key = %key, "Reminder chain stopped");
        }
        cancelled
    }

    /// Cancel the chain because the user disabled reminders; the key goes `Idle`.
    pub fn disable_reminders(&self, user_id: &UserId, reminder_type: &ReminderType) -> bool {
        let key = ScheduleKey::new(user_id.clone(), reminder_type.clone());
        self.inner.timers.cancel(&key, ScheduleState::Idle)
    }

    /// Start a chain for every enabled preference.
    ///
    /// Failures for individual keys are reported and counted; only a failure
    /// to list preferences aborts the pass.
    pub async fn initialize_all(&self) -> Result<InitializeSummary, ReminderError> {
        let preferences = self.inner.ports.preferences.list_enabled().await?;
        tracing::info!(count = preferences.len(), "Initializing reminder chains");

        let starts = preferences.iter().map(|preference| async move {
            let key = preference.key();
            let result = self
                .start_reminders(&preference.user_id, &preference.reminder_type)
                .await;
            (key, result)
        });

        let mut summary = InitializeSummary::default();
        for (key, result) in join_all(starts).await {
            match result {
                Ok(ScheduleState::Idle) => summary.skipped += 1,
                Ok(_) => summary.started += 1,
                Err(err) => {
                    self.inner.report(&key, &err);
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            started = summary.started,
            skipped = summary.skipped,
            failed = summary.failed,
            "Reminder chains initialized"
        );
        Ok(summary)
    }

    pub fn state(&self, user_id: &UserId, reminder_type: &ReminderType) -> ScheduleState {
        let key = ScheduleKey::new(user_id.clone(), reminder_type.clone());
        self.inner.timers.state(&key)
    }

    /// Keys with a live chain, sorted.
    pub fn active_keys(&self) -> Vec<ScheduleKey> {
        self.inner.timers.active_keys()
    }

    /// Cancel every chain and give in-flight cycles `grace` to finish.
    pub async fn shutdown(&self, grace: Duration) {
        let tasks = self.inner.timers.cancel_all();
        if tasks.is_empty() {
            return;
        }
        tracing::info!(chains = tasks.len(), "Stopping reminder chains");

        let aborts: Vec<_> = tasks.iter().map(|task| task.abort_handle()).collect();
        if tokio::time::timeout(grace, join_all(tasks)).await.is_err() {
            tracing::warn!("Reminder chains did not finish in time, aborting");
            for abort in aborts {
                abort.abort();
            }
        }
    }
}

impl fmt::Debug for ReminderScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReminderScheduler")
            .field("registry", &self.inner.registry)
            .field("policy", &self.inner.policy)
            .field("active", &self.inner.timers.active_keys().len())
            .finish()
    }
}
