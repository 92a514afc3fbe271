//! In-Memory Activity Log Adapter
//!
//! Stores activity entries and streak records in memory, with switches
//! to simulate storage failures in tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{ReminderType, ScheduleKey, Timestamp, UserId};
use crate::domain::streak::StreakRecord;
use crate::ports::{ActivityEntry, ActivityLog, ActivityLogError};

/// In-memory activity log
#[derive(Debug, Clone, Default)]
pub struct InMemoryActivityLog {
    entries: Arc<RwLock<Vec<ActivityEntry>>>,
    streaks: Arc<RwLock<HashMap<ScheduleKey, StreakRecord>>>,
    streak_saves: Arc<AtomicUsize>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `load_streak` fail until cleared.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make `record_activity` and `save_streak` fail until cleared.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Seed a streak record directly.
    pub async fn put_streak(&self, key: ScheduleKey, record: StreakRecord) {
        self.streaks.write().await.insert(key, record);
    }

    /// Stored streak record, if any.
    pub async fn streak(&self, key: &ScheduleKey) -> Option<StreakRecord> {
        self.streaks.read().await.get(key).cloned()
    }

    /// All logged activity entries.
    pub async fn entries(&self) -> Vec<ActivityEntry> {
        self.entries.read().await.clone()
    }

    /// Number of successful `save_streak` calls.
    pub fn streak_save_count(&self) -> usize {
        self.streak_saves.load(Ordering::SeqCst)
    }

    fn storage_error(op: &str) -> ActivityLogError {
        ActivityLogError::Storage(format!("simulated {} failure", op))
    }
}

#[async_trait]
impl ActivityLog for InMemoryActivityLog {
    async fn record_activity(&self, entry: &ActivityEntry) -> Result<(), ActivityLogError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::storage_error("write"));
        }
        self.entries.write().await.push(entry.clone());
        Ok(())
    }

    async fn load_streak(
        &self,
        user_id: &UserId,
        reminder_type: &ReminderType,
    ) -> Result<StreakRecord, ActivityLogError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::storage_error("read"));
        }
        let key = ScheduleKey::new(user_id.clone(), reminder_type.clone());
        Ok(self
            .streaks
            .read()
            .await
            .get(&key)
            .cloned()
            .unwrap_or_else(|| StreakRecord::new(Timestamp::now())))
    }

    async fn save_streak(
        &self,
        user_id: &UserId,
        reminder_type: &ReminderType,
        record: &StreakRecord,
    ) -> Result<(), ActivityLogError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::storage_error("write"));
        }
        let key = ScheduleKey::new(user_id.clone(), reminder_type.clone());
        self.streaks.write().await.insert(key, record.clone());
        self.streak_saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
