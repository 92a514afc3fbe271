//! In-Memory Preference Store Adapter
//!
//! Keeps reminder preferences in a map. Useful for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{ReminderType, ScheduleKey, UserId};
use crate::domain::reminder::ReminderPreference;
use crate::ports::{PreferenceStore, PreferenceStoreError};

/// In-memory storage for reminder preferences
#[derive(Debug, Clone, Default)]
pub struct InMemoryPreferenceStore {
    preferences: Arc<RwLock<HashMap<ScheduleKey, ReminderPreference>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryPreferenceStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with preferences
    pub fn with_preferences(preferences: impl IntoIterator<Item = ReminderPreference>) -> Self {
        let map = preferences.into_iter().map(|p| (p.key(), p)).collect();
        Self {
            preferences: Arc::new(RwLock::new(map)),
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Simulate an outage: every call fails while set.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Get the number of stored preferences
    pub async fn len(&self) -> usize {
        self.preferences.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.preferences.read().await.is_empty()
    }

    fn check_available(&self) -> Result<(), PreferenceStoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(PreferenceStoreError::Unavailable(
                "in-memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn load(
        &self,
        user_id: &UserId,
        reminder_type: &ReminderType,
    ) -> Result<Option<ReminderPreference>, PreferenceStoreError> {
        self.check_available()?;
        let key = ScheduleKey::new(user_id.clone(), reminder_type.clone());
        Ok(self.preferences.read().await.get(&key).cloned())
    }

    async fn save(&self, preference: &ReminderPreference) -> Result<(), PreferenceStoreError> {
        self.check_available()?;
        self.preferences
            .write()
            .await
            .insert(preference.key(), preference.clone());
        Ok(())
    }

    async fn list_enabled(&self) -> Result<Vec<ReminderPreference>, PreferenceStoreError> {
        self.check_available()?;
        let mut enabled: Vec<_> = self
            .preferences
            .read()
            .await
            .values()
            .filter(|p| p.enabled)
            .cloned()
            .collect();
        enabled.sort_by(|a, b| a.key().cmp(&b.key()));
        Ok(enabled)
    }
}
