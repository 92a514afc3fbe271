//! YAML File Preference Store Adapter
//!
//! Persists all preferences as a single YAML list on disk. Suited to
//! single-process deployments and seeding a local run.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

use crate::domain::foundation::{ReminderType, UserId};
use crate::domain::reminder::ReminderPreference;
use crate::ports::{PreferenceStore, PreferenceStoreError};

/// File-backed preference store
#[derive(Debug)]
pub struct YamlPreferenceStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl YamlPreferenceStore {
    /// Create a store backed by `path`. The file is created on first save.
    ///
    /// # Example
    /// ```ignore
    /// let store = YamlPreferenceStore::new("./data/preferences.yaml");
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<ReminderPreference>, PreferenceStoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let yaml = fs::read_to_string(&self.path)
            .await
            .map_err(|e| PreferenceStoreError::IoError(e.to_string()))?;
        if yaml.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_yaml::from_str(&yaml)
            .map_err(|e| PreferenceStoreError::DeserializationFailed(e.to_string()))
    }

    async fn write_all(&self, preferences: &[ReminderPreference]) -> Result<(), PreferenceStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| PreferenceStoreError::IoError(e.to_string()))?;
            }
        }

        let yaml = serde_yaml::to_string(preferences)
            .map_err(|e| PreferenceStoreError::SerializationFailed(e.to_string()))?;

        // Write beside the target and rename so readers never see a torn file
        let tmp = self.path.with_extension("yaml.tmp");
        fs::write(&tmp, yaml)
            .await
            .map_err(|e| PreferenceStoreError::IoError(e.to_string()))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| PreferenceStoreError::IoError(e.to_string()))
    }
}

#[async_trait]
impl PreferenceStore for YamlPreferenceStore {
    async fn load(
        &self,
        user_id: &UserId,
        reminder_type: &ReminderType,
    ) -> Result<Option<ReminderPreference>, PreferenceStoreError> {
        let all = self.read_all().await?;
        Ok(all
            .into_iter()
            .find(|p| &p.user_id == user_id && &p.reminder_type == reminder_type))
    }

    async fn save(&self, preference: &ReminderPreference) -> Result<(), PreferenceStoreError> {
        let _guard = self.write_lock.lock().await;
        let mut all = self.read_all().await?;

        match all.iter_mut().find(|p| p.key() == preference.key()) {
            Some(existing) => *existing = preference.clone(),
            None => all.push(preference.clone()),
        }

        self.write_all(&all).await
    }

    async fn list_enabled(&self) -> Result<Vec<ReminderPreference>, PreferenceStoreError> {
        Ok(self
            .read_all()
            .await?
            .into_iter()
            .filter(|p| p.enabled)
            .collect())
    }
}
