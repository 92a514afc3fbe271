//! Storage configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Where preferences live
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// YAML preference file; in-memory storage when unset
    pub preferences_file: Option<PathBuf>,
}

impl StorageConfig {
    /// Validate storage configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.preferences_file {
            Some(path) if path.as_os_str().is_empty() => Err(ValidationError::EmptyPreferencesPath),
            _ => Ok(()),
        }
    }
}
