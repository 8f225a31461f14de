//! User settings for envelope-vault
//!
//! Preferences consumed by the composition root: the inactivity auto-lock
//! window and whether security events are written to the log.

use serde::{Deserialize, Serialize};

use super::paths::VaultPaths;
use crate::error::{VaultError, VaultResult};

/// User settings for the vault core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Minutes of inactivity before the session auto-locks
    #[serde(default = "default_auto_lock_minutes")]
    pub auto_lock_minutes: u64,

    /// Whether security events are appended to the log file
    #[serde(default = "default_audit_enabled")]
    pub audit_enabled: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_auto_lock_minutes() -> u64 {
    30
}

fn default_audit_enabled() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            auto_lock_minutes: default_auto_lock_minutes(),
            audit_enabled: default_audit_enabled(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if absent
    pub fn load_or_create(paths: &VaultPaths) -> VaultResult<Self> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| VaultError::Storage(format!("Failed to read settings: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents)
                .map_err(|e| VaultError::Serialization(format!("Failed to parse settings: {}", e)))?;

            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &VaultPaths) -> VaultResult<()> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| VaultError::StorageWriteFailed(format!("Failed to write settings: {}", e)))?;

        Ok(())
    }

    /// The auto-lock window as a duration
    pub fn auto_lock_window(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.auto_lock_minutes * 60)
    }
}
