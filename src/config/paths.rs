//! Path management for envelope-vault
//!
//! Resolves where the encrypted store, settings, and security log live.
//!
//! ## Path Resolution Order
//!
//! 1. `ENVAULT_DATA_DIR` environment variable (if set)
//! 2. The platform config directory via `directories`
//!    (e.g. `~/.config/envelope-vault` on Linux)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::{VaultError, VaultResult};

/// Manages all paths used by envelope-vault
#[derive(Debug, Clone)]
pub struct VaultPaths {
    /// Base directory for all envelope-vault data
    base_dir: PathBuf,
}

impl VaultPaths {
    /// Create a new VaultPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> VaultResult<Self> {
        let base_dir = if let Ok(custom) = std::env::var("ENVAULT_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            let dirs = ProjectDirs::from("", "", "envelope-vault").ok_or_else(|| {
                VaultError::Storage("Could not determine config directory".to_string())
            })?;
            dirs.config_dir().to_path_buf()
        };

        Ok(Self { base_dir })
    }

    /// Create VaultPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Directory holding the key-value store files
    pub fn store_dir(&self) -> PathBuf {
        self.base_dir.join("store")
    }

    /// Path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Path to the security log
    pub fn security_log(&self) -> PathBuf {
        self.base_dir.join("security.log")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> VaultResult<()> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| VaultError::Storage(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.store_dir())
            .map_err(|e| VaultError::Storage(format!("Failed to create store directory: {}", e)))?;

        Ok(())
    }
}
