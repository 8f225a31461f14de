//! File-backed key-value store with atomic writes
//!
//! One file per key inside a single directory. Writes go to a temp file
//! that is flushed, synced, and renamed into place, so a crash mid-write
//! never corrupts an existing record.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{VaultError, VaultResult};

use super::KeyValueStore;

/// Stores each key as a file under a base directory
#[derive(Debug, Clone)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `base_dir`, creating the directory if needed
    pub fn new(base_dir: impl Into<PathBuf>) -> VaultResult<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).map_err(|e| {
            VaultError::Storage(format!(
                "Failed to create store directory {}: {}",
                base_dir.display(),
                e
            ))
        })?;
        Ok(Self { base_dir })
    }

    /// The directory backing this store
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are identifiers like "envelopeBudgetData"; anything outside
        // a conservative character set is escaped to keep paths sane.
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.base_dir.join(format!("{}.json", file_name))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> VaultResult<Option<Vec<u8>>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        fs::read(&path)
            .map(Some)
            .map_err(|e| VaultError::Storage(format!("Failed to read {}: {}", path.display(), e)))
    }

    fn set(&self, key: &str, value: &[u8]) -> VaultResult<()> {
        let path = self.path_for(key);
        let temp_path = path.with_extension("json.tmp");

        let file = File::create(&temp_path).map_err(|e| {
            VaultError::StorageWriteFailed(format!("Failed to create temp file: {}", e))
        })?;

        let mut writer = BufWriter::new(file);
        writer
            .write_all(value)
            .map_err(|e| VaultError::StorageWriteFailed(format!("Failed to write data: {}", e)))?;

        writer
            .flush()
            .map_err(|e| VaultError::StorageWriteFailed(format!("Failed to flush data: {}", e)))?;

        // Sync to disk before rename
        writer.get_ref().sync_all().map_err(|e| {
            VaultError::StorageWriteFailed(format!("Failed to sync data: {}", e))
        })?;

        fs::rename(&temp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            VaultError::StorageWriteFailed(format!("Failed to rename temp file: {}", e))
        })?;

        Ok(())
    }

    fn remove(&self, key: &str) -> VaultResult<()> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(());
        }

        fs::remove_file(&path)
            .map_err(|e| VaultError::Storage(format!("Failed to remove {}: {}", path.display(), e)))
    }
}
