//! Append-only security log
//!
//! Writes security entries to a log file as line-delimited JSON, one entry
//! per line, flushed immediately.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use crate::error::{VaultError, VaultResult};

use super::entry::SecurityEntry;

/// Handles writing security entries to the log file
pub struct SecurityLog {
    log_path: PathBuf,
}

impl SecurityLog {
    /// Create a log that writes to the specified path
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Append an entry as a JSON line, flushed immediately
    pub fn log(&self, entry: &SecurityEntry) -> VaultResult<()> {
        if let Some(parent) = self.log_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| VaultError::Storage(format!("Failed to create log dir: {}", e)))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| VaultError::Storage(format!("Failed to open security log: {}", e)))?;

        let json = serde_json::to_string(entry)?;

        writeln!(file, "{}", json)
            .map_err(|e| VaultError::Storage(format!("Failed to write security log: {}", e)))?;

        file.flush()
            .map_err(|e| VaultError::Storage(format!("Failed to flush security log: {}", e)))?;

        Ok(())
    }

    /// Read all entries in chronological order (oldest first)
    pub fn read_all(&self) -> VaultResult<Vec<SecurityEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| VaultError::Storage(format!("Failed to open security log: {}", e)))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                VaultError::Storage(format!(
                    "Failed to read security log line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: SecurityEntry = serde_json::from_str(&line).map_err(|e| {
                VaultError::Serialization(format!(
                    "Failed to parse security entry at line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            entries.push(entry);
        }

        Ok(entries)
    }

    /// Read the most recent N entries
    pub fn read_recent(&self, count: usize) -> VaultResult<Vec<SecurityEntry>> {
        let all_entries = self.read_all()?;
        let start = all_entries.len().saturating_sub(count);
        Ok(all_entries[start..].to_vec())
    }

    /// Check if the log file exists
    pub fn exists(&self) -> bool {
        self.log_path.exists()
    }

    /// The path of the log file
    pub fn path(&self) -> &PathBuf {
        &self.log_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::entry::SecurityEvent;
    use tempfile::TempDir;

    fn create_test_log() -> (SecurityLog, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let log = SecurityLog::new(temp_dir.path().join("security.log"));
        (log, temp_dir)
    }

    #[test]
    fn test_log_and_read() {
        let (log, _temp) = create_test_log();
        let entry = SecurityEntry::new(
            SecurityEvent::BudgetCreated,
            Some("budget_0123456789abcdef"),
            None,
        );

        log.log(&entry).unwrap();

        let entries = log.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event, SecurityEvent::BudgetCreated);
    }

    #[test]
    fn test_entries_append_in_order() {
        let (log, _temp) = create_test_log();

        for i in 0..5 {
            let entry = SecurityEntry::new(
                SecurityEvent::LoginFailed,
                None,
                Some(format!("attempt {}", i)),
            );
            log.log(&entry).unwrap();
        }

        let entries = log.read_all().unwrap();
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0].detail.as_deref(), Some("attempt 0"));
        assert_eq!(entries[4].detail.as_deref(), Some("attempt 4"));
    }

    #[test]
    fn test_read_recent() {
        let (log, _temp) = create_test_log();

        for i in 0..10 {
            let entry =
                SecurityEntry::new(SecurityEvent::SessionLocked, None, Some(format!("{}", i)));
            log.log(&entry).unwrap();
        }

        let recent = log.read_recent(3).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].detail.as_deref(), Some("7"));
        assert_eq!(recent[2].detail.as_deref(), Some("9"));
    }

    #[test]
    fn test_empty_log() {
        let (log, _temp) = create_test_log();
        assert!(!log.exists());
        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_survives_reopen() {
        let (log, temp) = create_test_log();
        let entry = SecurityEntry::new(SecurityEvent::LoggedOut, None, None);
        log.log(&entry).unwrap();

        let reopened = SecurityLog::new(temp.path().join("security.log"));
        let entries = reopened.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event, SecurityEvent::LoggedOut);
    }
}
