//! Security event data structures
//!
//! Defines the events the session core records: authentication attempts,
//! lock transitions, and vault lifecycle changes. Entries never contain
//! passphrases, share codes, or key material; budget identifiers appear
//! only as 8-character previews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity;

/// Kinds of security events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityEvent {
    /// A new budget vault was created and persisted
    BudgetCreated,
    /// A shared budget was joined via share code
    BudgetJoined,
    /// Returning-owner login succeeded
    LoginSucceeded,
    /// Login failed (wrong password, no vault, corrupted data, timeout)
    LoginFailed,
    /// Pre-share-code vault detected and purged
    LegacyVaultPurged,
    /// Passphrase rotation re-encrypted the vault
    PasswordRotated,
    /// Passphrase rotation rejected or failed
    RotationFailed,
    /// Session locked (manual or inactivity)
    SessionLocked,
    /// Session logged out and cleared
    LoggedOut,
}

impl std::fmt::Display for SecurityEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SecurityEvent::BudgetCreated => "BUDGET_CREATED",
            SecurityEvent::BudgetJoined => "BUDGET_JOINED",
            SecurityEvent::LoginSucceeded => "LOGIN_SUCCEEDED",
            SecurityEvent::LoginFailed => "LOGIN_FAILED",
            SecurityEvent::LegacyVaultPurged => "LEGACY_VAULT_PURGED",
            SecurityEvent::PasswordRotated => "PASSWORD_ROTATED",
            SecurityEvent::RotationFailed => "ROTATION_FAILED",
            SecurityEvent::SessionLocked => "SESSION_LOCKED",
            SecurityEvent::LoggedOut => "LOGGED_OUT",
        };
        f.write_str(label)
    }
}

/// A single security log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityEntry {
    /// When the event occurred (UTC)
    pub timestamp: DateTime<Utc>,

    /// What happened
    pub event: SecurityEvent,

    /// Budget identifier preview (first 8 characters), when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_id: Option<String>,

    /// Non-sensitive detail, e.g. an error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl SecurityEntry {
    /// Create an entry stamped with the current time
    ///
    /// The budget id is stored as a preview, never in full.
    pub fn new(
        event: SecurityEvent,
        budget_id: Option<&str>,
        detail: Option<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
            budget_id: budget_id.map(identity::preview),
            detail,
        }
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.event
        );

        if let Some(id) = &self.budget_id {
            output.push_str(&format!(" ({})", id));
        }

        if let Some(detail) = &self.detail {
            output.push_str(&format!(": {}", detail));
        }

        output
    }
}
