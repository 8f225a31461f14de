//! Session state
//!
//! The in-memory record of who is logged in and whether key material is
//! resident. Owned by `SessionManager`; nothing here is persisted.

use chrono::{DateTime, Utc};

use crate::crypto::VaultKey;
use crate::vault::UserProfile;

/// Lock state of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// No key resident; initial and terminal state
    Locked,
    /// A login or join is in flight
    Unlocking,
    /// Key resident, activity timer running
    Unlocked,
}

/// Internal mutable session state
///
/// The `epoch` increments on every lock and logout. An in-flight operation
/// snapshots the epoch when it starts and applies its result only if the
/// epoch is unchanged, so lock/logout always win over anything still
/// running.
#[derive(Debug)]
pub(crate) struct SessionState {
    pub phase: LockState,
    pub key: Option<VaultKey>,
    pub salt: Option<Vec<u8>>,
    pub current_user: Option<UserProfile>,
    pub budget_id: Option<String>,
    pub last_activity: Option<DateTime<Utc>>,
    pub epoch: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            phase: LockState::Locked,
            key: None,
            salt: None,
            current_user: None,
            budget_id: None,
            last_activity: None,
            epoch: 0,
        }
    }

    /// Drop key material and activity tracking, keeping identity fields
    ///
    /// Taking `key` out of the option drops the `VaultKey`, which zeroizes
    /// the bytes.
    pub fn purge_secrets(&mut self) {
        self.key = None;
        self.salt = None;
        self.last_activity = None;
        self.phase = LockState::Locked;
        self.epoch += 1;
    }

    /// Full clear: secrets and identity fields
    pub fn clear(&mut self) {
        self.purge_secrets();
        self.current_user = None;
        self.budget_id = None;
    }
}

/// Read-only view of the session for UI collaborators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: LockState,
    pub user_name: Option<String>,
    pub user_color: Option<String>,
    pub budget_id: Option<String>,
    pub last_activity: Option<DateTime<Utc>>,
}

impl SessionSnapshot {
    pub fn is_unlocked(&self) -> bool {
        self.state == LockState::Unlocked
    }
}
