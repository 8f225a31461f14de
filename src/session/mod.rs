//! Session lifecycle for the budget vault
//!
//! `SessionManager` owns the in-memory key material and lock state and is
//! the only shared mutable resource in the crate. Mutating operations
//! (login, join, rotate, profile update) are serialized through an async
//! gate and bounded by an operation timeout; `lock()` and `logout()` are
//! synchronous, callable at any time, and always win: they bump the
//! session epoch so an in-flight operation that completes later finds the
//! epoch changed and discards its result instead of resurrecting key
//! material.
//!
//! No code path reaches `Unlocked` without the password validator proving
//! the passphrase against the persisted ciphertext first.

pub mod state;
pub mod validator;

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task;
use tokio::time;

use crate::audit::{SecurityEntry, SecurityEvent, SecurityLog};
use crate::crypto::{self, SecurePassphrase, VaultKey};
use crate::error::{VaultError, VaultResult};
use crate::identity;
use crate::share;
use crate::storage::{KeyValueStore, USER_PROFILE_KEY, VAULT_DATA_KEY};
use crate::vault::{UserProfile, VaultDocument, VaultEnvelope};

pub use state::{LockState, SessionSnapshot};

use state::SessionState;

/// Time bound on every login/join/rotate attempt
pub const OPERATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Color recorded for users who never picked one
const DEFAULT_USER_COLOR: &str = "#000000";

/// `joinedVia` marker for members who joined through a share code
const JOINED_VIA_SHARE_CODE: &str = "shareCode";

/// Data supplied when an owner creates a brand-new budget
#[derive(Debug, Clone)]
pub struct NewUserData {
    pub user_name: String,
    pub user_color: Option<String>,
    /// Required; its absence fails the login with `MissingShareCode`
    pub share_code: Option<String>,
}

/// Invitation data for joining an existing shared budget
///
/// The budget id comes from the invitation and is authoritative: it is
/// never recomputed on the joining side.
#[derive(Debug, Clone)]
pub struct JoinRequest {
    pub share_code: String,
    pub budget_id: String,
    pub user_name: String,
    pub user_color: Option<String>,
    pub shared_by: Option<String>,
}

/// Successful unlock result handed to UI collaborators
#[derive(Debug, Clone)]
pub struct LoginSuccess {
    pub budget_id: String,
    pub user: UserProfile,
    pub is_new_user: bool,
    pub shared_budget: bool,
    /// The decrypted vault document, ready for the rest of the app
    pub document: VaultDocument,
}

/// What a successful unlock produces before it is applied to the session
struct UnlockOutcome {
    key: VaultKey,
    salt: Vec<u8>,
    user: UserProfile,
    document: VaultDocument,
    event: SecurityEvent,
    is_new_user: bool,
    shared_budget: bool,
}

/// Owns session state and coordinates every vault operation
pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    security_log: Option<Arc<SecurityLog>>,
    state: Mutex<SessionState>,
    op_gate: AsyncMutex<()>,
    timeout: Duration,
}

impl SessionManager {
    /// Create a manager over a key-value store collaborator
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            security_log: None,
            state: Mutex::new(SessionState::new()),
            op_gate: AsyncMutex::new(()),
            timeout: OPERATION_TIMEOUT,
        }
    }

    /// Attach a security log; events are recorded best-effort
    pub fn with_security_log(mut self, log: SecurityLog) -> Self {
        self.security_log = Some(Arc::new(log));
        self
    }

    /// Override the operation timeout (tests use short bounds)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    // --- public operations ---

    /// Log in, either creating a new budget or unlocking an existing one
    ///
    /// With `new_user` data this is the owner-creates-a-budget path: key and
    /// salt derive from the passphrase, the budget id derives from
    /// passphrase + share code, and a fresh empty vault is persisted.
    /// Without it, the persisted envelope is loaded and the passphrase is
    /// validated against the real ciphertext before any state changes.
    pub async fn login(
        &self,
        passphrase: &str,
        new_user: Option<NewUserData>,
    ) -> VaultResult<LoginSuccess> {
        let _gate = self.op_gate.lock().await;
        let epoch = self.begin_unlock();

        let store = Arc::clone(&self.store);
        let pass = SecurePassphrase::new(passphrase);
        let work = task::spawn_blocking(move || match new_user {
            Some(data) => create_budget_work(store, pass, data),
            None => returning_login_work(store, pass),
        });

        self.finish_unlock("Login", epoch, work).await
    }

    /// Join an existing shared budget via share code
    ///
    /// The salt derives from the share code (not the passphrase) so every
    /// member reaches the same key space; the invitation's budget id is
    /// taken as-is.
    pub async fn join(&self, passphrase: &str, request: JoinRequest) -> VaultResult<LoginSuccess> {
        let _gate = self.op_gate.lock().await;
        let epoch = self.begin_unlock();

        let store = Arc::clone(&self.store);
        let pass = SecurePassphrase::new(passphrase);
        let work = task::spawn_blocking(move || join_work(store, pass, request));

        self.finish_unlock("Join", epoch, work).await
    }

    /// Re-encrypt the vault under a new passphrase
    ///
    /// The old passphrase must decrypt the current envelope
    /// (`InvalidOldPassword` otherwise, with zero mutation). The new
    /// envelope is persisted before the resident key is swapped, so the
    /// persisted state and the in-memory session never disagree.
    pub async fn rotate_password(&self, old: &str, new: &str) -> VaultResult<()> {
        let _gate = self.op_gate.lock().await;
        let epoch = self.current_epoch();

        let store = Arc::clone(&self.store);
        let old_pass = SecurePassphrase::new(old);
        let new_pass = SecurePassphrase::new(new);
        let work = task::spawn_blocking(move || rotate_work(store, old_pass, new_pass));

        let rotated = match time::timeout(self.timeout, work).await {
            Err(_) => {
                let err = VaultError::timed_out("Password rotation", self.timeout);
                self.record_event(
                    SecurityEvent::RotationFailed,
                    None,
                    Some(err.code().to_string()),
                );
                return Err(err);
            }
            Ok(Err(join_err)) => {
                return Err(VaultError::Encryption(format!(
                    "Rotation task failed: {}",
                    join_err
                )));
            }
            Ok(Ok(Err(err))) => {
                self.record_event(
                    SecurityEvent::RotationFailed,
                    None,
                    Some(err.code().to_string()),
                );
                return Err(err);
            }
            Ok(Ok(Ok(rotated))) => rotated,
        };

        let (new_key, new_salt) = rotated;
        let budget_id = {
            let mut state = self.state();
            // Swap the resident key only if nothing locked or logged out
            // while the rotation ran
            if state.epoch == epoch && state.phase == LockState::Unlocked {
                state.key = Some(new_key);
                state.salt = Some(new_salt);
            }
            state.budget_id.clone()
        };

        self.record_event(SecurityEvent::PasswordRotated, budget_id.as_deref(), None);
        Ok(())
    }

    /// Check a passphrase against the persisted envelope
    ///
    /// Attempts a real decryption; returns false on any failure. Never
    /// mutates session or storage.
    pub async fn validate_password(&self, passphrase: &str) -> bool {
        let store = Arc::clone(&self.store);
        let pass = SecurePassphrase::new(passphrase);

        let work = task::spawn_blocking(move || -> VaultResult<()> {
            let bytes = store.get(VAULT_DATA_KEY)?.ok_or(VaultError::NoVaultFound)?;
            let envelope = VaultEnvelope::from_bytes(&bytes)?;
            validator::validate_envelope(pass.as_str(), &envelope)?;
            Ok(())
        });

        matches!(work.await, Ok(Ok(())))
    }

    /// Update the user profile record and the vault's embedded copy
    ///
    /// Requires an unlocked session. Fields the caller leaves out
    /// (budget id, share code) are carried over from the current session so
    /// a partial update can never strip the vault of its required fields.
    pub async fn update_profile(&self, profile: UserProfile) -> VaultResult<()> {
        let _gate = self.op_gate.lock().await;

        let (key, salt, epoch, merged) = {
            let state = self.state();
            if state.phase != LockState::Unlocked {
                return Err(VaultError::NotUnlocked);
            }
            let key = state.key.clone().ok_or(VaultError::NotUnlocked)?;
            let salt = state.salt.clone().ok_or(VaultError::NotUnlocked)?;

            let mut merged = profile;
            if merged.budget_id.is_none() {
                merged.budget_id = state.budget_id.clone();
            }
            if merged.share_code.is_none() {
                merged.share_code = state
                    .current_user
                    .as_ref()
                    .and_then(|user| user.share_code.clone());
            }
            (key, salt, state.epoch, merged)
        };

        let store = Arc::clone(&self.store);
        let work_profile = merged.clone();
        let work =
            task::spawn_blocking(move || update_profile_work(store, key, salt, work_profile));

        match time::timeout(self.timeout, work).await {
            Err(_) => Err(VaultError::timed_out("Profile update", self.timeout)),
            Ok(Err(join_err)) => Err(VaultError::Encryption(format!(
                "Profile update task failed: {}",
                join_err
            ))),
            Ok(Ok(Err(err))) => Err(err),
            Ok(Ok(Ok(()))) => {
                let mut state = self.state();
                if state.epoch == epoch && state.phase == LockState::Unlocked {
                    state.budget_id = merged.budget_id.clone();
                    state.current_user = Some(merged);
                }
                Ok(())
            }
        }
    }

    /// Drop key material and clear the session entirely
    ///
    /// Always succeeds; safe to call at any time, including while a login
    /// is in flight (the login's eventual completion is discarded).
    pub fn logout(&self) {
        let budget_id = {
            let mut state = self.state();
            let id = state.budget_id.clone();
            state.clear();
            id
        };

        // Best effort; logout never reports failure
        let _ = self.store.remove(USER_PROFILE_KEY);

        self.record_event(SecurityEvent::LoggedOut, budget_id.as_deref(), None);
    }

    /// Drop key material but keep identity fields
    ///
    /// The UI can still show "locked as X" afterwards; any operation that
    /// needs the key fails with `NotUnlocked` until the next login.
    pub fn lock(&self) {
        let (was_unlocked, budget_id) = {
            let mut state = self.state();
            let was_unlocked = state.phase == LockState::Unlocked;
            state.purge_secrets();
            (was_unlocked, state.budget_id.clone())
        };

        if was_unlocked {
            self.record_event(SecurityEvent::SessionLocked, budget_id.as_deref(), None);
        }
    }

    /// Refresh the inactivity timestamp; no state change
    pub fn record_activity(&self) {
        let mut state = self.state();
        if state.phase == LockState::Unlocked {
            state.last_activity = Some(Utc::now());
        }
    }

    /// How long the unlocked session has been idle
    pub fn idle_for(&self) -> Option<Duration> {
        let state = self.state();
        let last = state.last_activity?;
        (Utc::now() - last).to_std().ok()
    }

    /// Lock when idle at least `max_idle`; returns whether it locked
    ///
    /// The decision of *when* to check belongs to an external timer; this
    /// is just the check-and-lock step.
    pub fn lock_if_idle(&self, max_idle: Duration) -> bool {
        match self.idle_for() {
            Some(idle) if idle >= max_idle => {
                self.lock();
                true
            }
            _ => false,
        }
    }

    // --- accessors ---

    /// Whether key material is resident
    pub fn is_unlocked(&self) -> bool {
        self.state().phase == LockState::Unlocked
    }

    /// Current lock state
    pub fn lock_state(&self) -> LockState {
        self.state().phase
    }

    /// The budget id of the current (possibly locked) session
    pub fn current_budget_id(&self) -> Option<String> {
        self.state().budget_id.clone()
    }

    /// The profile of the current (possibly locked) session
    pub fn current_user(&self) -> Option<UserProfile> {
        self.state().current_user.clone()
    }

    /// Read-only view for UI collaborators; never exposes key material
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state();
        SessionSnapshot {
            state: state.phase,
            user_name: state
                .current_user
                .as_ref()
                .map(|user| user.sanitized_name()),
            user_color: state
                .current_user
                .as_ref()
                .map(|user| user.user_color.clone()),
            budget_id: state.budget_id.clone(),
            last_activity: state.last_activity,
        }
    }

    // --- internals ---

    fn state(&self) -> MutexGuard<'_, SessionState> {
        // A poisoned lock only means another thread panicked mid-update;
        // the state itself is still a coherent value
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn current_epoch(&self) -> u64 {
        self.state().epoch
    }

    /// Mark the transient Unlocking phase and snapshot the epoch
    fn begin_unlock(&self) -> u64 {
        let mut state = self.state();
        if state.phase == LockState::Locked {
            state.phase = LockState::Unlocking;
        }
        state.epoch
    }

    /// Restore the Locked phase after a failed unlock attempt
    fn unlock_failed(&self, epoch: u64) {
        let mut state = self.state();
        if state.epoch == epoch && state.phase == LockState::Unlocking {
            state.phase = LockState::Locked;
        }
    }

    /// Await an unlock work task, enforcing the timeout and epoch rules
    async fn finish_unlock(
        &self,
        operation: &'static str,
        epoch: u64,
        work: task::JoinHandle<VaultResult<UnlockOutcome>>,
    ) -> VaultResult<LoginSuccess> {
        match time::timeout(self.timeout, work).await {
            Err(_) => {
                // The work task keeps running but its handle is gone; if it
                // ever finishes, the outcome is dropped and the key zeroized
                self.unlock_failed(epoch);
                let err = VaultError::timed_out(operation, self.timeout);
                self.record_event(
                    SecurityEvent::LoginFailed,
                    None,
                    Some(err.code().to_string()),
                );
                Err(err)
            }
            Ok(Err(join_err)) => {
                self.unlock_failed(epoch);
                Err(VaultError::Encryption(format!(
                    "{} task failed: {}",
                    operation, join_err
                )))
            }
            Ok(Ok(Err(err))) => {
                self.unlock_failed(epoch);
                if matches!(err, VaultError::LegacyDataUnsupported) {
                    self.record_event(SecurityEvent::LegacyVaultPurged, None, None);
                }
                self.record_event(
                    SecurityEvent::LoginFailed,
                    None,
                    Some(err.code().to_string()),
                );
                Err(err)
            }
            Ok(Ok(Ok(outcome))) => {
                let event = outcome.event;
                let success = self.apply_unlock(epoch, outcome)?;
                self.record_event(event, Some(&success.budget_id), None);
                Ok(success)
            }
        }
    }

    /// Move the session to Unlocked, unless lock/logout won the race
    fn apply_unlock(&self, epoch: u64, outcome: UnlockOutcome) -> VaultResult<LoginSuccess> {
        let mut state = self.state();
        if state.epoch != epoch {
            // Dropping the outcome zeroizes the abandoned key
            return Err(VaultError::NotUnlocked);
        }

        let budget_id = outcome.user.budget_id.clone().unwrap_or_default();

        state.key = Some(outcome.key);
        state.salt = Some(outcome.salt);
        state.current_user = Some(outcome.user.clone());
        state.budget_id = Some(budget_id.clone());
        state.phase = LockState::Unlocked;
        state.last_activity = Some(Utc::now());

        Ok(LoginSuccess {
            budget_id,
            user: outcome.user,
            is_new_user: outcome.is_new_user,
            shared_budget: outcome.shared_budget,
            document: outcome.document,
        })
    }

    fn record_event(&self, event: SecurityEvent, budget_id: Option<&str>, detail: Option<String>) {
        if let Some(log) = &self.security_log {
            let _ = log.log(&SecurityEntry::new(event, budget_id, detail));
        }
    }
}

// --- blocking work functions ---
//
// These run on the blocking pool, own every input they need, and touch the
// session only through their returned value. Abandoning one (timeout,
// lock/logout) therefore cannot leave partial session state behind.

fn create_budget_work(
    store: Arc<dyn KeyValueStore>,
    pass: SecurePassphrase,
    data: NewUserData,
) -> VaultResult<UnlockOutcome> {
    let share_code = data.share_code.ok_or(VaultError::MissingShareCode)?;
    let normalized = share::validate(&share_code)?;

    let (key, salt) = crypto::derive_from_password(pass.as_str())?;
    let budget_id = identity::generate_budget_id(pass.as_str(), &normalized)?;

    let mut profile = UserProfile {
        user_name: data.user_name,
        user_color: data
            .user_color
            .unwrap_or_else(|| DEFAULT_USER_COLOR.to_string()),
        budget_id: Some(budget_id),
        share_code: Some(normalized),
        joined_via: None,
        shared_by: None,
    };
    let sanitized = profile.sanitized_name();
    profile.user_name = sanitized;

    let mut document = VaultDocument::new_budget(profile.clone());
    seal_and_store(&store, &mut document, &key, &salt)?;
    store_profile_record(&store, &profile)?;

    Ok(UnlockOutcome {
        key,
        salt,
        user: profile,
        document,
        event: SecurityEvent::BudgetCreated,
        is_new_user: true,
        shared_budget: false,
    })
}

fn returning_login_work(
    store: Arc<dyn KeyValueStore>,
    pass: SecurePassphrase,
) -> VaultResult<UnlockOutcome> {
    let bytes = store.get(VAULT_DATA_KEY)?.ok_or(VaultError::NoVaultFound)?;
    let envelope = VaultEnvelope::from_bytes(&bytes)?;

    // Validate BEFORE touching any state. The validator is the only
    // authority on passphrase correctness.
    let (key, document) = match validator::validate_envelope(pass.as_str(), &envelope) {
        Ok(validated) => validated,
        Err(VaultError::LegacyDataUnsupported) => {
            // Pre-share-code data is purged, never silently upgraded
            store.remove(VAULT_DATA_KEY)?;
            return Err(VaultError::LegacyDataUnsupported);
        }
        Err(err) => return Err(err),
    };

    let mut user = document.require_current_user()?.clone();
    user.user_name = user.sanitized_name();
    let shared_budget = user.joined_via.as_deref() == Some(JOINED_VIA_SHARE_CODE);

    Ok(UnlockOutcome {
        key,
        salt: envelope.salt,
        user,
        document,
        event: SecurityEvent::LoginSucceeded,
        is_new_user: false,
        shared_budget,
    })
}

fn join_work(
    store: Arc<dyn KeyValueStore>,
    pass: SecurePassphrase,
    request: JoinRequest,
) -> VaultResult<UnlockOutcome> {
    let normalized = share::validate(&request.share_code)?;

    if request.budget_id.trim().is_empty() {
        return Err(VaultError::InvalidShareCode(
            "Invitation is missing its budget id".to_string(),
        ));
    }

    // Share-code-derived salt: every joining member reaches the same key
    // space without the key itself ever being transmitted
    let salt = crypto::share_code_salt(&normalized);
    let key = crypto::derive_from_salt(pass.as_str(), &salt)?;

    let user_name = {
        let trimmed = request.user_name.trim();
        if trimmed.is_empty() {
            "Shared User".to_string()
        } else {
            trimmed.to_string()
        }
    };

    let profile = UserProfile {
        user_name,
        user_color: request
            .user_color
            .unwrap_or_else(|| DEFAULT_USER_COLOR.to_string()),
        budget_id: Some(request.budget_id),
        share_code: Some(normalized),
        joined_via: Some(JOINED_VIA_SHARE_CODE.to_string()),
        shared_by: request.shared_by,
    };

    let mut document = VaultDocument::new_budget(profile.clone());
    seal_and_store(&store, &mut document, &key, &salt)?;
    store_profile_record(&store, &profile)?;

    Ok(UnlockOutcome {
        key,
        salt,
        user: profile,
        document,
        event: SecurityEvent::BudgetJoined,
        is_new_user: false,
        shared_budget: true,
    })
}

fn rotate_work(
    store: Arc<dyn KeyValueStore>,
    old_pass: SecurePassphrase,
    new_pass: SecurePassphrase,
) -> VaultResult<(VaultKey, Vec<u8>)> {
    let bytes = store.get(VAULT_DATA_KEY)?.ok_or(VaultError::NoVaultFound)?;
    let envelope = VaultEnvelope::from_bytes(&bytes)?;

    let old_key = crypto::derive_from_salt(old_pass.as_str(), &envelope.salt)
        .map_err(|_| VaultError::InvalidOldPassword)?;

    let plaintext = crypto::decrypt(&envelope.encrypted_data, &old_key, &envelope.iv).map_err(
        |err| match err {
            VaultError::InvalidPassword => VaultError::InvalidOldPassword,
            other => other,
        },
    )?;

    let (new_key, new_salt) = crypto::derive_from_password(new_pass.as_str())?;
    let sealed = crypto::encrypt(&plaintext, &new_key)?;

    let new_envelope = VaultEnvelope {
        encrypted_data: sealed.ciphertext,
        salt: new_salt.clone(),
        iv: sealed.iv,
    };
    store.set(VAULT_DATA_KEY, &new_envelope.to_bytes()?)?;

    Ok((new_key, new_salt))
}

fn update_profile_work(
    store: Arc<dyn KeyValueStore>,
    key: VaultKey,
    salt: Vec<u8>,
    profile: UserProfile,
) -> VaultResult<()> {
    store_profile_record(&store, &profile)?;

    if let Some(bytes) = store.get(VAULT_DATA_KEY)? {
        let envelope = VaultEnvelope::from_bytes(&bytes)?;
        let plaintext = crypto::decrypt(&envelope.encrypted_data, &key, &envelope.iv)?;
        let mut document = VaultDocument::from_plaintext(&plaintext)?;

        document.current_user = Some(profile);

        let updated = document.to_plaintext()?;
        let sealed = crypto::encrypt(&updated, &key)?;
        let new_envelope = VaultEnvelope {
            encrypted_data: sealed.ciphertext,
            salt,
            iv: sealed.iv,
        };
        store.set(VAULT_DATA_KEY, &new_envelope.to_bytes()?)?;
    }

    Ok(())
}

fn seal_and_store(
    store: &Arc<dyn KeyValueStore>,
    document: &mut VaultDocument,
    key: &VaultKey,
    salt: &[u8],
) -> VaultResult<()> {
    let plaintext = document.to_plaintext()?;
    let sealed = crypto::encrypt(&plaintext, key)?;
    let envelope = VaultEnvelope {
        encrypted_data: sealed.ciphertext,
        salt: salt.to_vec(),
        iv: sealed.iv,
    };
    store.set(VAULT_DATA_KEY, &envelope.to_bytes()?)
}

fn store_profile_record(
    store: &Arc<dyn KeyValueStore>,
    profile: &UserProfile,
) -> VaultResult<()> {
    let record = profile.as_record();
    store.set(USER_PROFILE_KEY, &serde_json::to_vec(&record)?)
}
