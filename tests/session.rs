//! End-to-end session scenarios
//!
//! Exercises the full login/join/rotate/lock lifecycle against the
//! in-memory store, including the failure paths: wrong passwords, legacy
//! vaults, storage write failures, timeouts, and lock/login races.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use envelope_vault::crypto;
use envelope_vault::error::VaultError;
use envelope_vault::session::{JoinRequest, NewUserData, SessionManager};
use envelope_vault::share;
use envelope_vault::storage::{KeyValueStore, MemoryStore, VAULT_DATA_KEY};
use envelope_vault::vault::UserProfile;
use envelope_vault::VaultResult;

const OWNER_PASS: &str = "correct-horse";
const SHARE_CODE: &str = "maple harbor cedar lantern";

fn owner_data() -> NewUserData {
    NewUserData {
        user_name: "Kaylee".to_string(),
        user_color: Some("#a855f7".to_string()),
        share_code: Some(SHARE_CODE.to_string()),
    }
}

/// Store wrapper that can be switched to reject writes
struct FlakyStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_writes: AtomicBool::new(false),
        }
    }

    fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> VaultResult<Option<Vec<u8>>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> VaultResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(VaultError::StorageWriteFailed("disk full".to_string()));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> VaultResult<()> {
        self.inner.remove(key)
    }
}

/// Store wrapper that delays reads, for timeout and race tests
struct SlowStore {
    inner: MemoryStore,
    read_delay: Duration,
}

impl SlowStore {
    fn new(read_delay: Duration) -> Self {
        Self {
            inner: MemoryStore::new(),
            read_delay,
        }
    }
}

impl KeyValueStore for SlowStore {
    fn get(&self, key: &str) -> VaultResult<Option<Vec<u8>>> {
        std::thread::sleep(self.read_delay);
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> VaultResult<()> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> VaultResult<()> {
        self.inner.remove(key)
    }
}

// --- scenario 1: new owner, cross-device determinism ---

#[tokio::test]
async fn new_owner_gets_stable_budget_id_across_devices() {
    let first_device = SessionManager::new(Arc::new(MemoryStore::new()));
    let success = first_device
        .login(OWNER_PASS, Some(owner_data()))
        .await
        .unwrap();

    assert_eq!(success.budget_id.len(), 23);
    assert!(success.budget_id.starts_with("budget_"));
    assert!(success.budget_id["budget_".len()..]
        .chars()
        .all(|c| c.is_ascii_hexdigit()));
    assert_eq!(first_device.current_budget_id(), Some(success.budget_id.clone()));

    // Same passphrase and share code on a second device yield the same id
    let second_device = SessionManager::new(Arc::new(MemoryStore::new()));
    let second = second_device
        .login(OWNER_PASS, Some(owner_data()))
        .await
        .unwrap();
    assert_eq!(second.budget_id, success.budget_id);

    // And the same key bytes
    let (key1, salt1) = crypto::derive_from_password(OWNER_PASS).unwrap();
    let (key2, salt2) = crypto::derive_from_password(OWNER_PASS).unwrap();
    assert_eq!(key1.as_bytes(), key2.as_bytes());
    assert_eq!(salt1, salt2);
}

// --- scenario 2: wrong password mutates nothing ---

#[tokio::test]
async fn wrong_password_leaves_envelope_byte_identical() {
    let store = Arc::new(MemoryStore::new());
    let session = SessionManager::new(Arc::clone(&store) as Arc<dyn KeyValueStore>);
    session.login(OWNER_PASS, Some(owner_data())).await.unwrap();
    session.logout();

    let before = store.get(VAULT_DATA_KEY).unwrap().unwrap();

    let err = session.login("wrong-horse", None).await.unwrap_err();
    assert!(matches!(err, VaultError::InvalidPassword));
    assert_eq!(err.code().as_str(), "InvalidPassword");
    assert!(err.suggestion().is_some());
    assert!(err.can_create_new());

    assert!(!session.is_unlocked());
    let after = store.get(VAULT_DATA_KEY).unwrap().unwrap();
    assert_eq!(before, after, "envelope changed during a failed login");
}

// --- scenario 3: join reaches the owner's budget id with a different key ---

#[tokio::test]
async fn join_matches_owner_budget_id_with_different_key() {
    let owner = SessionManager::new(Arc::new(MemoryStore::new()));
    let owner_login = owner.login(OWNER_PASS, Some(owner_data())).await.unwrap();

    let member = SessionManager::new(Arc::new(MemoryStore::new()));
    let join = member
        .join(
            "fresh-member-passphrase",
            JoinRequest {
                share_code: SHARE_CODE.to_string(),
                budget_id: owner_login.budget_id.clone(),
                user_name: "Alex".to_string(),
                user_color: None,
                shared_by: Some("Kaylee".to_string()),
            },
        )
        .await
        .unwrap();

    assert!(join.shared_budget);
    assert_eq!(join.budget_id, owner_login.budget_id);
    assert_eq!(member.current_budget_id(), owner.current_budget_id());

    // Different passphrase, share-derived salt: distinct key material
    let (owner_key, _) = crypto::derive_from_password(OWNER_PASS).unwrap();
    let member_key = crypto::derive_from_salt(
        "fresh-member-passphrase",
        &crypto::share_code_salt(&share::normalize(SHARE_CODE)),
    )
    .unwrap();
    assert_ne!(owner_key.as_bytes(), member_key.as_bytes());

    // The member can log back into their own vault later
    member.lock();
    let relogin = member.login("fresh-member-passphrase", None).await.unwrap();
    assert!(relogin.shared_budget);
    assert_eq!(relogin.budget_id, owner_login.budget_id);
}

#[tokio::test]
async fn join_rejects_bad_invitations() {
    let session = SessionManager::new(Arc::new(MemoryStore::new()));

    let err = session
        .join(
            "pass",
            JoinRequest {
                share_code: "not enough words".to_string(),
                budget_id: "budget_0123456789abcdef".to_string(),
                user_name: "Alex".to_string(),
                user_color: None,
                shared_by: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::InvalidShareCode(_)));

    let err = session
        .join(
            "pass",
            JoinRequest {
                share_code: SHARE_CODE.to_string(),
                budget_id: "   ".to_string(),
                user_name: "Alex".to_string(),
                user_color: None,
                shared_by: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::InvalidShareCode(_)));
    assert!(!session.is_unlocked());
}

// --- scenario 4: rotation ---

#[tokio::test]
async fn rotate_switches_the_accepted_passphrase() {
    let session = SessionManager::new(Arc::new(MemoryStore::new()));
    session.login(OWNER_PASS, Some(owner_data())).await.unwrap();

    session
        .rotate_password(OWNER_PASS, "brand-new-passphrase")
        .await
        .unwrap();
    session.logout();

    // Old passphrase no longer unlocks
    let err = session.login(OWNER_PASS, None).await.unwrap_err();
    assert!(matches!(err, VaultError::InvalidPassword));

    // New passphrase does
    let success = session.login("brand-new-passphrase", None).await.unwrap();
    assert_eq!(success.user.user_name, "Kaylee");
    assert!(session.is_unlocked());
}

#[tokio::test]
async fn rotate_with_wrong_old_passphrase_mutates_nothing() {
    let store = Arc::new(MemoryStore::new());
    let session = SessionManager::new(Arc::clone(&store) as Arc<dyn KeyValueStore>);
    session.login(OWNER_PASS, Some(owner_data())).await.unwrap();

    let before = store.get(VAULT_DATA_KEY).unwrap().unwrap();

    let err = session
        .rotate_password("wrong-horse", "brand-new-passphrase")
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::InvalidOldPassword));

    let after = store.get(VAULT_DATA_KEY).unwrap().unwrap();
    assert_eq!(before, after, "envelope changed during a rejected rotation");

    // The session key still decrypts: the original passphrase still works
    session.lock();
    assert!(session.login(OWNER_PASS, None).await.is_ok());
}

#[tokio::test]
async fn rotate_keeps_resident_key_usable() {
    let session = SessionManager::new(Arc::new(MemoryStore::new()));
    session.login(OWNER_PASS, Some(owner_data())).await.unwrap();

    session
        .rotate_password(OWNER_PASS, "brand-new-passphrase")
        .await
        .unwrap();

    // Still unlocked, and the swapped-in key matches the persisted envelope:
    // a profile update decrypts and re-encrypts with the resident key
    assert!(session.is_unlocked());
    session
        .update_profile(UserProfile {
            user_name: "Rotated".to_string(),
            user_color: "#22c55e".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    session.lock();
    let relogin = session.login("brand-new-passphrase", None).await.unwrap();
    assert_eq!(relogin.user.user_name, "Rotated");
}

// --- scenario 5: lock ---

#[tokio::test]
async fn lock_preserves_identity_but_blocks_key_use() {
    let session = SessionManager::new(Arc::new(MemoryStore::new()));
    let success = session.login(OWNER_PASS, Some(owner_data())).await.unwrap();

    session.lock();

    // Identity is readable for the "locked as X" UI
    assert_eq!(session.current_budget_id(), Some(success.budget_id));
    let snapshot = session.snapshot();
    assert_eq!(snapshot.user_name.as_deref(), Some("Kaylee"));
    assert!(!snapshot.is_unlocked());

    // Anything needing the key reports NotUnlocked instead of using stale
    // material
    let err = session
        .update_profile(UserProfile::default())
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::NotUnlocked));
}

// --- validate-before-mutate and legacy handling ---

#[tokio::test]
async fn validate_password_is_a_pure_check() {
    let store = Arc::new(MemoryStore::new());
    let session = SessionManager::new(Arc::clone(&store) as Arc<dyn KeyValueStore>);

    // Nothing stored yet: nothing to validate against
    assert!(!session.validate_password(OWNER_PASS).await);

    session.login(OWNER_PASS, Some(owner_data())).await.unwrap();
    session.logout();

    assert!(session.validate_password(OWNER_PASS).await);
    assert!(!session.validate_password("wrong-horse").await);
    assert!(!session.is_unlocked());
}

#[tokio::test]
async fn legacy_vault_is_purged_not_upgraded() {
    let store = Arc::new(MemoryStore::new());
    let session = SessionManager::new(Arc::clone(&store) as Arc<dyn KeyValueStore>);

    // Hand-craft a pre-share-code vault: decrypts fine, lacks the profile
    let (key, salt) = crypto::derive_from_password(OWNER_PASS).unwrap();
    let sealed = crypto::encrypt(br#"{"envelopes":[]}"#, &key).unwrap();
    let envelope = serde_json::json!({
        "encryptedData": sealed.ciphertext,
        "salt": salt,
        "iv": sealed.iv,
    });
    store
        .set(VAULT_DATA_KEY, envelope.to_string().as_bytes())
        .unwrap();

    let err = session.login(OWNER_PASS, None).await.unwrap_err();
    assert!(matches!(err, VaultError::LegacyDataUnsupported));
    assert!(!session.is_unlocked());

    // The unusable vault is gone; the next login can offer a fresh start
    assert!(store.get(VAULT_DATA_KEY).unwrap().is_none());
    let err = session.login(OWNER_PASS, None).await.unwrap_err();
    assert!(matches!(err, VaultError::NoVaultFound));
}

#[tokio::test]
async fn corrupted_envelope_is_reported() {
    let store = Arc::new(MemoryStore::new());
    let session = SessionManager::new(Arc::clone(&store) as Arc<dyn KeyValueStore>);

    store
        .set(VAULT_DATA_KEY, br#"{"salt":[1,2,3],"iv":"aGVsbG8="}"#)
        .unwrap();

    let err = session.login(OWNER_PASS, None).await.unwrap_err();
    assert!(matches!(err, VaultError::CorruptedEnvelope(_)));
    assert!(!session.is_unlocked());
}

// --- storage failures ---

#[tokio::test]
async fn failed_write_never_reports_unlocked() {
    let store = Arc::new(FlakyStore::new());
    let session = SessionManager::new(Arc::clone(&store) as Arc<dyn KeyValueStore>);

    store.fail_writes(true);
    let err = session
        .login(OWNER_PASS, Some(owner_data()))
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::StorageWriteFailed(_)));
    assert!(!session.is_unlocked());
    assert!(session.current_budget_id().is_none());

    // Once writes work again the same login succeeds
    store.fail_writes(false);
    session.login(OWNER_PASS, Some(owner_data())).await.unwrap();
    assert!(session.is_unlocked());
}

#[tokio::test]
async fn failed_rotation_write_keeps_old_envelope() {
    let store = Arc::new(FlakyStore::new());
    let session = SessionManager::new(Arc::clone(&store) as Arc<dyn KeyValueStore>);
    session.login(OWNER_PASS, Some(owner_data())).await.unwrap();

    let before = store.get(VAULT_DATA_KEY).unwrap().unwrap();

    store.fail_writes(true);
    let err = session
        .rotate_password(OWNER_PASS, "brand-new-passphrase")
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::StorageWriteFailed(_)));

    let after = store.get(VAULT_DATA_KEY).unwrap().unwrap();
    assert_eq!(before, after);

    // Old passphrase still owns the vault
    store.fail_writes(false);
    session.lock();
    assert!(session.login(OWNER_PASS, None).await.is_ok());
}

// --- timeout and abandonment ---

#[tokio::test]
async fn slow_operation_times_out_without_mutating() {
    let store = Arc::new(SlowStore::new(Duration::from_millis(500)));
    let session = SessionManager::new(Arc::clone(&store) as Arc<dyn KeyValueStore>)
        .with_timeout(Duration::from_millis(50));

    let err = session.login(OWNER_PASS, None).await.unwrap_err();
    assert!(matches!(err, VaultError::TimedOut { .. }));
    assert_eq!(err.code().as_str(), "TimedOut");
    assert!(!session.is_unlocked());
    assert!(session.current_budget_id().is_none());

    // Give the abandoned blocking task time to finish; it must not have
    // resurrected any state
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(!session.is_unlocked());
}

#[tokio::test]
async fn logout_during_login_always_wins() {
    let store = Arc::new(SlowStore::new(Duration::from_millis(300)));
    let session = Arc::new(SessionManager::new(
        Arc::clone(&store) as Arc<dyn KeyValueStore>
    ));

    // Seed a vault for the slow login to open, bypassing the session
    let (key, salt) = crypto::derive_from_password(OWNER_PASS).unwrap();
    let mut document =
        envelope_vault::vault::VaultDocument::new_budget(UserProfile {
            user_name: "Kaylee".to_string(),
            user_color: "#a855f7".to_string(),
            budget_id: Some("budget_0123456789abcdef".to_string()),
            share_code: Some(SHARE_CODE.to_string()),
            joined_via: None,
            shared_by: None,
        });
    let plaintext = document.to_plaintext().unwrap();
    let sealed = crypto::encrypt(&plaintext, &key).unwrap();
    let envelope = serde_json::json!({
        "encryptedData": sealed.ciphertext,
        "salt": salt,
        "iv": sealed.iv,
    });
    store
        .set(VAULT_DATA_KEY, envelope.to_string().as_bytes())
        .unwrap();

    let login_session = Arc::clone(&session);
    let login = tokio::spawn(async move { login_session.login(OWNER_PASS, None).await });

    // Let the login reach its slow storage read, then log out underneath it
    tokio::time::sleep(Duration::from_millis(50)).await;
    session.logout();

    let result = login.await.unwrap();
    assert!(result.is_err(), "abandoned login must not report success");
    assert!(!session.is_unlocked());
    assert!(session.current_budget_id().is_none());

    // And it stays locked even after the abandoned work finishes
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(!session.is_unlocked());
}

// --- serialization of mutating operations ---

#[tokio::test]
async fn concurrent_logins_serialize_cleanly() {
    let store = Arc::new(SlowStore::new(Duration::from_millis(50)));
    let session = Arc::new(SessionManager::new(
        Arc::clone(&store) as Arc<dyn KeyValueStore>
    ));

    let a = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.login(OWNER_PASS, Some(owner_data())).await })
    };
    let b = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.login(OWNER_PASS, None).await })
    };

    let results = [a.await.unwrap(), b.await.unwrap()];

    // Both ran to completion in some order; at least one unlocked the
    // session, and the persisted envelope is coherent
    assert!(results.iter().any(|r| r.is_ok()));
    assert!(session.is_unlocked());
    session.logout();
    assert!(session.login(OWNER_PASS, None).await.is_ok());
}
