//! Key derivation using PBKDF2-HMAC-SHA256
//!
//! Derives encryption keys from user passphrases. Both the salt and the key
//! are deterministic functions of their inputs: the same passphrase (and, in
//! share mode, the same share code) always yields the same key bytes on any
//! device. That determinism is the cross-device sync invariant: no hidden
//! randomness may ever be introduced here.
//!
//! The iteration count and hash are fixed constants shared by every call
//! site. Changing either is a breaking format change that would require
//! explicit envelope versioning; this engine does not handle that.

use hmac::Hmac;
use sha2::{Digest, Sha256};

use crate::error::{VaultError, VaultResult};

use super::secure::{VaultKey, KEY_LEN};

/// PBKDF2 iteration count, fixed by the on-disk format
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Length of a password-mode salt in bytes
pub const PASSWORD_SALT_LEN: usize = 16;

/// Length of a share-code-mode salt in bytes (a full SHA-256 digest)
pub const SHARE_SALT_LEN: usize = 32;

/// Fixed context string mixed into password-mode salt derivation
const PASSWORD_SALT_CONTEXT: &str = "envelope-vault-2024";

/// Derive the deterministic password-mode salt
///
/// The salt is the first 16 bytes of SHA-256(passphrase ++ context). This is
/// intentionally not a per-install random salt: both sides of a cross-device
/// sync must be able to reconstruct the key from the passphrase alone.
pub fn password_salt(passphrase: &str) -> VaultResult<Vec<u8>> {
    require_passphrase(passphrase)?;

    let mut hasher = Sha256::new();
    hasher.update(passphrase.as_bytes());
    hasher.update(PASSWORD_SALT_CONTEXT.as_bytes());
    let digest = hasher.finalize();

    Ok(digest[..PASSWORD_SALT_LEN].to_vec())
}

/// Derive the deterministic share-code-mode salt
///
/// The full SHA-256 digest of the normalized share code, used as-is. Callers
/// must normalize the code first (see `share::normalize`).
pub fn share_code_salt(normalized_code: &str) -> Vec<u8> {
    Sha256::digest(normalized_code.as_bytes()).to_vec()
}

/// Derive a key and its salt from a passphrase alone
///
/// Used on the "owner creates a new budget" path, where no salt exists yet.
pub fn derive_from_password(passphrase: &str) -> VaultResult<(VaultKey, Vec<u8>)> {
    let salt = password_salt(passphrase)?;
    let key = derive_from_salt(passphrase, &salt)?;
    Ok((key, salt))
}

/// Derive a key from a passphrase and a caller-supplied salt
///
/// Used to re-derive a key when the salt is already known: an existing
/// vault's stored salt, or a share-code-derived salt.
pub fn derive_from_salt(passphrase: &str, salt: &[u8]) -> VaultResult<VaultKey> {
    require_passphrase(passphrase)?;

    if salt.is_empty() {
        return Err(VaultError::Encryption("Empty salt".to_string()));
    }

    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2::<Hmac<Sha256>>(passphrase.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key)
        .map_err(|e| VaultError::Encryption(format!("Key derivation failed: {}", e)))?;

    Ok(VaultKey::new(key))
}

fn require_passphrase(passphrase: &str) -> VaultResult<()> {
    if passphrase.is_empty() {
        return Err(VaultError::InvalidPassphraseFormat(
            "Passphrase must not be empty".to_string(),
        ));
    }
    Ok(())
}
