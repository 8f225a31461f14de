//! Password validation against the persisted envelope
//!
//! A candidate passphrase is proven correct by attempting a real decryption
//! of the stored ciphertext: never by comparing against a cached flag or
//! hash. This module is the only authority for "is this the right
//! password"; no other code path may move a session to `Unlocked` without
//! going through it first.

use crate::crypto::{self, VaultKey};
use crate::error::VaultResult;
use crate::vault::{VaultDocument, VaultEnvelope};

/// Validate a passphrase against an envelope
///
/// Re-derives the key from the envelope's stored salt, attempts decryption,
/// and checks that the decrypted document carries the required budget id
/// and share code. Returns the derived key and document so a successful
/// login does not pay for a second PBKDF2 pass.
///
/// Errors: `CorruptedEnvelope` (malformed envelope), `InvalidPassword`
/// (authentication tag mismatch), `LegacyDataUnsupported` (decrypts but
/// lacks required fields).
pub fn validate_envelope(
    passphrase: &str,
    envelope: &VaultEnvelope,
) -> VaultResult<(VaultKey, VaultDocument)> {
    envelope.validate()?;

    let key = crypto::derive_from_salt(passphrase, &envelope.salt)?;
    let plaintext = crypto::decrypt(&envelope.encrypted_data, &key, &envelope.iv)?;

    let document = VaultDocument::from_plaintext(&plaintext)?;
    document.require_current_user()?;

    Ok((key, document))
}
