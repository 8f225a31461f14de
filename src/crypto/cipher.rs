//! AES-256-GCM vault cipher
//!
//! Authenticated encryption for the vault blob. Each encryption call
//! generates a fresh random 12-byte IV; an IV is never reused with the same
//! key. Decryption failure on the authentication tag is the password
//! validation mechanism: there is no separate "is this the right key"
//! check anywhere in the crate.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::error::{VaultError, VaultResult};

use super::secure::VaultKey;

/// Size of the AES-GCM IV in bytes (96 bits)
pub const IV_SIZE: usize = 12;

/// Ciphertext plus the IV it was sealed with, both base64 encoded
///
/// The persisted envelope stores these fields alongside the salt; see
/// `vault::VaultEnvelope`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedPayload {
    /// The IV used for this encryption (base64 encoded)
    pub iv: String,
    /// The ciphertext with authentication tag (base64 encoded)
    pub ciphertext: String,
}

/// Encrypt plaintext bytes using AES-256-GCM
///
/// Generates a random IV for each call; the only side effect is randomness
/// consumption.
pub fn encrypt(plaintext: &[u8], key: &VaultKey) -> VaultResult<SealedPayload> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Encryption(format!("Failed to create cipher: {}", e)))?;

    let mut iv_bytes = [0u8; IV_SIZE];
    OsRng.fill_bytes(&mut iv_bytes);
    let nonce = Nonce::from_slice(&iv_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| VaultError::Encryption(format!("Encryption failed: {}", e)))?;

    Ok(SealedPayload {
        iv: BASE64.encode(iv_bytes),
        ciphertext: BASE64.encode(&ciphertext),
    })
}

/// Decrypt base64 ciphertext using AES-256-GCM
///
/// Fails with `InvalidPassword` when the authentication tag does not verify
/// (wrong key, wrong IV, or tampered bytes) and `CorruptedEnvelope` when the
/// inputs cannot even be decoded. Never returns unauthenticated plaintext.
pub fn decrypt(ciphertext_b64: &str, key: &VaultKey, iv_b64: &str) -> VaultResult<Vec<u8>> {
    let iv_bytes = BASE64
        .decode(iv_b64)
        .map_err(|e| VaultError::CorruptedEnvelope(format!("Invalid IV encoding: {}", e)))?;

    if iv_bytes.len() != IV_SIZE {
        return Err(VaultError::CorruptedEnvelope(format!(
            "Invalid IV size: expected {}, got {}",
            IV_SIZE,
            iv_bytes.len()
        )));
    }

    let ciphertext = BASE64.decode(ciphertext_b64).map_err(|e| {
        VaultError::CorruptedEnvelope(format!("Invalid ciphertext encoding: {}", e))
    })?;

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Encryption(format!("Failed to create cipher: {}", e)))?;

    let nonce = Nonce::from_slice(&iv_bytes);

    cipher
        .decrypt(nonce, ciphertext.as_ref())
        .map_err(|_| VaultError::InvalidPassword)
}
