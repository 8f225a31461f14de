//! Cryptographic core for envelope-vault
//!
//! Deterministic PBKDF2-HMAC-SHA256 key derivation plus AES-256-GCM
//! authenticated encryption for the budget vault blob.

pub mod cipher;
pub mod kdf;
pub mod secure;

pub use cipher::{decrypt, encrypt, SealedPayload, IV_SIZE};
pub use kdf::{
    derive_from_password, derive_from_salt, password_salt, share_code_salt, PBKDF2_ITERATIONS,
};
pub use secure::{SecurePassphrase, VaultKey};
