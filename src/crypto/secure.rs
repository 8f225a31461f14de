//! Secure memory handling for sensitive data
//!
//! Provides wrappers that zero their memory on drop so key material and
//! passphrases do not linger after lock or logout. Nothing in this module
//! ever appears in Debug or Display output.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of an AES-256 key in bytes
pub const KEY_LEN: usize = 32;

/// A derived symmetric encryption key
///
/// Holds the 32-byte AES-256-GCM key produced by key derivation. The bytes
/// are zeroized when the key is dropped, which is how `lock()` and
/// `logout()` guarantee key material does not survive in memory.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct VaultKey {
    key: [u8; KEY_LEN],
}

impl VaultKey {
    /// Wrap raw key bytes
    pub fn new(key: [u8; KEY_LEN]) -> Self {
        Self { key }
    }

    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }
}

// Never print key bytes
impl fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultKey").field("len", &KEY_LEN).finish()
    }
}

/// A passphrase that zeros its contents on drop
///
/// Owned copies of the user's passphrase (for example those moved into a
/// blocking key-derivation task) live in this wrapper instead of a plain
/// `String`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecurePassphrase {
    inner: String,
}

impl SecurePassphrase {
    /// Create a new SecurePassphrase
    pub fn new(s: impl Into<String>) -> Self {
        Self { inner: s.into() }
    }

    /// Get the passphrase contents
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Get the length in bytes
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl From<String> for SecurePassphrase {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecurePassphrase {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// Don't print the contents in Debug output
impl fmt::Debug for SecurePassphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurePassphrase")
            .field("len", &self.inner.len())
            .finish()
    }
}

// Don't print the contents in Display output
impl fmt::Display for SecurePassphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED {} bytes]", self.inner.len())
    }
}
