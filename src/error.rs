//! Custom error types for envelope-vault
//!
//! This module defines the error hierarchy for the vault core using thiserror
//! for ergonomic error definitions. Every public operation surfaces one of
//! these errors rather than an opaque panic or a raw crypto/storage failure,
//! and each error carries a stable machine-readable code plus an optional
//! user-facing recovery suggestion.

use thiserror::Error;

/// The main error type for vault operations
#[derive(Error, Debug)]
pub enum VaultError {
    /// Passphrase is empty or otherwise unusable for key derivation
    #[error("Invalid passphrase: {0}")]
    InvalidPassphraseFormat(String),

    /// A share code was required but not supplied
    #[error("Share code missing from user data")]
    MissingShareCode,

    /// Share code does not match the expected four-word format
    #[error("Invalid share code: {0}")]
    InvalidShareCode(String),

    /// No persisted vault envelope exists
    #[error("No budget data found for this password")]
    NoVaultFound,

    /// Persisted envelope is missing fields or holds undecodable bytes
    #[error("Corrupted envelope: {0}")]
    CorruptedEnvelope(String),

    /// Decryption failed authentication (wrong password, wrong IV, or
    /// tampered ciphertext)
    #[error("This password doesn't match the existing budget")]
    InvalidPassword,

    /// Password rotation rejected because the current passphrase is wrong
    #[error("Current password is incorrect")]
    InvalidOldPassword,

    /// Vault decrypts but predates the share-code system; it is purged,
    /// never silently upgraded
    #[error("Legacy data cleared - please create a new budget")]
    LegacyDataUnsupported,

    /// Operation exceeded its time bound and was abandoned
    #[error("{operation} timed out after {seconds} seconds")]
    TimedOut {
        operation: &'static str,
        seconds: u64,
    },

    /// A storage write failed; in-memory state was not mutated
    #[error("Storage write failed: {0}")]
    StorageWriteFailed(String),

    /// Storage read or removal failure from the key-value collaborator
    #[error("Storage error: {0}")]
    Storage(String),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An operation that requires an unlocked session was called while locked
    #[error("Session is not unlocked")]
    NotUnlocked,

    /// Key derivation or cipher setup failure outside the normal
    /// wrong-password path
    #[error("Encryption error: {0}")]
    Encryption(String),
}

/// Stable machine-readable codes exposed to UI collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidPassphraseFormat,
    MissingShareCode,
    InvalidShareCode,
    NoVaultFound,
    CorruptedEnvelope,
    InvalidPassword,
    InvalidOldPassword,
    LegacyDataUnsupported,
    TimedOut,
    StorageWriteFailed,
    Storage,
    Serialization,
    NotUnlocked,
    Encryption,
}

impl ErrorCode {
    /// The code as a wire-stable string
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidPassphraseFormat => "InvalidPassphraseFormat",
            ErrorCode::MissingShareCode => "MissingShareCode",
            ErrorCode::InvalidShareCode => "InvalidShareCode",
            ErrorCode::NoVaultFound => "NoVaultFound",
            ErrorCode::CorruptedEnvelope => "CorruptedEnvelope",
            ErrorCode::InvalidPassword => "InvalidPassword",
            ErrorCode::InvalidOldPassword => "InvalidOldPassword",
            ErrorCode::LegacyDataUnsupported => "LegacyDataUnsupported",
            ErrorCode::TimedOut => "TimedOut",
            ErrorCode::StorageWriteFailed => "StorageWriteFailed",
            ErrorCode::Storage => "Storage",
            ErrorCode::Serialization => "Serialization",
            ErrorCode::NotUnlocked => "NotUnlocked",
            ErrorCode::Encryption => "Encryption",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl VaultError {
    /// The stable code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            VaultError::InvalidPassphraseFormat(_) => ErrorCode::InvalidPassphraseFormat,
            VaultError::MissingShareCode => ErrorCode::MissingShareCode,
            VaultError::InvalidShareCode(_) => ErrorCode::InvalidShareCode,
            VaultError::NoVaultFound => ErrorCode::NoVaultFound,
            VaultError::CorruptedEnvelope(_) => ErrorCode::CorruptedEnvelope,
            VaultError::InvalidPassword => ErrorCode::InvalidPassword,
            VaultError::InvalidOldPassword => ErrorCode::InvalidOldPassword,
            VaultError::LegacyDataUnsupported => ErrorCode::LegacyDataUnsupported,
            VaultError::TimedOut { .. } => ErrorCode::TimedOut,
            VaultError::StorageWriteFailed(_) => ErrorCode::StorageWriteFailed,
            VaultError::Storage(_) => ErrorCode::Storage,
            VaultError::Serialization(_) => ErrorCode::Serialization,
            VaultError::NotUnlocked => ErrorCode::NotUnlocked,
            VaultError::Encryption(_) => ErrorCode::Encryption,
        }
    }

    /// User-facing recovery suggestion, where one exists
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            VaultError::NoVaultFound => {
                Some("Would you like to start fresh with a new budget?")
            }
            VaultError::InvalidPassword => {
                Some("Would you like to create a new budget instead?")
            }
            VaultError::LegacyDataUnsupported | VaultError::CorruptedEnvelope(_) => {
                Some("Please clear data and start fresh")
            }
            _ => None,
        }
    }

    /// Whether the UI should offer a "create a new budget" path
    pub fn can_create_new(&self) -> bool {
        matches!(
            self,
            VaultError::NoVaultFound
                | VaultError::InvalidPassword
                | VaultError::LegacyDataUnsupported
        )
    }

    /// Check if this error means the stored vault is unusable
    pub fn is_unrecoverable_vault(&self) -> bool {
        matches!(
            self,
            VaultError::CorruptedEnvelope(_) | VaultError::LegacyDataUnsupported
        )
    }

    /// Construct the timeout error for a named operation
    pub fn timed_out(operation: &'static str, timeout: std::time::Duration) -> Self {
        VaultError::TimedOut {
            operation,
            seconds: timeout.as_secs(),
        }
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for VaultError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Result type alias for vault operations
pub type VaultResult<T> = Result<T, VaultError>;
