//! Vault data model
//!
//! The persisted ciphertext envelope and the plaintext vault document it
//! seals. The document's budget contents (envelopes, bills, transactions)
//! are opaque to this crate: they round-trip as raw JSON values and unknown
//! top-level fields are preserved on re-encryption. The only fields this
//! core interprets are the current user's profile and the metadata block.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{VaultError, VaultResult};

/// Document format version written into new vaults
pub const VAULT_FORMAT_VERSION: &str = "2.0.0";

/// The persisted ciphertext envelope
///
/// The sole collaborator-visible persisted artifact of the crypto core:
/// base64 ciphertext and IV plus the salt the key was derived with. The
/// salt is deterministic and reusable; the IV is fresh per encryption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultEnvelope {
    /// Ciphertext with authentication tag (base64 encoded)
    pub encrypted_data: String,
    /// Key derivation salt (16 bytes password-mode, 32 bytes share-mode)
    pub salt: Vec<u8>,
    /// AES-GCM IV (base64 encoded)
    pub iv: String,
}

impl VaultEnvelope {
    /// Check that all required fields are present and non-empty
    pub fn validate(&self) -> VaultResult<()> {
        if self.encrypted_data.is_empty() {
            return Err(VaultError::CorruptedEnvelope(
                "Missing ciphertext".to_string(),
            ));
        }
        if self.salt.is_empty() {
            return Err(VaultError::CorruptedEnvelope("Missing salt".to_string()));
        }
        if self.iv.is_empty() {
            return Err(VaultError::CorruptedEnvelope("Missing IV".to_string()));
        }
        Ok(())
    }

    /// Parse an envelope from stored bytes
    ///
    /// Unparseable bytes are a corrupted envelope, not a serialization bug;
    /// the store may hold data written by an incompatible or damaged client.
    pub fn from_bytes(bytes: &[u8]) -> VaultResult<Self> {
        let envelope: VaultEnvelope = serde_json::from_slice(bytes)
            .map_err(|e| VaultError::CorruptedEnvelope(format!("Unparseable envelope: {}", e)))?;
        envelope.validate()?;
        Ok(envelope)
    }

    /// Serialize the envelope for storage
    pub fn to_bytes(&self) -> VaultResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Profile of the user attached to a vault
///
/// Lives both inside the encrypted document (as `currentUser`) and as the
/// separate lightweight plaintext profile record beside the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub user_name: String,

    #[serde(default)]
    pub user_color: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_code: Option<String>,

    /// How this user reached the budget ("shareCode" for joined members)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_via: Option<String>,

    /// Display name of the member who shared the budget
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_by: Option<String>,
}

impl UserProfile {
    /// User name with whitespace trimmed, falling back to "User"
    pub fn sanitized_name(&self) -> String {
        let trimmed = self.user_name.trim();
        if trimmed.is_empty() {
            "User".to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// Copy for the plaintext profile record stored beside the envelope
    ///
    /// The budget id stays inside the encrypted document only.
    pub fn as_record(&self) -> UserProfile {
        UserProfile {
            budget_id: None,
            ..self.clone()
        }
    }

    /// Whether the profile carries the fields the share-code system requires
    ///
    /// Vaults without a budget id and share code predate the share-code
    /// system and are never silently accepted.
    pub fn has_required_fields(&self) -> bool {
        let has_budget_id = self
            .budget_id
            .as_deref()
            .map(|id| !id.is_empty())
            .unwrap_or(false);
        let has_share_code = self
            .share_code
            .as_deref()
            .map(|code| !code.is_empty())
            .unwrap_or(false);
        has_budget_id && has_share_code
    }
}

/// Actual-balance record carried in the vault document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ActualBalance {
    /// Balance in cents
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub is_manual: bool,
}

/// Vault document metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultMetadata {
    #[serde(default)]
    pub version: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub last_modified: DateTime<Utc>,
    /// Marks vaults created under the share-code system
    #[serde(default)]
    pub share_code_system: bool,
}

impl Default for VaultMetadata {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            version: VAULT_FORMAT_VERSION.to_string(),
            created_at: now,
            last_modified: now,
            share_code_system: true,
        }
    }
}

/// The plaintext vault document
///
/// Everything the budgeting app stores, encrypted as one blob. The budget
/// collections are opaque JSON here; UI collaborators own their shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VaultDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user: Option<UserProfile>,

    #[serde(default)]
    pub envelopes: Vec<Value>,

    #[serde(default)]
    pub bills: Vec<Value>,

    #[serde(default)]
    pub transactions: Vec<Value>,

    #[serde(default)]
    pub actual_balance: ActualBalance,

    /// Unassigned cash in cents
    #[serde(default)]
    pub unassigned_cash: i64,

    #[serde(default)]
    pub metadata: VaultMetadata,

    /// Unknown top-level fields, preserved across re-encryption
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl VaultDocument {
    /// Build the initial empty document for a freshly created or joined budget
    pub fn new_budget(profile: UserProfile) -> Self {
        Self {
            current_user: Some(profile),
            ..Default::default()
        }
    }

    /// The current user, required-fields checked
    ///
    /// A document that decrypts but lacks a budget id or share code is
    /// legacy data and must never be accepted as a valid vault.
    pub fn require_current_user(&self) -> VaultResult<&UserProfile> {
        match &self.current_user {
            Some(user) if user.has_required_fields() => Ok(user),
            _ => Err(VaultError::LegacyDataUnsupported),
        }
    }

    /// Parse a decrypted plaintext blob
    ///
    /// The bytes already passed GCM authentication, so unparseable content
    /// means an incompatible (pre-share-code) client wrote it.
    pub fn from_plaintext(bytes: &[u8]) -> VaultResult<Self> {
        serde_json::from_slice(bytes).map_err(|_| VaultError::LegacyDataUnsupported)
    }

    /// Serialize for encryption, refreshing the last-modified stamp
    pub fn to_plaintext(&mut self) -> VaultResult<Vec<u8>> {
        self.metadata.last_modified = Utc::now();
        Ok(serde_json::to_vec(self)?)
    }
}
