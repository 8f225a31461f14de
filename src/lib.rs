//! envelope-vault - Password-derived encryption core for envelope budgeting
//!
//! This library is the security-critical core of an envelope budgeting
//! application: it turns a user's passphrase (and, for shared budgets, a
//! human-readable share code) into deterministic cryptographic material,
//! encrypts the budget vault with AES-256-GCM, derives a stable
//! cross-device budget identifier, and manages the locked/unlocked session
//! lifecycle with safe password rotation.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types with stable error codes
//! - `crypto`: Key derivation (PBKDF2-HMAC-SHA256) and the vault cipher
//! - `share`: Share-code normalization, validation, and generation
//! - `identity`: Deterministic budget identifiers
//! - `vault`: The envelope and document data model
//! - `storage`: Key-value store collaborator (file-backed and in-memory)
//! - `session`: The session state machine and every vault operation
//! - `audit`: Append-only security event log
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use envelope_vault::session::{NewUserData, SessionManager};
//! use envelope_vault::storage::MemoryStore;
//!
//! let session = SessionManager::new(Arc::new(MemoryStore::new()));
//! let result = session.login("correct-horse", Some(NewUserData {
//!     user_name: "Kaylee".into(),
//!     user_color: None,
//!     share_code: Some("maple harbor cedar lantern".into()),
//! })).await?;
//! println!("budget id: {}", result.budget_id);
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod session;
pub mod share;
pub mod storage;
pub mod vault;

pub use error::{ErrorCode, VaultError, VaultResult};
pub use session::{JoinRequest, LoginSuccess, NewUserData, SessionManager};
