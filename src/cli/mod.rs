//! CLI command handlers
//!
//! Bridges clap argument parsing with the session layer.

pub mod vault;

pub use vault::{handle_vault_command, VaultCommands};
