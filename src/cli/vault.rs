//! Vault CLI commands
//!
//! Bridges clap argument parsing with the session layer: create a budget,
//! unlock it, join a shared one, rotate the passphrase, and inspect status.
//! Passphrases come from a hidden prompt, or from environment variables for
//! scripted use.

use anyhow::{bail, Context, Result};
use clap::Subcommand;

use crate::config::{Settings, VaultPaths};
use crate::error::VaultError;
use crate::identity;
use crate::session::{JoinRequest, NewUserData, SessionManager};
use crate::share;
use crate::storage::{KeyValueStore, VAULT_DATA_KEY};

/// Vault management commands
#[derive(Subcommand)]
pub enum VaultCommands {
    /// Create a new encrypted budget
    Init {
        /// Your display name
        #[arg(short, long)]
        name: Option<String>,

        /// Your display color (hex)
        #[arg(long)]
        color: Option<String>,

        /// Share code to use; a fresh one is generated when omitted
        #[arg(long)]
        share_code: Option<String>,
    },

    /// Unlock the existing budget with your passphrase
    Unlock,

    /// Join a shared budget with a share code and invitation budget id
    Join {
        /// The four-word share code from the invitation
        share_code: String,

        /// The budget id from the invitation
        budget_id: String,

        /// Your display name
        #[arg(short, long)]
        name: Option<String>,

        /// Who shared the budget with you
        #[arg(long)]
        shared_by: Option<String>,
    },

    /// Change your passphrase, re-encrypting the vault
    #[command(alias = "change")]
    Rotate {
        /// New passphrase (prompted when omitted)
        #[arg(long, env = "ENVAULT_NEW_PASSPHRASE", hide_env_values = true)]
        new_passphrase: Option<String>,
    },

    /// Show vault status and recent security events
    Status,
}

/// Handle a vault command
pub async fn handle_vault_command(
    session: &SessionManager,
    paths: &VaultPaths,
    settings: &Settings,
    cmd: VaultCommands,
    passphrase: Option<String>,
) -> Result<()> {
    match cmd {
        VaultCommands::Init {
            name,
            color,
            share_code,
        } => init_budget(session, name, color, share_code, passphrase).await,
        VaultCommands::Unlock => unlock_budget(session, passphrase).await,
        VaultCommands::Join {
            share_code,
            budget_id,
            name,
            shared_by,
        } => join_budget(session, share_code, budget_id, name, shared_by, passphrase).await,
        VaultCommands::Rotate { new_passphrase } => {
            rotate_passphrase(session, passphrase, new_passphrase).await
        }
        VaultCommands::Status => show_status(session, paths, settings),
    }
}

/// Create a new budget vault
async fn init_budget(
    session: &SessionManager,
    name: Option<String>,
    color: Option<String>,
    share_code: Option<String>,
    passphrase: Option<String>,
) -> Result<()> {
    let share_code = match share_code {
        Some(code) => share::validate(&code).context("Share code rejected")?,
        None => share::generate(),
    };

    let passphrase = resolve_passphrase(passphrase, "Enter new passphrase: ", true)?;

    let result = session
        .login(
            &passphrase,
            Some(NewUserData {
                user_name: name.unwrap_or_default(),
                user_color: color,
                share_code: Some(share_code.clone()),
            }),
        )
        .await;

    match result {
        Ok(success) => {
            println!("Budget created.");
            println!();
            println!("Budget id:  {}", success.budget_id);
            println!("Share code: {}", share_code);
            println!();
            println!("Anyone with this share code AND the budget id can join your");
            println!("budget once you tell them your passphrase scheme. Keep both safe.");
            println!();
            println!("IMPORTANT: If you forget your passphrase, your data cannot be recovered!");
            Ok(())
        }
        Err(err) => fail_with_suggestion(err),
    }
}

/// Unlock the existing budget
async fn unlock_budget(session: &SessionManager, passphrase: Option<String>) -> Result<()> {
    let passphrase = resolve_passphrase(passphrase, "Enter passphrase: ", false)?;

    match session.login(&passphrase, None).await {
        Ok(success) => {
            println!("Vault unlocked.");
            println!();
            println!("Budget id: {}", success.budget_id);
            println!("User:      {}", success.user.sanitized_name());
            if success.shared_budget {
                println!("Shared:    yes");
            }
            println!(
                "Contents:  {} envelopes, {} bills, {} transactions",
                success.document.envelopes.len(),
                success.document.bills.len(),
                success.document.transactions.len()
            );
            Ok(())
        }
        Err(err) => fail_with_suggestion(err),
    }
}

/// Join a shared budget
async fn join_budget(
    session: &SessionManager,
    share_code: String,
    budget_id: String,
    name: Option<String>,
    shared_by: Option<String>,
    passphrase: Option<String>,
) -> Result<()> {
    let passphrase = resolve_passphrase(passphrase, "Choose your passphrase: ", true)?;

    let request = JoinRequest {
        share_code,
        budget_id,
        user_name: name.unwrap_or_default(),
        user_color: None,
        shared_by,
    };

    match session.join(&passphrase, request).await {
        Ok(success) => {
            println!("Joined shared budget.");
            println!();
            println!("Budget id: {}", success.budget_id);
            println!("User:      {}", success.user.sanitized_name());
            if let Some(shared_by) = &success.user.shared_by {
                println!("Shared by: {}", shared_by);
            }
            Ok(())
        }
        Err(err) => fail_with_suggestion(err),
    }
}

/// Rotate the vault passphrase
async fn rotate_passphrase(
    session: &SessionManager,
    old_passphrase: Option<String>,
    new_passphrase: Option<String>,
) -> Result<()> {
    let old = resolve_passphrase(old_passphrase, "Enter current passphrase: ", false)?;
    let new = resolve_passphrase(new_passphrase, "Enter new passphrase: ", true)?;

    match session.rotate_password(&old, &new).await {
        Ok(()) => {
            println!("Passphrase changed.");
            println!("The vault has been re-encrypted with your new passphrase.");
            Ok(())
        }
        Err(err) => fail_with_suggestion(err),
    }
}

/// Show vault status
fn show_status(session: &SessionManager, paths: &VaultPaths, settings: &Settings) -> Result<()> {
    println!("envelope-vault status");
    println!("=====================");
    println!();
    println!("Data directory: {}", paths.base_dir().display());

    let store = crate::storage::FileStore::new(paths.store_dir())?;
    let has_vault = store.get(VAULT_DATA_KEY)?.is_some();
    println!(
        "Vault:          {}",
        if has_vault { "present" } else { "not created" }
    );

    match session.current_budget_id() {
        Some(budget_id) => println!("Session:        locked as {}", identity::preview(&budget_id)),
        None => println!("Session:        locked"),
    }

    println!(
        "Auto-lock:      after {} minutes of inactivity",
        settings.auto_lock_minutes
    );

    if settings.audit_enabled {
        let log = crate::audit::SecurityLog::new(paths.security_log());
        let recent = log.read_recent(5)?;
        if !recent.is_empty() {
            println!();
            println!("Recent security events:");
            for entry in recent {
                println!("  {}", entry.format_human_readable());
            }
        }
    }

    Ok(())
}

/// Print a failed operation's code and suggestion, then bail
fn fail_with_suggestion(err: VaultError) -> Result<()> {
    eprintln!("Error code: {}", err.code());
    if let Some(suggestion) = err.suggestion() {
        eprintln!("Suggestion: {}", suggestion);
    }
    bail!(err)
}

/// Take the passphrase from the CLI/env or prompt for it
///
/// `confirm` prompts twice and insists on a match, for flows that set a new
/// passphrase.
fn resolve_passphrase(
    provided: Option<String>,
    prompt: &str,
    confirm: bool,
) -> Result<String> {
    if let Some(passphrase) = provided {
        return Ok(passphrase);
    }

    loop {
        let first = rpassword::prompt_password(prompt).context("Failed to read passphrase")?;

        if !confirm {
            return Ok(first);
        }

        if first.len() < 8 {
            println!("Passphrase must be at least 8 characters. Please try again.");
            continue;
        }

        let second =
            rpassword::prompt_password("Confirm passphrase: ").context("Failed to read passphrase")?;

        if first != second {
            println!("Passphrases do not match. Please try again.");
            continue;
        }

        return Ok(first);
    }
}
