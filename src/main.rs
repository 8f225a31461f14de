use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use envelope_vault::audit::SecurityLog;
use envelope_vault::cli::{handle_vault_command, VaultCommands};
use envelope_vault::config::{Settings, VaultPaths};
use envelope_vault::session::SessionManager;
use envelope_vault::storage::FileStore;

#[derive(Parser)]
#[command(
    name = "envault",
    author = "Kaylee Beyene",
    version,
    about = "Encrypted vault core for envelope budgeting",
    long_about = "envault manages the encrypted budget vault: create a budget \
                  protected by a passphrase, unlock it, join a shared budget \
                  via share code, and rotate the passphrase safely."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Passphrase (prompted when omitted)
    #[arg(
        long,
        global = true,
        env = "ENVAULT_PASSPHRASE",
        hide_env_values = true
    )]
    passphrase: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Vault management commands
    #[command(flatten)]
    Vault(VaultCommands),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = VaultPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    paths.ensure_directories()?;

    // Wire the session over the file-backed store
    let store = FileStore::new(paths.store_dir())?;
    let mut session = SessionManager::new(Arc::new(store));
    if settings.audit_enabled {
        session = session.with_security_log(SecurityLog::new(paths.security_log()));
    }

    match cli.command {
        Some(Commands::Vault(cmd)) => {
            handle_vault_command(&session, &paths, &settings, cmd, cli.passphrase).await?;
        }
        None => {
            println!("envault - encrypted vault core for envelope budgeting");
            println!();
            println!("Run 'envault --help' for usage information.");
            println!("Run 'envault init' to create a new encrypted budget.");
        }
    }

    Ok(())
}
