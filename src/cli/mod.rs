//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;
pub mod picker;

use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{BotVaultError, Result};
use crate::vault::ProfileStore;

use picker::{FileFilter, FilePicker, PromptPicker};

/// Longest accepted vault name for `new`.
const MAX_FILE_NAME_LEN: usize = 50;

/// botvault CLI: encrypted OpenKore bot profiles with TOTP codes.
#[derive(Parser)]
#[command(
    name = "botvault",
    about = "Encrypted bot profile vault with TOTP codes",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault file to use (prompted for when omitted)
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new, empty vault file
    New {
        /// Vault name (letters and digits, up to 50)
        name: String,
        /// Folder to create the vault in (default: from .botvault.toml)
        #[arg(long, conflicts_with = "pick_folder")]
        folder: Option<String>,
        /// Choose the folder interactively
        #[arg(long)]
        pick_folder: bool,
    },

    /// List all bots in the vault
    List,

    /// Show one bot's profile
    Show {
        /// Bot id or unique name
        bot: String,
        /// Print secrets instead of masking them
        #[arg(long)]
        reveal: bool,
        /// Copy one field to the clipboard
        #[arg(long, value_enum)]
        copy: Option<CopyField>,
    },

    /// Add a bot profile
    Add {
        #[command(flatten)]
        fields: ProfileArgs,
    },

    /// Edit a bot profile (id is kept)
    Edit {
        /// Bot id or unique name
        bot: String,
        #[command(flatten)]
        fields: ProfileArgs,
    },

    /// Remove a bot profile
    Remove {
        /// Bot id or unique name
        bot: String,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },

    /// Show the bot's current TOTP code
    Totp {
        /// Bot id or unique name
        bot: String,
        /// Print a single code and exit
        #[arg(long)]
        once: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Profile fields accepted by `add` and `edit`.
///
/// When none is given the command falls back to interactive prompts.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct ProfileArgs {
    /// Bot name (4-50 characters)
    #[arg(long)]
    pub name: Option<String>,
    /// Free-form description
    #[arg(long)]
    pub description: Option<String>,
    /// Game account login
    #[arg(long)]
    pub login: Option<String>,
    /// Game account password
    #[arg(long)]
    pub password: Option<String>,
    /// Game access (PIN) password
    #[arg(long)]
    pub access_password: Option<String>,
    /// Storage password
    #[arg(long)]
    pub storage_password: Option<String>,
    /// Base32 TOTP secret
    #[arg(long)]
    pub totp_secret: Option<String>,
}

impl ProfileArgs {
    /// Whether any field was given on the command line.
    pub fn any(&self) -> bool {
        self.name.is_some()
            || self.description.is_some()
            || self.login.is_some()
            || self.password.is_some()
            || self.access_password.is_some()
            || self.storage_password.is_some()
            || self.totp_secret.is_some()
    }
}

/// Fields `show --copy` can put on the clipboard.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyField {
    Login,
    Password,
    Access,
    Storage,
    /// The current TOTP code, not the secret.
    Totp,
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Get the vault password, trying in order:
/// 1. `BOTVAULT_PASSWORD` env var (scripts, tests)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Vault password")
        .interact()
        .map_err(|e| BotVaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new password with confirmation (used by `new`).
///
/// Also respects `BOTVAULT_PASSWORD`.  Empty passwords are refused.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    loop {
        let password = Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt("Choose vault password")
                .with_confirmation("Confirm vault password", "Passwords do not match, try again")
                .allow_empty_password(true)
                .interact()
                .map_err(|e| BotVaultError::CommandFailed(format!("password prompt: {e}")))?,
        );

        if password.is_empty() {
            output::warning("Password cannot be empty. Try again.");
            continue;
        }

        return Ok(password);
    }
}

fn password_from_env() -> Option<Zeroizing<String>> {
    std::env::var("BOTVAULT_PASSWORD")
        .ok()
        .filter(|pw| !pw.is_empty())
        .map(Zeroizing::new)
}

/// The vault file to operate on: `--file` if given, otherwise whatever
/// the picker returns.
pub fn resolve_vault_path(
    cli: &Cli,
    settings: &Settings,
    picker: &dyn FilePicker,
) -> Result<PathBuf> {
    if let Some(path) = &cli.file {
        return Ok(path.clone());
    }

    let filters = [FileFilter::new("Bot vaults", settings.vault_pattern())];
    picker
        .pick_file("Open bot vault", &filters)?
        .ok_or(BotVaultError::UserCancelled)
}

/// Resolve the vault path, ask for the password and unlock the vault.
///
/// Any read/decrypt failure comes back as `Access("open")`.
pub fn open_store(cli: &Cli, settings: &Settings) -> Result<ProfileStore> {
    let path = resolve_vault_path(cli, settings, &PromptPicker)?;
    let password = prompt_password()?;
    ProfileStore::load(&path, &password).map_err(|e| e.into_access("open"))
}

impl Commands {
    /// The verb used in the generic failure message for this command.
    pub fn action(&self) -> &'static str {
        match self {
            Commands::New { .. } => "create",
            Commands::Add { .. } | Commands::Edit { .. } | Commands::Remove { .. } => "save",
            Commands::List
            | Commands::Show { .. }
            | Commands::Totp { .. }
            | Commands::Completions { .. } => "open",
        }
    }
}

/// Validate a vault name given to `new`.
///
/// Allowed: ASCII letters and digits, 1 to 50 of them.  The name becomes
/// the file stem, so anything else is refused rather than escaped.
pub fn validate_file_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(BotVaultError::InvalidFileName(
            "name cannot be empty".into(),
        ));
    }

    if name.len() > MAX_FILE_NAME_LEN {
        return Err(BotVaultError::InvalidFileName(format!(
            "name cannot exceed {MAX_FILE_NAME_LEN} characters"
        )));
    }

    let pattern = regex::Regex::new("^[A-Za-z0-9]+$")
        .map_err(|e| BotVaultError::CommandFailed(format!("name pattern: {e}")))?;
    if !pattern.is_match(name) {
        return Err(BotVaultError::InvalidFileName(format!(
            "'{name}' may only contain letters and digits"
        )));
    }

    Ok(())
}
