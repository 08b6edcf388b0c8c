//! `botvault new` — create a new, empty vault file.

use crate::cli::output;
use crate::cli::picker::{FilePicker, PromptPicker};
use crate::cli::{prompt_new_password, validate_file_name};
use crate::config::Settings;
use crate::errors::{BotVaultError, Result};
use crate::vault::ProfileStore;

/// Execute the `new` command.
pub fn execute(
    settings: &Settings,
    name: &str,
    folder: Option<&str>,
    pick_folder: bool,
) -> Result<()> {
    // 1. Reject bad names before asking for anything.
    validate_file_name(name)?;

    let cwd = std::env::current_dir()?;
    let folder = if pick_folder {
        PromptPicker
            .select_folder()?
            .ok_or(BotVaultError::UserCancelled)?
    } else {
        settings.vault_folder(&cwd, folder)
    };
    let file_name = settings.vault_file_name(name);

    // 2. Prompt for a new password (with confirmation).
    let password = prompt_new_password()?;

    // 3. Write the empty configuration.  An existing file is never
    //    overwritten.
    let store = ProfileStore::create(&folder, &file_name, &password)?;

    output::success(&format!("Vault created at {}", store.path().display()));
    output::tip(&format!(
        "Run `botvault -f {} add --name <NAME>` to add a bot.",
        store.path().display()
    ));

    Ok(())
}
