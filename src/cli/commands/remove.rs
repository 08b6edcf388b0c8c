//! `botvault remove` — remove a bot profile from the vault.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_store, Cli};
use crate::config::Settings;
use crate::errors::{BotVaultError, Result};

/// Execute the `remove` command.
pub fn execute(cli: &Cli, settings: &Settings, bot: &str, force: bool) -> Result<()> {
    let mut store = open_store(cli, settings)?;
    let target = store.find(bot)?;
    let (id, name) = (target.id, target.name.clone());

    // Unless --force is set, ask for confirmation before removing.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Remove bot '{name}'?"))
            .default(false)
            .interact()
            .map_err(|e| BotVaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    if store.remove_bot(id)? {
        output::success(&format!(
            "Removed bot '{name}' ({} left)",
            store.bot_count()
        ));
    } else {
        output::info(&format!("Bot '{name}' was already gone."));
    }

    Ok(())
}
