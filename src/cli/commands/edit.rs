//! `botvault edit` — change fields of an existing bot profile.
//!
//! Fields given as flags replace the stored ones; with no flags the user
//! is prompted for every field with the current values as defaults.  The
//! id and any unknown keys stored with the profile are kept.

use std::io::{self, IsTerminal};

use crate::cli::output;
use crate::cli::{open_store, Cli, ProfileArgs};
use crate::config::Settings;
use crate::errors::{BotVaultError, Result};
use crate::vault::{BotDraft, BotProfile};

use super::add::{apply_args, prompt_profile};

/// Execute the `edit` command.
pub fn execute(cli: &Cli, settings: &Settings, bot: &str, args: &ProfileArgs) -> Result<()> {
    let mut store = open_store(cli, settings)?;
    let current = store.find(bot)?.clone();

    let draft = if args.any() {
        apply_args(draft_of(&current), args)
    } else if io::stdin().is_terminal() {
        prompt_profile(&draft_of(&current))?
    } else {
        return Err(BotVaultError::CommandFailed(
            "no fields given and stdin is not a terminal".into(),
        ));
    };

    let updated = with_fields(current, draft);
    if store.bot(updated.id) == Some(&updated) {
        output::info("No changes.");
        return Ok(());
    }

    let name = updated.name.clone();
    store.update_bot(updated)?;
    output::success(&format!("Bot '{name}' updated"));

    Ok(())
}

/// The editable part of a profile.
fn draft_of(bot: &BotProfile) -> BotDraft {
    BotDraft {
        name: bot.name.clone(),
        description: bot.description.clone(),
        game_login: bot.game_login.clone(),
        game_password: bot.game_password.clone(),
        game_access_password: bot.game_access_password.clone(),
        storage_access_password: bot.storage_access_password.clone(),
        totp_secret: bot.totp_secret.clone(),
    }
}

/// `bot` with its editable fields replaced by `draft`.
fn with_fields(mut bot: BotProfile, draft: BotDraft) -> BotProfile {
    bot.name = draft.name;
    bot.description = draft.description;
    bot.game_login = draft.game_login;
    bot.game_password = draft.game_password;
    bot.game_access_password = draft.game_access_password;
    bot.storage_access_password = draft.storage_access_password;
    bot.totp_secret = draft.totp_secret;
    bot
}
