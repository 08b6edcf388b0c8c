//! `botvault add` — add a bot profile to the vault.

use std::io::{self, IsTerminal};

use dialoguer::{Input, Password};

use crate::cli::output;
use crate::cli::{open_store, Cli, ProfileArgs};
use crate::config::Settings;
use crate::errors::{BotVaultError, Result};
use crate::vault::BotDraft;

/// Execute the `add` command.
pub fn execute(cli: &Cli, settings: &Settings, args: &ProfileArgs) -> Result<()> {
    let mut store = open_store(cli, settings)?;

    // Flags win; with none given, ask for every field.
    let draft = if args.any() {
        apply_args(BotDraft::default(), args)
    } else if io::stdin().is_terminal() {
        prompt_profile(&BotDraft::default())?
    } else {
        return Err(BotVaultError::CommandFailed(
            "no fields given and stdin is not a terminal; pass --name".into(),
        ));
    };

    let id = store.create_bot(draft)?;

    output::success(&format!(
        "Bot added with id {id} ({} total)",
        store.bot_count()
    ));
    output::tip("Run `botvault list` to see all bots.");

    Ok(())
}

/// Overlay the given flags onto `draft`.  An empty flag value clears the
/// field.
pub(crate) fn apply_args(mut draft: BotDraft, args: &ProfileArgs) -> BotDraft {
    if let Some(name) = &args.name {
        draft.name = name.clone();
    }
    for (slot, value) in [
        (&mut draft.description, &args.description),
        (&mut draft.game_login, &args.login),
        (&mut draft.game_password, &args.password),
        (&mut draft.game_access_password, &args.access_password),
        (&mut draft.storage_access_password, &args.storage_password),
        (&mut draft.totp_secret, &args.totp_secret),
    ] {
        if let Some(v) = value {
            *slot = Some(v.clone());
        }
    }
    draft
}

/// Ask for every field, offering the values in `current` as defaults.
///
/// Secret fields use hidden input; leaving one empty keeps the current
/// value.  Answering [`CLEAR`] to an optional field removes it.
pub(crate) fn prompt_profile(current: &BotDraft) -> Result<BotDraft> {
    let name = ask_text("Name", Some(&current.name), false)?;
    let description = ask_text("Description", current.description.as_deref(), true)?;
    let game_login = ask_text("Login", current.game_login.as_deref(), true)?;
    let game_password = ask_secret("Password", &current.game_password)?;
    let game_access_password = ask_secret("Access password", &current.game_access_password)?;
    let storage_access_password =
        ask_secret("Storage password", &current.storage_access_password)?;
    let totp_secret = ask_secret("TOTP secret (base32)", &current.totp_secret)?;

    Ok(BotDraft {
        name,
        description: Some(description),
        game_login: Some(game_login),
        game_password,
        game_access_password,
        storage_access_password,
        totp_secret,
    })
}

/// Answer that empties an optional field during interactive edits.
pub(crate) const CLEAR: &str = "-";

fn ask_text(prompt: &str, default: Option<&str>, allow_empty: bool) -> Result<String> {
    let prompt = if allow_empty && default.is_some_and(|d| !d.is_empty()) {
        format!("{prompt} ({CLEAR} clears)")
    } else {
        prompt.to_string()
    };
    let mut input = Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(allow_empty);
    if let Some(d) = default.filter(|d| !d.is_empty()) {
        input = input.default(d.to_string());
    }
    let answer = input
        .interact_text()
        .map_err(|e| BotVaultError::CommandFailed(format!("input prompt: {e}")))?;

    Ok(text_answer(answer, allow_empty))
}

fn ask_secret(prompt: &str, current: &Option<String>) -> Result<Option<String>> {
    let prompt = if current.is_some() {
        format!("{prompt} (empty keeps current, {CLEAR} clears)")
    } else {
        prompt.to_string()
    };
    let value = Password::new()
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()
        .map_err(|e| BotVaultError::CommandFailed(format!("input prompt: {e}")))?;

    Ok(secret_answer(value, current))
}

/// An empty string is normalized to `None` later on.
fn text_answer(answer: String, allow_empty: bool) -> String {
    if allow_empty && answer.trim() == CLEAR {
        String::new()
    } else {
        answer
    }
}

fn secret_answer(answer: String, current: &Option<String>) -> Option<String> {
    if answer.is_empty() {
        current.clone()
    } else if answer == CLEAR {
        None
    } else {
        Some(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_args_overlays_only_given_fields() {
        let current = BotDraft {
            name: "Farmer1".into(),
            game_login: Some("old".into()),
            game_password: Some("secret".into()),
            ..BotDraft::default()
        };
        let args = ProfileArgs {
            login: Some("new".into()),
            ..ProfileArgs::default()
        };

        let next = apply_args(current, &args);
        assert_eq!(next.name, "Farmer1");
        assert_eq!(next.game_login.as_deref(), Some("new"));
        assert_eq!(next.game_password.as_deref(), Some("secret"));
    }

    #[test]
    fn secret_answers_keep_replace_or_clear() {
        let current = Some("hunter2".to_string());
        assert_eq!(secret_answer(String::new(), &current), current);
        assert_eq!(secret_answer("-".into(), &current), None);
        assert_eq!(secret_answer("new".into(), &current).as_deref(), Some("new"));
        assert_eq!(secret_answer(String::new(), &None), None);
    }

    #[test]
    fn dash_clears_optional_text_only() {
        assert_eq!(text_answer("-".into(), true), "");
        assert_eq!(text_answer(" - ".into(), true), "");
        assert_eq!(text_answer("farmer".into(), true), "farmer");
        assert_eq!(text_answer("-".into(), false), "-");
    }

    #[test]
    fn empty_flag_value_clears_after_normalization() {
        let current = BotDraft {
            name: "Farmer1".into(),
            description: Some("tank".into()),
            ..BotDraft::default()
        };
        let args = ProfileArgs {
            description: Some(String::new()),
            ..ProfileArgs::default()
        };

        let next = apply_args(current, &args);
        let profile = crate::vault::BotProfile::from_draft(next).normalized();
        assert_eq!(profile.description, None);
    }
}
