//! `botvault show` — print one bot profile, or copy a field of it.

use std::time::Duration;
#[cfg(all(
    unix,
    not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
))]
use std::time::Instant;

use arboard::Clipboard;

use crate::cli::output;
use crate::cli::{open_store, Cli, CopyField};
use crate::config::Settings;
use crate::errors::{BotVaultError, Result};
use crate::totp;
use crate::vault::BotProfile;

/// Execute the `show` command.
pub fn execute(
    cli: &Cli,
    settings: &Settings,
    bot: &str,
    reveal: bool,
    copy: Option<CopyField>,
) -> Result<()> {
    let store = open_store(cli, settings)?;
    let profile = store.find(bot)?;

    let Some(field) = copy else {
        output::print_bot(profile, reveal);
        return Ok(());
    };

    let value = field_value(profile, field)?;
    copy_to_clipboard(&value, settings.clipboard_clear_seconds)?;
    output::success(&format!("Copied {field:?} of '{}' to the clipboard", profile.name));

    Ok(())
}

/// The text `--copy <field>` puts on the clipboard.  For `totp` that is
/// the current code, never the secret.
fn field_value(bot: &BotProfile, field: CopyField) -> Result<String> {
    let value = match field {
        CopyField::Login => bot.game_login.clone(),
        CopyField::Password => bot.game_password.clone(),
        CopyField::Access => bot.game_access_password.clone(),
        CopyField::Storage => bot.storage_access_password.clone(),
        CopyField::Totp => match bot.totp_secret() {
            Some(secret) => Some(totp::generate_now(secret)?.code),
            None => None,
        },
    };

    value.filter(|v| !v.is_empty()).ok_or_else(|| {
        BotVaultError::CommandFailed(format!("'{}' has no {field:?} set", bot.name))
    })
}

/// How long a copied value is kept on the clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hold {
    /// Until another program takes the clipboard.
    UntilReplaced,
    /// For this long, then cleared if it is still ours.
    For(Duration),
}

impl Hold {
    fn from_seconds(seconds: u64) -> Self {
        if seconds == 0 {
            Hold::UntilReplaced
        } else {
            Hold::For(Duration::from_secs(seconds))
        }
    }
}

fn copy_to_clipboard(value: &str, clear_after_seconds: u64) -> Result<()> {
    let hold = Hold::from_seconds(clear_after_seconds);
    let mut clipboard = Clipboard::new().map_err(clipboard_error)?;

    match hold {
        Hold::For(d) => output::tip(&format!("Clipboard clears in {}s.", d.as_secs())),
        Hold::UntilReplaced if HOLDS_SELECTION => {
            output::tip("Keeping the value until something else is copied (Ctrl-C to stop).")
        }
        Hold::UntilReplaced => {}
    }

    set_and_hold(&mut clipboard, value, hold)?;

    if let Hold::For(_) = hold {
        let current = clipboard.get_text().ok();
        if still_ours(current.as_deref(), value) {
            clipboard.clear().map_err(clipboard_error)?;
        }
    }

    Ok(())
}

/// X11 and Wayland drop the selection when its owner exits, so this
/// process has to stay alive and serve it.
#[cfg(all(
    unix,
    not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
))]
const HOLDS_SELECTION: bool = true;

#[cfg(not(all(
    unix,
    not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
)))]
const HOLDS_SELECTION: bool = false;

#[cfg(all(
    unix,
    not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
))]
fn set_and_hold(clipboard: &mut Clipboard, value: &str, hold: Hold) -> Result<()> {
    use arboard::SetExtLinux;

    let set = match hold {
        Hold::UntilReplaced => clipboard.set().wait(),
        Hold::For(d) => clipboard.set().wait_until(Instant::now() + d),
    };
    set.text(value).map_err(clipboard_error)
}

#[cfg(not(all(
    unix,
    not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
)))]
fn set_and_hold(clipboard: &mut Clipboard, value: &str, hold: Hold) -> Result<()> {
    clipboard.set_text(value).map_err(clipboard_error)?;
    if let Hold::For(d) = hold {
        std::thread::sleep(d);
    }
    Ok(())
}

/// Only clear what we put there; the user may have copied something else
/// in the meantime.
fn still_ours(current: Option<&str>, copied: &str) -> bool {
    current == Some(copied)
}

fn clipboard_error(e: arboard::Error) -> BotVaultError {
    BotVaultError::Clipboard(e.to_string())
}
