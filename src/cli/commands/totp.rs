//! `botvault totp` — show a bot's live TOTP code.
//!
//! The bar counts down the seconds left in the current 30-second step and
//! the code is re-derived once per second until the user hits Ctrl-C.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::{open_store, Cli};
use crate::config::Settings;
use crate::errors::{BotVaultError, Result};
use crate::totp::{TotpCode, TotpTicker, STEP_SECONDS};

/// Execute the `totp` command.
pub fn execute(cli: &Cli, settings: &Settings, bot: &str, once: bool) -> Result<()> {
    let store = open_store(cli, settings)?;
    let profile = store.find(bot)?;

    let mut ticker = TotpTicker::new();
    let Some(first) = ticker.set_secret(profile.totp_secret())?.cloned() else {
        return Err(BotVaultError::CommandFailed(format!(
            "'{}' has no TOTP secret",
            profile.name
        )));
    };
    let name = profile.name.clone();

    // The session is not needed while ticking.
    store.lock();

    if once {
        println!("{}", first.code);
        return Ok(());
    }

    let pb = ProgressBar::new(STEP_SECONDS);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{prefix} {msg} {bar:30.cyan/blue} {pos:>2}s")
            .map_err(|e| BotVaultError::CommandFailed(format!("progress template: {e}")))?
            .progress_chars("=>-"),
    );
    pb.set_prefix(name);
    show(&pb, &first);

    loop {
        std::thread::sleep(Duration::from_secs(1));
        if let Some(code) = ticker.tick()? {
            show(&pb, code);
        }
    }
}

fn show(pb: &ProgressBar, code: &TotpCode) {
    pb.set_message(code.code.clone());
    pb.set_position(code.remaining_seconds);
}
