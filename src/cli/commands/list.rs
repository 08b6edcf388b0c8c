//! `botvault list` — display all bots in a table.

use crate::cli::output;
use crate::cli::{open_store, Cli};
use crate::config::Settings;
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli, settings: &Settings) -> Result<()> {
    let store = open_store(cli, settings)?;

    output::info(&format!(
        "{} — {} bot(s)",
        store.path().display(),
        store.bot_count()
    ));

    output::print_bots_table(store.bots());

    Ok(())
}
