//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::BotProfile;

/// What a hidden secret looks like on screen.
const MASK: &str = "********";

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of bots (Id, Name, Description, TOTP).
pub fn print_bots_table(bots: &[BotProfile]) {
    if bots.is_empty() {
        info("No bots in this vault yet.");
        tip("Run `botvault add --name <NAME>` to add your first bot.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Name", "Description", "TOTP"]);

    for bot in bots {
        table.add_row(vec![
            bot.id.to_string(),
            bot.name.clone(),
            bot.description.clone().unwrap_or_default(),
            if bot.totp_secret().is_some() { "yes" } else { "no" }.to_string(),
        ]);
    }

    println!("{table}");
}

/// Print one profile as a two-column table, masking secrets unless
/// `reveal` is set.
pub fn print_bot(bot: &BotProfile, reveal: bool) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Field", "Value"]);

    for (label, value) in profile_rows(bot, reveal) {
        table.add_row(vec![label.to_string(), value]);
    }

    println!("{table}");
}

fn profile_rows(bot: &BotProfile, reveal: bool) -> Vec<(&'static str, String)> {
    let plain = |v: &Option<String>| v.clone().unwrap_or_default();
    let secret = |v: &Option<String>| match v.as_deref() {
        None | Some("") => String::new(),
        Some(s) if reveal => s.to_string(),
        Some(_) => MASK.to_string(),
    };

    vec![
        ("Id", bot.id.to_string()),
        ("Name", bot.name.clone()),
        ("Description", plain(&bot.description)),
        ("Login", plain(&bot.game_login)),
        ("Password", secret(&bot.game_password)),
        ("Access password", secret(&bot.game_access_password)),
        ("Storage password", secret(&bot.storage_access_password)),
        ("TOTP secret", secret(&bot.totp_secret)),
    ]
}
