use clap::Parser;
use tracing_subscriber::EnvFilter;

use botvault::cli::{Cli, Commands};
use botvault::config::Settings;

fn main() {
    let cli = Cli::parse();

    // Settings decide the log level, so they load before tracing starts.
    let settings = match std::env::current_dir()
        .map_err(botvault::errors::BotVaultError::from)
        .and_then(|cwd| Settings::load(&cwd))
    {
        Ok(s) => s,
        Err(e) => {
            botvault::cli::output::error(&e.to_string());
            std::process::exit(1);
        }
    };

    init_tracing(&settings.log_level);

    let result = match cli.command {
        Commands::New {
            ref name,
            ref folder,
            pick_folder,
        } => botvault::cli::commands::new::execute(&settings, name, folder.as_deref(), pick_folder),
        Commands::List => botvault::cli::commands::list::execute(&cli, &settings),
        Commands::Show {
            ref bot,
            reveal,
            copy,
        } => botvault::cli::commands::show::execute(&cli, &settings, bot, reveal, copy),
        Commands::Add { ref fields } => {
            botvault::cli::commands::add::execute(&cli, &settings, fields)
        }
        Commands::Edit {
            ref bot,
            ref fields,
        } => botvault::cli::commands::edit::execute(&cli, &settings, bot, fields),
        Commands::Remove { ref bot, force } => {
            botvault::cli::commands::remove::execute(&cli, &settings, bot, force)
        }
        Commands::Totp { ref bot, once } => {
            botvault::cli::commands::totp::execute(&cli, &settings, bot, once)
        }
        Commands::Completions { shell } => botvault::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        botvault::cli::output::error(&e.user_message(cli.command.action()));
        std::process::exit(1);
    }
}

/// Log to stderr, filtered by `BOTVAULT_LOG` or the configured level.
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_env("BOTVAULT_LOG")
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
