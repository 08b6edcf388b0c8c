//! User configuration (`.botvault.toml`).

pub mod settings;

pub use settings::Settings;
