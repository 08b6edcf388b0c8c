use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{BotVaultError, Result};

/// User configuration, loaded from `.botvault.toml`.
///
/// Every field has a sensible default so botvault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Folder new vaults are created in when `--folder` is not given.
    #[serde(default = "default_folder")]
    pub default_folder: String,

    /// Suffix of vault file names, without the leading dot.
    #[serde(default = "default_file_extension")]
    pub file_extension: String,

    /// Tracing filter used when `BOTVAULT_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Seconds after which `show --copy` clears the clipboard (0 = never).
    #[serde(default)]
    pub clipboard_clear_seconds: u64,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_folder() -> String {
    ".".to_string()
}

fn default_file_extension() -> String {
    "start-openkore-latam".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_folder: default_folder(),
            file_extension: default_file_extension(),
            log_level: default_log_level(),
            clipboard_clear_seconds: 0,
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the working directory.
    const FILE_NAME: &'static str = ".botvault.toml";

    /// Load settings from `<dir>/.botvault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            BotVaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        if settings.file_extension.trim_start_matches('.').is_empty() {
            return Err(BotVaultError::ConfigError(
                "file_extension cannot be empty".into(),
            ));
        }

        Ok(settings)
    }

    /// The vault suffix without a leading dot.
    pub fn extension(&self) -> &str {
        self.file_extension.trim_start_matches('.')
    }

    /// `<name>.<extension>`
    pub fn vault_file_name(&self, name: &str) -> String {
        format!("{name}.{}", self.extension())
    }

    /// The folder for new vaults, preferring an explicit choice.
    pub fn vault_folder(&self, base: &Path, explicit: Option<&str>) -> PathBuf {
        base.join(explicit.unwrap_or(&self.default_folder))
    }

    /// Picker filter pattern matching vault files, e.g.
    /// `*.start-openkore-latam`.
    pub fn vault_pattern(&self) -> String {
        format!("*.{}", self.extension())
    }
}

// ── Tests ────────────────────────────────────────────────────────────
