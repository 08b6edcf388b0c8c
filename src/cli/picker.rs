//! Choosing files and folders.
//!
//! Commands ask a `FilePicker` instead of talking to the terminal directly
//! so tests can answer for the user.

use std::path::{Path, PathBuf};

use dialoguer::Input;

use crate::errors::{BotVaultError, Result};

/// A named file pattern, e.g. `Bot vaults` / `*.start-openkore-latam`.
///
/// `pattern` is a `;`-separated list of `*.ext` globs or exact file names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    pub display_name: String,
    pub pattern: String,
}

impl FileFilter {
    /// A filter shown as `display_name`, matching `pattern`.
    pub fn new(display_name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            pattern: pattern.into(),
        }
    }

    /// Whether the file name of `path` matches one of the alternatives.
    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };

        self.pattern
            .split(';')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .any(|p| match p.strip_prefix('*') {
                Some("") | Some(".*") => true,
                Some(suffix) => name.len() > suffix.len() && name.ends_with(suffix),
                None => name == p,
            })
    }
}

/// Asks the user for a location.  `Ok(None)` means they cancelled.
pub trait FilePicker {
    fn select_folder(&self) -> Result<Option<PathBuf>>;

    fn pick_file(&self, title: &str, filters: &[FileFilter]) -> Result<Option<PathBuf>>;
}

/// Terminal prompts via `dialoguer`.  An empty answer cancels.
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptPicker;

impl PromptPicker {
    fn ask(prompt: &str) -> Result<Option<PathBuf>> {
        let answer: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| BotVaultError::CommandFailed(format!("path prompt: {e}")))?;

        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(None);
        }
        Ok(Some(PathBuf::from(answer)))
    }
}

impl FilePicker for PromptPicker {
    fn select_folder(&self) -> Result<Option<PathBuf>> {
        let Some(path) = Self::ask("Folder (empty to cancel)")? else {
            return Ok(None);
        };
        if !path.is_dir() {
            return Err(BotVaultError::CommandFailed(format!(
                "{} is not a folder",
                path.display()
            )));
        }
        Ok(Some(path))
    }

    fn pick_file(&self, title: &str, filters: &[FileFilter]) -> Result<Option<PathBuf>> {
        let hint = filters
            .iter()
            .map(|f| format!("{} ({})", f.display_name, f.pattern))
            .collect::<Vec<_>>()
            .join(", ");
        let prompt = if hint.is_empty() {
            format!("{title} (empty to cancel)")
        } else {
            format!("{title} [{hint}] (empty to cancel)")
        };

        loop {
            let Some(path) = Self::ask(&prompt)? else {
                return Ok(None);
            };
            if filters.is_empty() || filters.iter().any(|f| f.matches(&path)) {
                return Ok(Some(path));
            }
            super::output::warning(&format!(
                "{} does not match {hint}",
                path.display()
            ));
        }
    }
}
