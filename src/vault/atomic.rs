//! Crash-safe vault file writes.
//!
//! `replace` never writes into the live vault file.  The new envelope is
//! staged in a hidden temp file next to it, flushed to disk, and renamed
//! over the target, so the vault on disk is always either the complete
//! old content or the complete new content.
//!
//! `write_new` uses exclusive creation and refuses to touch an existing
//! file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use rand::RngCore;
use tracing::{debug, warn};

use crate::errors::{BotVaultError, Result};

/// Create a brand-new vault file `folder/file_name` holding `bytes`.
///
/// Fails with `AlreadyExists` if the file is already there.  A write that
/// fails halfway removes the partial file.
pub fn write_new(folder: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    let path = folder.join(file_name);

    let mut file = match create_exclusive(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(BotVaultError::AlreadyExists(path));
        }
        Err(e) => return Err(e.into()),
    };

    if let Err(e) = file.write_all(bytes).and_then(|()| file.sync_all()) {
        drop(file);
        let _ = fs::remove_file(&path);
        return Err(e.into());
    }
    drop(file);
    fsync_dir(folder);

    debug!(path = %path.display(), len = bytes.len(), "created vault file");
    Ok(path)
}

/// Atomically replace the content of `existing` with `bytes`.
///
/// On failure the temp file is removed and `existing` is untouched.
pub fn replace(existing: &Path, bytes: &[u8]) -> Result<()> {
    stage(existing, bytes)?.commit()
}

/// Write `bytes` to a temp file beside `existing` and flush it, without
/// renaming yet.
///
/// The returned `StagedWrite` must be committed for the new content to
/// take effect.  Dropping it instead discards the temp file.
pub fn stage(existing: &Path, bytes: &[u8]) -> Result<StagedWrite> {
    let tmp_path = temp_path_for(existing)?;

    let staged = StagedWrite {
        tmp_path,
        target: existing.to_path_buf(),
        committed: false,
    };

    // If anything below fails, dropping `staged` removes the temp file.
    let mut file = create_exclusive(&staged.tmp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);

    debug!(tmp = %staged.tmp_path.display(), len = bytes.len(), "staged vault write");
    Ok(staged)
}

/// Read the whole vault file.
pub fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => BotVaultError::VaultNotFound(path.to_path_buf()),
        _ => BotVaultError::Io(e),
    })
}

/// Remove temp files a crashed `replace` left next to `path`.
///
/// Returns how many were removed.  Errors are ignored: leftovers are
/// harmless, only untidy.
pub fn cleanup_stale_temps(path: &Path) -> usize {
    let (Some(parent), Some(name)) = (parent_dir(path), path.file_name()) else {
        return 0;
    };
    let prefix = format!(".{}.", name.to_string_lossy());

    let Ok(entries) = fs::read_dir(parent) else {
        return 0;
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let entry_name = entry.file_name();
        let entry_name = entry_name.to_string_lossy();
        if entry_name.starts_with(&prefix) && entry_name.ends_with(".tmp") {
            warn!(path = %entry.path().display(), "removing orphaned vault temp file");
            if fs::remove_file(entry.path()).is_ok() {
                removed += 1;
            }
        }
    }
    removed
}

/// A flushed temp file waiting to be renamed over its target.
#[derive(Debug)]
pub struct StagedWrite {
    tmp_path: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl StagedWrite {
    /// Path of the temp file holding the staged content.
    pub fn temp_path(&self) -> &Path {
        &self.tmp_path
    }

    /// Rename the temp file over the target.
    ///
    /// On failure the temp file is removed and the target keeps its old
    /// content.
    pub fn commit(mut self) -> Result<()> {
        fs::rename(&self.tmp_path, &self.target)?;
        self.committed = true;

        if let Some(parent) = parent_dir(&self.target) {
            fsync_dir(parent);
        }
        debug!(path = %self.target.display(), "replaced vault file");
        Ok(())
    }
}

impl Drop for StagedWrite {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.tmp_path);
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `.<file_name>.<random>.tmp` in the same directory as `target`, so the
/// rename never crosses a filesystem boundary.
fn temp_path_for(target: &Path) -> Result<PathBuf> {
    let name = target.file_name().ok_or_else(|| {
        BotVaultError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no file name", target.display()),
        ))
    })?;

    let mut suffix = [0u8; 6];
    rand::rng().fill_bytes(&mut suffix);
    let suffix: String = suffix.iter().map(|b| format!("{b:02x}")).collect();

    let parent = parent_dir(target).unwrap_or(Path::new("."));
    Ok(parent.join(format!(".{}.{suffix}.tmp", name.to_string_lossy())))
}

/// The parent directory of `path`, treating a bare file name as `.`.
fn parent_dir(path: &Path) -> Option<&Path> {
    match path.parent() {
        Some(p) if p.as_os_str().is_empty() => Some(Path::new(".")),
        other => other,
    }
}

/// Create a file that must not exist yet, owner-only on Unix.
fn create_exclusive(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options.open(path)
}

/// Flush a directory entry so a rename or create survives power loss.
/// Best effort: not every platform lets you open a directory.
fn fsync_dir(dir: &Path) {
    #[cfg(unix)]
    {
        if let Ok(handle) = File::open(dir) {
            let _ = handle.sync_all();
        }
    }
    #[cfg(not(unix))]
    let _ = dir;
}
