//! Whole-file operations: seal + write, read + open.
//!
//! These are the three calls a front end needs to work with vault files
//! as plaintext documents.  The `_with` variants take an explicit
//! `VaultCipher`; the plain ones use the fixed vault parameters.

use std::path::{Path, PathBuf};

use zeroize::{Zeroize, Zeroizing};

use crate::errors::{BotVaultError, Result};

use super::atomic;
use super::cipher::VaultCipher;

/// Seal `plaintext` and write it as a new file `folder/file_name`.
///
/// Never overwrites: an existing file is `AlreadyExists`.
pub fn create_file(
    folder: &Path,
    file_name: &str,
    password: &str,
    plaintext: &str,
) -> Result<PathBuf> {
    create_file_with(&VaultCipher::default(), folder, file_name, password, plaintext)
}

/// Read `path` and decrypt it to text.
pub fn load_file(password: &str, path: &Path) -> Result<Zeroizing<String>> {
    load_file_with(&VaultCipher::default(), password, path)
}

/// Seal `plaintext` and atomically replace the file at `path`.
pub fn replace_file(path: &Path, plaintext: &str, password: &str) -> Result<()> {
    replace_file_with(&VaultCipher::default(), path, plaintext, password)
}

/// `create_file` with explicit KDF parameters.
pub fn create_file_with(
    cipher: &VaultCipher,
    folder: &Path,
    file_name: &str,
    password: &str,
    plaintext: &str,
) -> Result<PathBuf> {
    let sealed = cipher.seal(password.as_bytes(), plaintext.as_bytes())?;
    atomic::write_new(folder, file_name, &sealed)
}

/// `load_file` with explicit KDF parameters.
pub fn load_file_with(cipher: &VaultCipher, password: &str, path: &Path) -> Result<Zeroizing<String>> {
    let bytes = atomic::read(path)?;
    let mut plaintext = cipher.open(password.as_bytes(), &bytes)?;

    // Move the buffer out so the String takes ownership without a copy.
    String::from_utf8(std::mem::take(&mut *plaintext))
        .map(Zeroizing::new)
        .map_err(|e| {
            let mut bad_bytes = e.into_bytes();
            bad_bytes.zeroize();
            BotVaultError::InvalidVault
        })
}

/// `replace_file` with explicit KDF parameters.
pub fn replace_file_with(
    cipher: &VaultCipher,
    path: &Path,
    plaintext: &str,
    password: &str,
) -> Result<()> {
    let sealed = cipher.seal(password.as_bytes(), plaintext.as_bytes())?;
    atomic::replace(path, &sealed)
}
