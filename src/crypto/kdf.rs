//! Password-based key derivation using Argon2id.
//!
//! The parameters are fixed so every vault ever written stays openable:
//! they are not stored in the file, so changing them would lock users out
//! of existing vaults.
//!
//! | parameter   | value             |
//! |-------------|-------------------|
//! | algorithm   | Argon2id, v0x13   |
//! | memory      | 65 536 KiB (64 MB)|
//! | iterations  | 3                 |
//! | parallelism | 4                 |
//! | salt        | 16 bytes          |
//! | output      | 32 bytes          |

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{BotVaultError, Result};

/// Length of the salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Length of the derived key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of iterations.
    pub iterations: u32,
    /// Parallelism lanes.
    pub parallelism: u32,
}

impl KdfParams {
    /// The parameters every vault file is sealed with.
    pub const VAULT: Self = Self {
        memory_kib: 65_536,
        iterations: 3,
        parallelism: 4,
    };
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::VAULT
    }
}

/// A 32-byte symmetric key that zeroes its memory when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct VaultKey {
    bytes: [u8; KEY_LEN],
}

impl VaultKey {
    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl std::fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("VaultKey([REDACTED])")
    }
}

/// Derive the vault key from a password and salt with the fixed vault
/// parameters.
///
/// The same password + salt always produce the same key.
pub fn derive_key(password: &[u8], salt: &[u8; SALT_LEN]) -> Result<VaultKey> {
    derive_key_with_params(password, salt, &KdfParams::VAULT)
}

/// Derive a key with explicit Argon2id parameters.
///
/// Only invalid parameters can make this fail; `KdfParams::VAULT` never does.
pub fn derive_key_with_params(
    password: &[u8],
    salt: &[u8; SALT_LEN],
    kdf_params: &KdfParams,
) -> Result<VaultKey> {
    let params = Params::new(
        kdf_params.memory_kib,
        kdf_params.iterations,
        kdf_params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| BotVaultError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = VaultKey {
        bytes: [0u8; KEY_LEN],
    };
    argon2
        .hash_password_into(password, salt, &mut key.bytes)
        .map_err(|e| BotVaultError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;

    Ok(key)
}

/// Generate a cryptographically random 16-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}
