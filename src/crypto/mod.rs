//! Cryptographic primitives for botvault.
//!
//! This module provides:
//! - Argon2id password-based key derivation (`kdf`)
//! - AES-256-GCM encryption with a detached tag (`encryption`)

pub mod encryption;
pub mod kdf;

pub use encryption::{decrypt, encrypt, generate_nonce, NONCE_LEN, TAG_LEN};
pub use kdf::{derive_key, derive_key_with_params, generate_salt, KdfParams, VaultKey, SALT_LEN};
