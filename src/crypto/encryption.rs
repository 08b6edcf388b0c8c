//! AES-256-GCM authenticated encryption with a detached tag.
//!
//! The caller owns the nonce so it can be written into the vault
//! envelope next to the salt.  The 16-byte tag is returned separately
//! because the envelope stores it after the ciphertext as its own field.

use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce, Tag};
use rand::RngCore;

use crate::errors::{BotVaultError, Result};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Generate a random 12-byte nonce.
///
/// Every encryption must use a fresh nonce; reusing one under the same
/// key breaks GCM.
pub fn generate_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    rand::rng().fill_bytes(&mut nonce);
    nonce
}

/// Encrypt `plaintext` with a 32-byte `key` and `nonce`.
///
/// Returns `(ciphertext, tag)`.  The ciphertext has the same length as
/// the plaintext.
pub fn encrypt(
    key: &[u8; 32],
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
) -> Result<(Vec<u8>, [u8; TAG_LEN])> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| BotVaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(nonce), b"", &mut buffer)
        .map_err(|e| BotVaultError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(&tag);
    Ok((buffer, tag_bytes))
}

/// Decrypt `ciphertext` and verify `tag`.
///
/// Any failure (wrong key, modified nonce, ciphertext or tag) is
/// reported as `AuthFailure` with no further detail.
pub fn decrypt(
    key: &[u8; 32],
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
    tag: &[u8; TAG_LEN],
) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| BotVaultError::AuthFailure)?;

    let mut buffer = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(nonce),
            b"",
            &mut buffer,
            Tag::from_slice(tag),
        )
        .map_err(|_| BotVaultError::AuthFailure)?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let key = [0xABu8; 32];
        let nonce = generate_nonce();
        let (ct, tag) = encrypt(&key, &nonce, b"gamePassword=hunter2").unwrap();
        assert_eq!(ct.len(), b"gamePassword=hunter2".len());

        let pt = decrypt(&key, &nonce, &ct, &tag).unwrap();
        assert_eq!(pt, b"gamePassword=hunter2");
    }

    #[test]
    fn wrong_key_fails() {
        let nonce = generate_nonce();
        let (ct, tag) = encrypt(&[1u8; 32], &nonce, b"secret").unwrap();
        let result = decrypt(&[2u8; 32], &nonce, &ct, &tag);
        assert!(matches!(result, Err(BotVaultError::AuthFailure)));
    }

    #[test]
    fn modified_tag_fails() {
        let key = [3u8; 32];
        let nonce = generate_nonce();
        let (ct, mut tag) = encrypt(&key, &nonce, b"secret").unwrap();
        tag[0] ^= 0x01;
        assert!(decrypt(&key, &nonce, &ct, &tag).is_err());
    }

    #[test]
    fn nonces_are_random() {
        assert_ne!(generate_nonce(), generate_nonce());
    }
}
