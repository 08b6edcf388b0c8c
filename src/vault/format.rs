//! Binary vault envelope.
//!
//! A vault file has this layout:
//!
//! ```text
//! [salt: 16 bytes][nonce: 12 bytes][ciphertext: N bytes][GCM tag: 16 bytes]
//! ```
//!
//! - **Salt**: Argon2id salt for the password-derived key.
//! - **Nonce**: AES-256-GCM nonce, fresh on every write.
//! - **Ciphertext**: the encrypted JSON configuration.
//! - **Tag**: the GCM authentication tag.
//!
//! There is no magic number or version byte: without the password the
//! file is indistinguishable from random data.  The only structural check
//! is the minimum length; everything else is left to authentication.

use crate::crypto::{NONCE_LEN, SALT_LEN, TAG_LEN};
use crate::errors::{BotVaultError, Result};

/// Smallest possible envelope: an empty ciphertext.
pub const MIN_ENVELOPE_LEN: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

/// The parsed parts of a vault file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
    pub tag: [u8; TAG_LEN],
}

impl Envelope {
    /// Serialize the envelope into the on-disk byte layout.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(MIN_ENVELOPE_LEN + self.ciphertext.len());
        buf.extend_from_slice(&self.salt);
        buf.extend_from_slice(&self.nonce);
        buf.extend_from_slice(&self.ciphertext);
        buf.extend_from_slice(&self.tag);
        buf
    }

    /// Split raw file bytes back into salt, nonce, ciphertext and tag.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < MIN_ENVELOPE_LEN {
            return Err(BotVaultError::Format(format!(
                "file is {} bytes, a vault is at least {MIN_ENVELOPE_LEN}",
                data.len()
            )));
        }

        let (salt, rest) = data.split_at(SALT_LEN);
        let (nonce, rest) = rest.split_at(NONCE_LEN);
        let (ciphertext, tag) = rest.split_at(rest.len() - TAG_LEN);

        Ok(Self {
            salt: fixed(salt)?,
            nonce: fixed(nonce)?,
            ciphertext: ciphertext.to_vec(),
            tag: fixed(tag)?,
        })
    }
}

/// Copy a slice whose length was already checked into a fixed array.
fn fixed<const N: usize>(bytes: &[u8]) -> Result<[u8; N]> {
    bytes
        .try_into()
        .map_err(|_| BotVaultError::Format(format!("expected a {N}-byte field")))
}
