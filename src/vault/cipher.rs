//! Sealing and opening whole vault payloads.
//!
//! `seal` turns a plaintext payload into envelope bytes ready for disk;
//! `open` reverses it.  A wrong password and a damaged file both come back
//! as `AuthFailure` so a password-guessing attacker learns nothing from the
//! error.

use tracing::debug;
use zeroize::Zeroizing;

use crate::crypto::{self, KdfParams};
use crate::errors::Result;

use super::format::Envelope;

/// Seals and opens vault envelopes with a given set of KDF parameters.
///
/// `VaultCipher::default()` uses the fixed vault parameters and is what
/// every real vault file is written with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VaultCipher {
    params: KdfParams,
}

impl VaultCipher {
    /// A cipher using non-default Argon2id parameters.
    ///
    /// Files sealed this way can only be opened with the same parameters.
    pub fn with_params(params: KdfParams) -> Self {
        Self { params }
    }

    /// The KDF parameters in use.
    pub fn params(&self) -> &KdfParams {
        &self.params
    }

    /// Encrypt `plaintext` under `password`.
    ///
    /// A new salt and nonce are drawn on every call, so sealing the same
    /// payload twice yields different bytes.
    pub fn seal(&self, password: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        let salt = crypto::generate_salt();
        let nonce = crypto::generate_nonce();

        let key = crypto::derive_key_with_params(password, &salt, &self.params)?;
        let (ciphertext, tag) = crypto::encrypt(key.as_bytes(), &nonce, plaintext)?;

        let bytes = Envelope {
            salt,
            nonce,
            ciphertext,
            tag,
        }
        .encode();

        debug!(envelope_len = bytes.len(), "sealed vault payload");
        Ok(bytes)
    }

    /// Decrypt envelope `bytes` with `password`.
    ///
    /// Fails with `Format` when the bytes are too short to be a vault and
    /// with `AuthFailure` for everything else that goes wrong.
    pub fn open(&self, password: &[u8], bytes: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let envelope = Envelope::decode(bytes)?;

        let key = crypto::derive_key_with_params(password, &envelope.salt, &self.params)?;
        let plaintext = crypto::decrypt(
            key.as_bytes(),
            &envelope.nonce,
            &envelope.ciphertext,
            &envelope.tag,
        )?;

        debug!(payload_len = plaintext.len(), "opened vault envelope");
        Ok(Zeroizing::new(plaintext))
    }
}

/// Seal with the fixed vault parameters.
pub fn seal(password: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    VaultCipher::default().seal(password, plaintext)
}

/// Open with the fixed vault parameters.
pub fn open(password: &[u8], bytes: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    VaultCipher::default().open(password, bytes)
}
