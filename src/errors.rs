use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// All errors that can occur in botvault.
#[derive(Debug, Error)]
pub enum BotVaultError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Wrong password or tampered/corrupted ciphertext.  The two cases are
    /// deliberately indistinguishable.
    #[error("Decryption failed: wrong password or corrupted data")]
    AuthFailure,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Vault errors ---
    #[error("Not a vault file: {0}")]
    Format(String),

    #[error("File decrypted but does not contain a bot configuration")]
    InvalidVault,

    #[error("Vault not found at {0}")]
    VaultNotFound(PathBuf),

    #[error("A file already exists at {0}")]
    AlreadyExists(PathBuf),

    #[error("Invalid vault file name: {0}")]
    InvalidFileName(String),

    /// A vault-access failure already reduced to what the user may see.
    #[error("Could not {0} the file")]
    Access(&'static str),

    // --- Profile errors ---
    #[error("Invalid bot profile: {0}")]
    InvalidProfile(String),

    #[error("Invalid TOTP secret: {0}")]
    InvalidTotpSecret(String),

    #[error("Bot '{0}' not found")]
    BotNotFound(String),

    #[error("Several bots are named '{0}', select one by id")]
    AmbiguousBotName(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,
}

impl BotVaultError {
    /// Shorthand for `BotNotFound` keyed by a profile id.
    pub fn bot_not_found(id: Uuid) -> Self {
        Self::BotNotFound(id.to_string())
    }

    /// Whether this error came from reading, decrypting or writing a vault.
    ///
    /// These are reported to the user with a generic message so nothing
    /// about the failure (wrong password vs. damaged file, OS error text)
    /// leaks to the screen.
    pub fn is_vault_access(&self) -> bool {
        matches!(
            self,
            Self::EncryptionFailed(_)
                | Self::AuthFailure
                | Self::KeyDerivationFailed(_)
                | Self::Format(_)
                | Self::InvalidVault
                | Self::VaultNotFound(_)
                | Self::AlreadyExists(_)
                | Self::Io(_)
                | Self::SerializationError(_)
        )
    }

    /// Collapse vault-access errors into `Access(action)`, logging the
    /// real cause at debug level.  Other errors pass through.
    pub fn into_access(self, action: &'static str) -> Self {
        if self.is_vault_access() {
            tracing::debug!(error = %self, action, "vault access failed");
            Self::Access(action)
        } else {
            self
        }
    }

    /// The message shown to the user for a failed `action`
    /// (e.g. "open", "save").
    pub fn user_message(&self, action: &str) -> String {
        if self.is_vault_access() {
            format!("Could not {action} the file")
        } else {
            self.to_string()
        }
    }
}

/// Convenience type alias for botvault results.
pub type Result<T> = std::result::Result<T, BotVaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vault_access_errors_use_generic_message() {
        assert_eq!(
            BotVaultError::AuthFailure.user_message("open"),
            "Could not open the file"
        );
        let io = BotVaultError::Io(std::io::Error::other("disk on fire"));
        assert_eq!(io.user_message("save"), "Could not save the file");
    }

    #[test]
    fn into_access_keeps_the_first_action() {
        let err = BotVaultError::AuthFailure.into_access("open");
        assert!(matches!(err, BotVaultError::Access("open")));
        assert_eq!(err.user_message("save"), "Could not open the file");

        let err = BotVaultError::BotNotFound("Farmer1".into()).into_access("open");
        assert!(matches!(err, BotVaultError::BotNotFound(_)));
    }

    #[test]
    fn existing_target_uses_generic_message() {
        let err = BotVaultError::AlreadyExists(PathBuf::from("/tmp/farm.start-openkore-latam"));
        assert_eq!(err.user_message("create"), "Could not create the file");
    }

    #[test]
    fn validation_errors_keep_their_message() {
        let err = BotVaultError::InvalidProfile("name too short".into());
        assert_eq!(err.user_message("save"), "Invalid bot profile: name too short");
    }
}
