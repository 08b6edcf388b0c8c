//! The open-vault session used by CLI commands.
//!
//! `ProfileStore` holds the decrypted `Configuration`, the vault path and
//! the password it was opened with.  The password is needed because every
//! mutation re-seals the whole file with a fresh salt; there is no
//! persisted unlock token.
//!
//! Every mutation follows the same order:
//!
//! 1. compute the new `Configuration` from the current one,
//! 2. serialize it,
//! 3. seal it,
//! 4. atomically replace the vault file,
//! 5. only then swap the in-memory `Configuration`.
//!
//! A failure anywhere in 1–4 returns the error and leaves the held state
//! exactly as it was.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::errors::{BotVaultError, Result};

use super::atomic;
use super::cipher::VaultCipher;
use super::files;
use super::profile::{parse_configuration, BotDraft, BotProfile, Configuration};

/// An unlocked vault.  Drop it (or call `lock`) to end the session.
pub struct ProfileStore {
    /// Path to the vault file on disk.
    path: PathBuf,

    /// The vault password (zeroized on drop).
    password: Zeroizing<String>,

    /// The last configuration known to be on disk.
    config: Configuration,

    /// KDF parameters used for every seal/open in this session.
    cipher: VaultCipher,
}

impl ProfileStore {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create a new vault file `folder/file_name` holding an empty
    /// configuration, and open a session on it.
    pub fn create(folder: &Path, file_name: &str, password: &str) -> Result<Self> {
        Self::create_with(VaultCipher::default(), folder, file_name, password)
    }

    /// `create` with explicit KDF parameters.
    pub fn create_with(
        cipher: VaultCipher,
        folder: &Path,
        file_name: &str,
        password: &str,
    ) -> Result<Self> {
        let config = Configuration::empty();
        let payload = config.to_payload()?;
        let path = files::create_file_with(&cipher, folder, file_name, password, &payload)?;

        info!(path = %path.display(), "created vault");
        Ok(Self {
            path,
            password: Zeroizing::new(password.to_string()),
            config,
            cipher,
        })
    }

    /// Open an existing vault: read, decrypt, then check it is a
    /// configuration.
    ///
    /// Nothing is retained on failure.
    pub fn load(path: &Path, password: &str) -> Result<Self> {
        Self::load_with(VaultCipher::default(), path, password)
    }

    /// `load` with explicit KDF parameters.
    pub fn load_with(cipher: VaultCipher, path: &Path, password: &str) -> Result<Self> {
        let removed = atomic::cleanup_stale_temps(path);
        if removed > 0 {
            debug!(removed, "cleaned up temp files from an interrupted save");
        }

        let plaintext = files::load_file_with(&cipher, password, path)?;
        let config = parse_configuration(plaintext.as_bytes())?;

        debug!(path = %path.display(), bots = config.bots.len(), "loaded vault");
        Ok(Self {
            path: path.to_path_buf(),
            password: Zeroizing::new(password.to_string()),
            config,
            cipher,
        })
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Add a new profile and persist.  Returns the freshly generated id.
    pub fn create_bot(&mut self, draft: BotDraft) -> Result<Uuid> {
        let bot = BotProfile::from_draft(draft).normalized();
        bot.validate()?;
        let id = bot.id;

        let next = self.config.with_bot_added(bot);
        self.commit(next)?;

        info!(%id, "created bot profile");
        Ok(id)
    }

    /// Replace the profile with the same id wholesale and persist.
    ///
    /// Fails with `BotNotFound` if no profile has that id.
    pub fn update_bot(&mut self, bot: BotProfile) -> Result<()> {
        let bot = bot.normalized();
        bot.validate()?;
        let id = bot.id;

        let next = self.config.with_bot_replaced(bot)?;
        self.commit(next)?;

        info!(%id, "updated bot profile");
        Ok(())
    }

    /// Remove the profile `id` and persist.
    ///
    /// Returns `false` without touching the disk if it was already gone.
    pub fn remove_bot(&mut self, id: Uuid) -> Result<bool> {
        if self.config.bot(id).is_none() {
            return Ok(false);
        }

        let next = self.config.without_bot(id);
        self.commit(next)?;

        info!(%id, "removed bot profile");
        Ok(true)
    }

    /// Seal `next`, atomically write it, then adopt it as current state.
    fn commit(&mut self, next: Configuration) -> Result<()> {
        let payload = next.to_payload()?;
        files::replace_file_with(&self.cipher, &self.path, &payload, &self.password)?;
        self.config = next;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// All profiles in insertion order.
    pub fn bots(&self) -> &[BotProfile] {
        &self.config.bots
    }

    /// A profile by id.
    pub fn bot(&self, id: Uuid) -> Option<&BotProfile> {
        self.config.bot(id)
    }

    /// Find a profile by id, or by name when the selector is not an id.
    ///
    /// Names may collide, so a name matching several profiles is
    /// `AmbiguousBotName`.
    pub fn find(&self, selector: &str) -> Result<&BotProfile> {
        let selector = selector.trim();

        if let Ok(id) = Uuid::parse_str(selector) {
            if let Some(bot) = self.bot(id) {
                return Ok(bot);
            }
        }

        let mut matches = self.config.bots.iter().filter(|b| b.name == selector);
        match (matches.next(), matches.next()) {
            (Some(bot), None) => Ok(bot),
            (Some(_), Some(_)) => Err(BotVaultError::AmbiguousBotName(selector.to_string())),
            (None, _) => Err(BotVaultError::BotNotFound(selector.to_string())),
        }
    }

    /// The decrypted configuration currently held.
    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// Path to the vault file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of profiles.
    pub fn bot_count(&self) -> usize {
        self.config.bots.len()
    }

    /// End the session.  The password buffer is wiped as `self` drops.
    pub fn lock(self) {
        debug!(path = %self.path.display(), "vault locked");
    }
}

impl std::fmt::Debug for ProfileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileStore")
            .field("path", &self.path)
            .field("password", &"[REDACTED]")
            .field("bots", &self.config.bots.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KdfParams;
    use tempfile::TempDir;

    fn cheap() -> VaultCipher {
        VaultCipher::with_params(KdfParams {
            memory_kib: 1_024,
            iterations: 1,
            parallelism: 1,
        })
    }

    fn draft(name: &str) -> BotDraft {
        BotDraft {
            name: name.into(),
            ..BotDraft::default()
        }
    }

    fn new_store(dir: &TempDir) -> ProfileStore {
        ProfileStore::create_with(cheap(), dir.path(), "bots.vault", "pw").unwrap()
    }

    #[test]
    fn new_vault_is_empty_and_reopens() {
        let dir = TempDir::new().unwrap();
        let store = new_store(&dir);
        assert_eq!(store.bot_count(), 0);

        let reopened = ProfileStore::load_with(cheap(), store.path(), "pw").unwrap();
        assert_eq!(reopened.configuration(), &Configuration::empty());
    }

    #[test]
    fn invalid_name_is_rejected_without_writing() {
        let dir = TempDir::new().unwrap();
        let mut store = new_store(&dir);
        let before = std::fs::read(store.path()).unwrap();

        let result = store.create_bot(draft("abc"));
        assert!(matches!(result, Err(BotVaultError::InvalidProfile(_))));
        assert_eq!(store.bot_count(), 0);
        assert_eq!(std::fs::read(store.path()).unwrap(), before);
    }

    #[test]
    fn update_unknown_bot_fails() {
        let dir = TempDir::new().unwrap();
        let mut store = new_store(&dir);
        let stray = BotProfile::from_draft(draft("Stray"));
        assert!(matches!(
            store.update_bot(stray),
            Err(BotVaultError::BotNotFound(_))
        ));
    }

    #[test]
    fn remove_absent_bot_does_not_write() {
        let dir = TempDir::new().unwrap();
        let mut store = new_store(&dir);
        let before = std::fs::read(store.path()).unwrap();

        assert!(!store.remove_bot(Uuid::new_v4()).unwrap());
        assert_eq!(std::fs::read(store.path()).unwrap(), before);
    }

    #[test]
    fn failed_save_keeps_previous_state() {
        let dir = TempDir::new().unwrap();
        let mut store = new_store(&dir);
        store.create_bot(draft("Farmer1")).unwrap();

        // Make the rename impossible.
        let path = store.path().to_path_buf();
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("blocker"), b"x").unwrap();

        assert!(store.create_bot(draft("Farmer2")).is_err());
        assert_eq!(store.bot_count(), 1);
        assert_eq!(store.bots()[0].name, "Farmer1");
    }

    #[test]
    fn find_by_id_or_unique_name() {
        let dir = TempDir::new().unwrap();
        let mut store = new_store(&dir);
        let a = store.create_bot(draft("Farmer1")).unwrap();
        store.create_bot(draft("Twin")).unwrap();
        store.create_bot(draft("Twin")).unwrap();

        assert_eq!(store.find("Farmer1").unwrap().id, a);
        assert_eq!(store.find(&a.to_string()).unwrap().name, "Farmer1");
        assert!(matches!(
            store.find("Twin"),
            Err(BotVaultError::AmbiguousBotName(_))
        ));
        assert!(matches!(
            store.find("Nobody"),
            Err(BotVaultError::BotNotFound(_))
        ));
    }

    #[test]
    fn load_cleans_up_orphaned_temp_files() {
        let dir = TempDir::new().unwrap();
        let store = new_store(&dir);
        let orphan = dir.path().join(".bots.vault.deadbeef.tmp");
        std::fs::write(&orphan, b"partial").unwrap();

        ProfileStore::load_with(cheap(), store.path(), "pw").unwrap();
        assert!(!orphan.exists());
    }

    #[test]
    fn debug_hides_password() {
        let dir = TempDir::new().unwrap();
        let store = new_store(&dir);
        let printed = format!("{store:?}");
        assert!(printed.contains("[REDACTED]"));
        assert!(!printed.contains("\"pw\""));
    }
}
