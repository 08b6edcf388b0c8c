//! The decrypted payload: a `Configuration` holding an ordered list of
//! `BotProfile`s.
//!
//! The JSON shape is the one every version of the tool reads and writes:
//!
//! ```json
//! { "valid": true, "bots": [ { "id": "…", "name": "Farmer1", "totpSecret": "…" } ] }
//! ```
//!
//! Keys this version does not know about are carried through untouched,
//! so saving a vault never drops fields another version wrote.
//!
//! All transforms here are pure: they return a new `Configuration` and
//! leave the input alone, so the store can persist first and swap second.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::errors::{BotVaultError, Result};
use crate::totp;

/// Shortest accepted bot name, in characters.
pub const NAME_MIN_CHARS: usize = 4;

/// Longest accepted bot name, in characters.
pub const NAME_MAX_CHARS: usize = 50;

/// The whole decrypted vault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Sanity marker.  Anything other than `true` means the decrypted
    /// bytes are not a bot configuration.
    #[serde(default)]
    pub valid: bool,

    /// Profiles in insertion order.  Older files may omit the key.
    #[serde(default)]
    pub bots: Vec<BotProfile>,

    /// Unknown top-level keys, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One bot's credentials.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotProfile {
    /// Stable identity, assigned once at creation.
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_login: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_access_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_access_password: Option<String>,
    /// Base32 shared secret for the game's two-factor codes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totp_secret: Option<String>,

    /// Unknown per-bot keys (e.g. `ghostIp`), preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A profile that has not been given an id yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BotDraft {
    pub name: String,
    pub description: Option<String>,
    pub game_login: Option<String>,
    pub game_password: Option<String>,
    pub game_access_password: Option<String>,
    pub storage_access_password: Option<String>,
    pub totp_secret: Option<String>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse decrypted bytes into a `Configuration`.
///
/// Malformed JSON, a missing or false `valid` marker and two bots sharing
/// an id are all `InvalidVault`: the password happened to work but this is
/// not one of our files.
pub fn parse_configuration(plaintext: &[u8]) -> Result<Configuration> {
    let config: Configuration =
        serde_json::from_slice(plaintext).map_err(|_| BotVaultError::InvalidVault)?;

    if !config.valid {
        return Err(BotVaultError::InvalidVault);
    }

    // Ids must be unique for replace/remove to address a single profile.
    let mut seen = HashSet::with_capacity(config.bots.len());
    if !config.bots.iter().all(|b| seen.insert(b.id)) {
        return Err(BotVaultError::InvalidVault);
    }

    Ok(config)
}

impl Configuration {
    /// A fresh, valid configuration with no bots.
    pub fn empty() -> Self {
        Self {
            valid: true,
            bots: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Serialize to the JSON payload that gets sealed.
    pub fn to_payload(&self) -> Result<Zeroizing<String>> {
        serde_json::to_string_pretty(self)
            .map(Zeroizing::new)
            .map_err(|e| BotVaultError::SerializationError(format!("configuration: {e}")))
    }

    /// Look up a profile by id.
    pub fn bot(&self, id: Uuid) -> Option<&BotProfile> {
        self.bots.iter().find(|b| b.id == id)
    }

    /// A copy with `bot` appended.
    pub fn with_bot_added(&self, bot: BotProfile) -> Self {
        let mut next = self.clone();
        next.bots.push(bot);
        next
    }

    /// A copy with the profile sharing `bot.id` replaced in place.
    pub fn with_bot_replaced(&self, bot: BotProfile) -> Result<Self> {
        let mut next = self.clone();
        let slot = next
            .bots
            .iter_mut()
            .find(|b| b.id == bot.id)
            .ok_or_else(|| BotVaultError::bot_not_found(bot.id))?;
        *slot = bot;
        Ok(next)
    }

    /// A copy without the profile `id`.  Absent ids leave it unchanged.
    pub fn without_bot(&self, id: Uuid) -> Self {
        let mut next = self.clone();
        next.bots.retain(|b| b.id != id);
        next
    }
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

impl BotProfile {
    /// Give a draft its permanent id.
    pub fn from_draft(draft: BotDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: draft.name,
            description: draft.description,
            game_login: draft.game_login,
            game_password: draft.game_password,
            game_access_password: draft.game_access_password,
            storage_access_password: draft.storage_access_password,
            totp_secret: draft.totp_secret,
            extra: Map::new(),
        }
    }

    /// Check the user-editable fields.
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        if let Some(secret) = non_empty(&self.totp_secret) {
            totp::decode_secret(secret)?;
        }
        Ok(())
    }

    /// The TOTP secret, if one is set and non-blank.
    pub fn totp_secret(&self) -> Option<&str> {
        non_empty(&self.totp_secret)
    }

    /// Normalise empty strings to `None`, the way the forms submit them.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        for field in [
            &mut self.description,
            &mut self.game_login,
            &mut self.game_password,
            &mut self.game_access_password,
            &mut self.storage_access_password,
            &mut self.totp_secret,
        ] {
            if field.as_deref().is_some_and(str::is_empty) {
                *field = None;
            }
        }
        self
    }
}

impl std::fmt::Debug for BotProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("BotProfile")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("description", &self.description)
            .field("game_login", &redact(&self.game_login))
            .field("game_password", &redact(&self.game_password))
            .field("game_access_password", &redact(&self.game_access_password))
            .field("storage_access_password", &redact(&self.storage_access_password))
            .field("totp_secret", &redact(&self.totp_secret))
            .finish_non_exhaustive()
    }
}

/// Names are 4–50 characters after trimming.
pub fn validate_name(name: &str) -> Result<()> {
    let len = name.trim().chars().count();
    if len < NAME_MIN_CHARS {
        return Err(BotVaultError::InvalidProfile(format!(
            "name must have at least {NAME_MIN_CHARS} characters"
        )));
    }
    if len > NAME_MAX_CHARS {
        return Err(BotVaultError::InvalidProfile(format!(
            "name must have at most {NAME_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
