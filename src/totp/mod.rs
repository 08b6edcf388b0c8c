//! Time-based one-time passwords (RFC 6238) for the game's 2FA.
//!
//! Codes are 6 digits, HMAC-SHA1, 30-second step, no skew window: exactly
//! what authenticator apps show for a standard base32 secret.
//!
//! `TotpTicker` is the display-side state machine.  It is `Idle` until a
//! secret is supplied, then `Ticking`, re-deriving the code each time it
//! is ticked (once per second in the CLI).

use chrono::Utc;
use data_encoding::{Encoding, Specification};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use zeroize::Zeroizing;

use crate::errors::{BotVaultError, Result};

/// Length of one time step in seconds.
pub const STEP_SECONDS: u64 = 30;

/// Number of digits in a code.
pub const DIGITS: u32 = 6;

/// A code valid for the current time step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotpCode {
    /// Zero-padded decimal code, e.g. `"050471"`.
    pub code: String,
    /// Seconds until the next step, in `1..=30`.
    pub remaining_seconds: u64,
    /// The time-step counter the code was derived from.
    pub counter: u64,
}

/// Decode a user-entered base32 secret.
///
/// Spaces, hyphens and `=` padding are ignored and lowercase is accepted,
/// since secrets are usually copied from a setup page in groups.
pub fn decode_secret(secret: &str) -> Result<Zeroizing<Vec<u8>>> {
    let normalized: Zeroizing<String> = Zeroizing::new(
        secret
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '=')
            .map(|c| c.to_ascii_uppercase())
            .collect(),
    );

    if normalized.is_empty() {
        return Err(BotVaultError::InvalidTotpSecret("secret is empty".into()));
    }

    base32()?
        .decode(normalized.as_bytes())
        .map(Zeroizing::new)
        .map_err(|_| BotVaultError::InvalidTotpSecret("not a valid base32 string".into()))
}

/// RFC 4648 base32 without padding that ignores the unused low bits of
/// the last character, as authenticator apps do.
fn base32() -> Result<Encoding> {
    let mut spec = Specification::new();
    spec.symbols.push_str("ABCDEFGHIJKLMNOPQRSTUVWXYZ234567");
    spec.check_trailing_bits = false;
    spec.encoding()
        .map_err(|e| BotVaultError::InvalidTotpSecret(format!("base32 alphabet: {e}")))
}

/// HOTP (RFC 4226) over `key` and `counter`, truncated to 6 digits.
pub fn hotp(key: &[u8], counter: u64) -> Result<u32> {
    let mut mac = Hmac::<Sha1>::new_from_slice(key)
        .map_err(|e| BotVaultError::InvalidTotpSecret(format!("HMAC init failed: {e}")))?;
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    let offset = usize::from(digest[digest.len() - 1] & 0x0f);
    let binary = u32::from_be_bytes([
        digest[offset] & 0x7f,
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ]);
    Ok(binary % 10u32.pow(DIGITS))
}

/// Time-step counter for `unix_seconds`.
pub fn counter_at(unix_seconds: u64) -> u64 {
    unix_seconds / STEP_SECONDS
}

/// Seconds left in the step containing `unix_seconds` (`1..=30`).
pub fn remaining_seconds(unix_seconds: u64) -> u64 {
    STEP_SECONDS - (unix_seconds % STEP_SECONDS)
}

/// The code for an already-decoded key at `unix_seconds`.
pub fn code_for_key(key: &[u8], unix_seconds: u64) -> Result<TotpCode> {
    let counter = counter_at(unix_seconds);
    Ok(TotpCode {
        code: format!("{:0width$}", hotp(key, counter)?, width = DIGITS as usize),
        remaining_seconds: remaining_seconds(unix_seconds),
        counter,
    })
}

/// The code for a base32 `secret` at `unix_seconds`.
pub fn generate_at(secret: &str, unix_seconds: u64) -> Result<TotpCode> {
    let key = decode_secret(secret)?;
    code_for_key(&key, unix_seconds)
}

/// The code for a base32 `secret` right now.
pub fn generate_now(secret: &str) -> Result<TotpCode> {
    generate_at(secret, now_unix())
}

/// Current Unix time in whole seconds.
pub fn now_unix() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Ticker
// ---------------------------------------------------------------------------

/// Display state for a live TOTP code.
#[derive(Default)]
pub enum TotpState {
    /// No secret loaded.
    #[default]
    Idle,
    /// Secret loaded; `code` is the last derived value.
    Ticking {
        key: Zeroizing<Vec<u8>>,
        code: TotpCode,
    },
}

/// Drives a live code display from a stored secret.
///
/// Ticking only reads the held key, so it needs no coordination with
/// anything else that touches the vault.
#[derive(Default)]
pub struct TotpTicker {
    state: TotpState,
}

impl TotpTicker {
    /// A ticker with no secret.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load or clear the secret, using the current time.
    pub fn set_secret(&mut self, secret: Option<&str>) -> Result<Option<&TotpCode>> {
        self.set_secret_at(secret, now_unix())
    }

    /// Load or clear the secret.
    ///
    /// A blank or missing secret moves to `Idle`.  A non-empty one moves to
    /// `Ticking` and computes the code for `unix_seconds` straight away.
    /// An undecodable secret is an error and leaves the ticker `Idle`.
    pub fn set_secret_at(
        &mut self,
        secret: Option<&str>,
        unix_seconds: u64,
    ) -> Result<Option<&TotpCode>> {
        self.state = TotpState::Idle;

        let Some(secret) = secret.filter(|s| !s.trim().is_empty()) else {
            return Ok(None);
        };

        let key = decode_secret(secret)?;
        let code = code_for_key(&key, unix_seconds)?;
        self.state = TotpState::Ticking { key, code };
        Ok(self.current())
    }

    /// Drop the secret and go back to `Idle`.
    pub fn clear(&mut self) {
        self.state = TotpState::Idle;
    }

    /// Re-derive the code for the current time.
    pub fn tick(&mut self) -> Result<Option<&TotpCode>> {
        self.tick_at(now_unix())
    }

    /// Re-derive the code for `unix_seconds`.  `None` while idle.
    pub fn tick_at(&mut self, unix_seconds: u64) -> Result<Option<&TotpCode>> {
        match &mut self.state {
            TotpState::Idle => Ok(None),
            TotpState::Ticking { key, code } => {
                *code = code_for_key(key, unix_seconds)?;
                Ok(Some(&*code))
            }
        }
    }

    /// The last derived code, without recomputing.
    pub fn current(&self) -> Option<&TotpCode> {
        match &self.state {
            TotpState::Idle => None,
            TotpState::Ticking { code, .. } => Some(code),
        }
    }

    /// Whether a secret is loaded.
    pub fn is_ticking(&self) -> bool {
        matches!(self.state, TotpState::Ticking { .. })
    }
}

impl std::fmt::Debug for TotpTicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.state {
            TotpState::Idle => f.write_str("TotpTicker::Idle"),
            TotpState::Ticking { code, .. } => f
                .debug_struct("TotpTicker::Ticking")
                .field("remaining_seconds", &code.remaining_seconds)
                .finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// RFC 6238 SHA-1 seed "12345678901234567890" in base32.
    const RFC_SECRET: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

    #[test]
    fn matches_rfc6238_vectors() {
        // Last six digits of the RFC's 8-digit SHA-1 values.
        let vectors = [
            (59, "287082"),
            (1_111_111_109, "081804"),
            (1_111_111_111, "050471"),
            (1_234_567_890, "005924"),
            (2_000_000_000, "279037"),
            (20_000_000_000, "353130"),
        ];
        for (time, expected) in vectors {
            assert_eq!(generate_at(RFC_SECRET, time).unwrap().code, expected, "t={time}");
        }
    }

    #[test]
    fn matches_rfc4226_hotp_vectors() {
        let key = b"12345678901234567890";
        let expected = [
            755_224, 287_082, 359_152, 969_429, 338_314, 254_676, 287_922, 162_583, 399_871,
            520_489,
        ];
        for (counter, value) in expected.iter().enumerate() {
            assert_eq!(hotp(key, counter as u64).unwrap(), *value);
        }
    }

    #[test]
    fn secret_formatting_is_forgiving() {
        let grouped = "gezd gnbv gy3t qojq-gezd gnbv gy3t qojq";
        assert_eq!(
            generate_at(grouped, 59).unwrap(),
            generate_at(RFC_SECRET, 59).unwrap()
        );
        assert!(decode_secret("JBSWY3DPEHPK3PXP====").is_ok());
    }

    #[test]
    fn nonzero_trailing_bits_are_accepted() {
        // 26 characters leave 2 spare bits; `H` sets them.
        let key = decode_secret("JBSWY3DPEHPK3PXPJBSWY3DPEH").unwrap();
        assert_eq!(key.len(), 16);
        assert_eq!(
            *key,
            *decode_secret("JBSWY3DPEHPK3PXPJBSWY3DPEE").unwrap()
        );
        assert!(generate_at("JBSWY3DPEHPK3PXPJBSWY3DPEH", 59).is_ok());
    }

    #[test]
    fn invalid_base32_is_rejected() {
        assert!(matches!(
            decode_secret("JBSWY3DP1!"),
            Err(BotVaultError::InvalidTotpSecret(_))
        ));
        // 1, 3 and 6 leftover characters never form whole bytes.
        assert!(decode_secret("JBSWY3DPE").is_err());
    }

    #[test]
    fn bad_secrets_are_rejected() {
        assert!(matches!(
            decode_secret(""),
            Err(BotVaultError::InvalidTotpSecret(_))
        ));
        assert!(matches!(
            decode_secret("18!@"),
            Err(BotVaultError::InvalidTotpSecret(_))
        ));
    }

    #[test]
    fn same_time_same_code() {
        let a = generate_at("JBSWY3DPEHPK3PXP", 1_700_000_000).unwrap();
        let b = generate_at("JBSWY3DPEHPK3PXP", 1_700_000_000).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn code_is_stable_within_a_step() {
        let start = 1_700_000_010 - (1_700_000_010 % STEP_SECONDS);
        let first = generate_at(RFC_SECRET, start).unwrap();
        let last = generate_at(RFC_SECRET, start + STEP_SECONDS - 1).unwrap();
        assert_eq!(first.code, last.code);
        assert_eq!(first.counter, last.counter);
    }

    #[test]
    fn remaining_seconds_counts_down_and_resets() {
        let start = 1_200_000_000 - (1_200_000_000 % STEP_SECONDS);
        assert_eq!(remaining_seconds(start), 30);
        for t in start..start + STEP_SECONDS - 1 {
            assert!(remaining_seconds(t + 1) < remaining_seconds(t));
        }
        assert_eq!(remaining_seconds(start + STEP_SECONDS - 1), 1);
        assert_eq!(remaining_seconds(start + STEP_SECONDS), 30);
    }

    #[test]
    fn ticker_starts_idle() {
        let mut ticker = TotpTicker::new();
        assert!(!ticker.is_ticking());
        assert!(ticker.tick_at(59).unwrap().is_none());
    }

    #[test]
    fn ticker_computes_code_immediately() {
        let mut ticker = TotpTicker::new();
        let code = ticker
            .set_secret_at(Some(RFC_SECRET), 59)
            .unwrap()
            .cloned()
            .unwrap();
        assert_eq!(code.code, "287082");
        assert_eq!(code.remaining_seconds, 1);
        assert!(ticker.is_ticking());
    }

    #[test]
    fn ticker_follows_the_clock() {
        let mut ticker = TotpTicker::new();
        ticker.set_secret_at(Some(RFC_SECRET), 1_111_111_109).unwrap();
        assert_eq!(ticker.current().unwrap().code, "081804");

        let code = ticker.tick_at(1_111_111_111).unwrap().unwrap();
        assert_eq!(code.code, "050471");
        assert_eq!(code.remaining_seconds, 29);
    }

    #[test]
    fn clearing_the_secret_goes_idle() {
        let mut ticker = TotpTicker::new();
        ticker.set_secret_at(Some(RFC_SECRET), 59).unwrap();

        assert!(ticker.set_secret_at(Some("  "), 60).unwrap().is_none());
        assert!(!ticker.is_ticking());

        ticker.set_secret_at(Some(RFC_SECRET), 59).unwrap();
        ticker.clear();
        assert!(ticker.current().is_none());
    }

    #[test]
    fn invalid_secret_leaves_ticker_idle() {
        let mut ticker = TotpTicker::new();
        ticker.set_secret_at(Some(RFC_SECRET), 59).unwrap();
        assert!(ticker.set_secret_at(Some("!!"), 59).is_err());
        assert!(!ticker.is_ticking());
    }
}
