//! Single-use passphrase credential minting.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::Serialize;

use crate::clock::Clock;

/// A minted credential: an unguessable token bound to an expiration instant.
///
/// Embedded verbatim into the SRT listener's passphrase/listen-timeout
/// options; never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    /// Opaque printable token (hex), ≥128 bits of entropy.
    pub token: String,
    /// UTC instant after which the credential (and the listener bound to it)
    /// must refuse connections.
    pub expires_at: DateTime<Utc>,
}

/// Mints single-use [`Credentials`] bounded by a configured timeout.
pub trait CredentialMinter: Send + Sync {
    /// Produces a fresh credential. Reusing a token across mints is forbidden.
    fn mint(&self) -> Credentials;
}

/// CSPRNG-backed credential minter.
pub struct RandomCredentialMinter {
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl RandomCredentialMinter {
    /// Creates a minter that stamps credentials with `clock.now_utc() + timeout`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, timeout: Duration) -> Self {
        Self { clock, timeout }
    }

    fn generate_token() -> String {
        let mut bytes = [0u8; 16];
        rand::rng().fill_bytes(&mut bytes);
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl CredentialMinter for RandomCredentialMinter {
    fn mint(&self) -> Credentials {
        let expires_at = self.clock.now_utc()
            + chrono::Duration::from_std(self.timeout).unwrap_or_else(|_| chrono::Duration::zero());
        Credentials {
            token: Self::generate_token(),
            expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::TimeZone;

    #[test]
    fn mint_produces_32_hex_char_token() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 11, 55, 0).unwrap();
        let minter = RandomCredentialMinter::new(FixedClock::arc(now), Duration::from_secs(60));
        let creds = minter.mint();
        assert_eq!(creds.token.len(), 32);
        assert!(creds.token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn mint_expiry_matches_configured_timeout() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 11, 55, 0).unwrap();
        let minter = RandomCredentialMinter::new(FixedClock::arc(now), Duration::from_secs(60));
        let creds = minter.mint();
        assert_eq!((creds.expires_at - now).num_seconds(), 60);
    }

    #[test]
    fn mint_produces_distinct_tokens() {
        let now = Utc::now();
        let minter = RandomCredentialMinter::new(FixedClock::arc(now), Duration::from_secs(60));
        let a = minter.mint();
        let b = minter.mint();
        assert_ne!(a.token, b.token);
    }
}
