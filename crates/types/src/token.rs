//! Access credential representation and expiry logic.

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Grace window applied when deciding expiry locally, so a credential is
/// rotated slightly before the server would start rejecting it.
pub const EXPIRY_SKEW_SECS: u64 = 30;

/// The short-lived access credential attached to authenticated requests.
///
/// Exactly one credential exists per client at a time; a refresh replaces it
/// wholesale. The long-lived refresh credential never appears here: it lives
/// in a transport-managed cookie the client code cannot read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCredential {
    /// Opaque bearer token.
    pub token: String,
    /// Unix timestamp (seconds) after which the server rejects the token.
    pub expires_at: u64,
}

impl AccessCredential {
    /// Create a credential with an absolute expiry timestamp.
    pub fn new(token: impl Into<String>, expires_at: u64) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    /// Create a credential expiring `expires_in_secs` seconds from now.
    pub fn with_ttl(token: impl Into<String>, expires_in_secs: u64) -> Self {
        Self::new(token, now_secs() + expires_in_secs)
    }

    /// Return `true` if the credential expires within [`EXPIRY_SKEW_SECS`].
    #[must_use]
    pub fn is_expired(&self) -> bool {
        now_secs() + EXPIRY_SKEW_SECS >= self.expires_at
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn past_secs(secs: u64) -> u64 {
        now_secs().saturating_sub(secs)
    }

    #[test]
    fn test_valid_future_expiry() {
        let c = AccessCredential::with_ttl("tok", 3600);
        assert!(!c.is_expired());
    }

    #[test]
    fn test_expired_in_past() {
        let c = AccessCredential::new("old", past_secs(100));
        assert!(c.is_expired());
    }

    #[test]
    fn test_near_expiry_treated_as_expired() {
        // 10s of life left is inside the 30s skew window.
        let c = AccessCredential::new("tok", now_secs() + 10);
        assert!(c.is_expired());
    }

    #[test]
    fn test_outside_skew_window_still_valid() {
        let c = AccessCredential::new("tok", now_secs() + EXPIRY_SKEW_SECS + 90);
        assert!(!c.is_expired());
    }

    #[test]
    fn test_serde_roundtrip() {
        let c = AccessCredential::with_ttl("access", 900);
        let json = serde_json::to_string(&c).unwrap();
        let back: AccessCredential = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
