//! Rate-limit and lockout payloads carried on classified errors.

use serde::{Deserialize, Serialize};

/// Server-advertised throttle state, read from `x-ratelimit-*` and
/// `retry-after` response headers. Any subset may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitInfo {
    /// Window size (`x-ratelimit-limit`).
    pub limit: Option<u64>,
    /// Calls left in the window (`x-ratelimit-remaining`).
    pub remaining: Option<u64>,
    /// Unix timestamp (seconds) when the window resets (`x-ratelimit-reset`).
    pub reset_at: Option<u64>,
    /// Server-requested wait (`retry-after`), in seconds.
    pub retry_after_secs: Option<u64>,
}

impl RateLimitInfo {
    /// The wait a caller should honor before retrying, preferring the
    /// explicit `retry-after` over the window reset.
    #[must_use]
    pub fn wait_secs(&self, now: u64) -> Option<u64> {
        if let Some(secs) = self.retry_after_secs {
            return Some(secs);
        }
        self.reset_at.map(|reset| reset.saturating_sub(now))
    }
}

/// Lockout details extracted from an HTTP 423 body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockoutInfo {
    /// Human-readable reason reported by the server.
    pub reason: String,
    /// Lockout length in seconds.
    pub duration_secs: u64,
    /// Unix timestamp (seconds) when the account unlocks.
    pub unlock_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_after_beats_reset() {
        let info = RateLimitInfo {
            limit: Some(60),
            remaining: Some(0),
            reset_at: Some(1_000_060),
            retry_after_secs: Some(5),
        };
        assert_eq!(info.wait_secs(1_000_000), Some(5));
    }

    #[test]
    fn test_wait_from_reset_timestamp() {
        let info = RateLimitInfo {
            reset_at: Some(1_000_042),
            ..RateLimitInfo::default()
        };
        assert_eq!(info.wait_secs(1_000_000), Some(42));
    }

    #[test]
    fn test_wait_saturates_past_reset() {
        let info = RateLimitInfo {
            reset_at: Some(999_000),
            ..RateLimitInfo::default()
        };
        assert_eq!(info.wait_secs(1_000_000), Some(0));
    }

    #[test]
    fn test_no_headers_no_wait() {
        assert_eq!(RateLimitInfo::default().wait_secs(1_000_000), None);
    }
}
