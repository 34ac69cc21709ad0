//! Unified error type for the inkpress workspace.

use crate::limits::{LockoutInfo, RateLimitInfo};
use thiserror::Error;

/// Enumerates all error kinds that can occur across inkpress crates.
///
/// Every variant is cheap to clone: a classified outcome may be fanned out
/// to several coalesced callers of the same in-flight request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The request produced no HTTP response at all.
    #[error("network unavailable: {0}")]
    Network(String),

    /// The access credential is expired or was rejected; a silent refresh
    /// may still recover the session.
    #[error("session expired")]
    AuthExpired,

    /// Authentication is required and could not be recovered by a refresh.
    /// `redirect` tells the UI whether to navigate to its login view.
    #[error("authentication required: {message}")]
    AuthInvalid { message: String, redirect: bool },

    /// The anti-forgery token was rejected even after a re-issue.
    #[error("security token expired, please retry")]
    CsrfInvalid,

    /// The server throttled the request. `info` carries the advertised
    /// window state and the computed wait.
    #[error("{message}")]
    RateLimited {
        message: String,
        info: RateLimitInfo,
    },

    /// The account is temporarily locked out.
    #[error("account locked: {}", .info.reason)]
    AccountLocked { info: LockoutInfo },

    /// The resource does not exist. Legitimate content misses and routing
    /// defects both land here; neither is alarming to the caller.
    #[error("not found: {path}")]
    NotFound { path: String },

    /// The server refused the request for permission reasons.
    #[error("forbidden: {message}")]
    Forbidden { message: String },

    /// The server answered with a failure status no other rule claims.
    #[error("server error: status={status}")]
    Server { status: u16, message: String },

    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Session persistence failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration loading or validation error.
    #[error("configuration error: {0}")]
    Config(String),
}

// ── From impls ────────────────────────────────────────────────────────────────

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

impl GatewayError {
    /// Returns `true` if the failure should produce no user-visible
    /// notification. Silent failures go to the diagnostic log only.
    #[must_use]
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::Network(_) | Self::NotFound { .. })
    }

    /// Returns `true` if the UI should navigate to its login view.
    #[must_use]
    pub fn wants_login(&self) -> bool {
        matches!(self, Self::AuthInvalid { redirect: true, .. })
    }

    /// Rate-limit details, when present.
    #[must_use]
    pub fn rate_limit(&self) -> Option<&RateLimitInfo> {
        match self {
            Self::RateLimited { info, .. } => Some(info),
            _ => None,
        }
    }

    /// Lockout details, when present.
    #[must_use]
    pub fn lockout(&self) -> Option<&LockoutInfo> {
        match self {
            Self::AccountLocked { info } => Some(info),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_network() {
        let err = GatewayError::Network("connection refused".to_string());
        assert_eq!(err.to_string(), "network unavailable: connection refused");
    }

    #[test]
    fn test_error_display_rate_limited_uses_message() {
        let err = GatewayError::RateLimited {
            message: "too many requests, retry in 5 second(s)".to_string(),
            info: RateLimitInfo::default(),
        };
        assert_eq!(err.to_string(), "too many requests, retry in 5 second(s)");
    }

    #[test]
    fn test_error_display_locked_shows_reason() {
        let err = GatewayError::AccountLocked {
            info: LockoutInfo {
                reason: "too many failed attempts".to_string(),
                duration_secs: 300,
                unlock_at: 0,
            },
        };
        assert!(err.to_string().contains("too many failed attempts"));
    }

    #[test]
    fn test_silent_kinds() {
        assert!(GatewayError::Network("timeout".into()).is_silent());
        assert!(
            GatewayError::NotFound {
                path: "/posts/nope".into()
            }
            .is_silent()
        );
        assert!(!GatewayError::AuthExpired.is_silent());
        assert!(
            !GatewayError::Forbidden {
                message: "admin only".into()
            }
            .is_silent()
        );
    }

    #[test]
    fn test_wants_login_only_on_redirect() {
        let redirect = GatewayError::AuthInvalid {
            message: "sign in".into(),
            redirect: true,
        };
        let keep = GatewayError::AuthInvalid {
            message: "sign in".into(),
            redirect: false,
        };
        assert!(redirect.wants_login());
        assert!(!keep.wants_login());
        assert!(!GatewayError::AuthExpired.wants_login());
    }

    #[test]
    fn test_from_serde_json_error() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
        let err = GatewayError::from(parse_err);
        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[test]
    fn test_rate_limit_accessor() {
        let info = RateLimitInfo {
            limit: Some(60),
            remaining: Some(0),
            reset_at: Some(1_700_000_000),
            retry_after_secs: Some(5),
        };
        let err = GatewayError::RateLimited {
            message: "slow down".into(),
            info: info.clone(),
        };
        assert_eq!(err.rate_limit(), Some(&info));
        assert_eq!(GatewayError::AuthExpired.rate_limit(), None);
    }
}
