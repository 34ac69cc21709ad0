//! Throttle and lockout bookkeeping: header parsing, per-endpoint records,
//! and the manual-retry hint.

use inkpress_types::{LockoutInfo, RateLimitInfo};
use reqwest::header::HeaderMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const HEADER_LIMIT: &str = "x-ratelimit-limit";
pub const HEADER_REMAINING: &str = "x-ratelimit-remaining";
pub const HEADER_RESET: &str = "x-ratelimit-reset";
pub const HEADER_RETRY_AFTER: &str = "retry-after";

/// Assumed lockout length when the 423 body carries no duration.
const DEFAULT_LOCKOUT_SECS: u64 = 300;

/// Parses throttle headers into a [`RateLimitInfo`].
#[must_use]
pub fn parse_rate_limit(headers: &HeaderMap) -> RateLimitInfo {
    RateLimitInfo {
        limit: header_u64(headers, HEADER_LIMIT),
        remaining: header_u64(headers, HEADER_REMAINING),
        reset_at: header_u64(headers, HEADER_RESET),
        retry_after_secs: header_u64(headers, HEADER_RETRY_AFTER),
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

/// Human-readable wait line attached to throttle errors.
#[must_use]
pub fn wait_message(info: &RateLimitInfo) -> String {
    match info.wait_secs(now_secs()) {
        Some(secs) => format!("too many requests, retry in {secs} second(s)"),
        None => "too many requests, retry later".to_string(),
    }
}

/// The wait a throttled response advertises, if any.
#[must_use]
pub fn advertised_wait(headers: &HeaderMap) -> Option<Duration> {
    parse_rate_limit(headers)
        .wait_secs(now_secs())
        .map(Duration::from_secs)
}

/// Builds lockout details from a 423 body, computing the unlock time from
/// whichever of the duration or absolute timestamp the server sent.
#[must_use]
pub fn parse_lockout(body: &Value) -> LockoutInfo {
    let reason = body
        .get("reason")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("too many failed attempts")
        .to_string();
    let duration = body
        .get("lockoutDuration")
        .or_else(|| body.get("lockout_duration"))
        .and_then(Value::as_u64);
    let until = body
        .get("lockoutUntil")
        .or_else(|| body.get("lockout_until"))
        .and_then(Value::as_u64);
    let now = now_secs();
    let (duration_secs, unlock_at) = match (duration, until) {
        (Some(d), _) => (d, now + d),
        (None, Some(u)) => (u.saturating_sub(now), u),
        (None, None) => (DEFAULT_LOCKOUT_SECS, now + DEFAULT_LOCKOUT_SECS),
    };
    LockoutInfo {
        reason,
        duration_secs,
        unlock_at,
    }
}

/// Last observed throttle state for one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitRecord {
    pub limit: Option<u64>,
    pub remaining: Option<u64>,
    pub reset_at: Option<u64>,
}

/// Remembers advertised limits across responses so callers can pace
/// themselves without re-reading raw headers.
pub struct RateLimitTracker {
    records: Mutex<HashMap<String, RateLimitRecord>>,
}

impl RateLimitTracker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Records throttle headers from any response carrying them. Responses
    /// without the headers leave earlier records untouched.
    pub fn observe(&self, endpoint: &str, headers: &HeaderMap) {
        let info = parse_rate_limit(headers);
        if info.limit.is_none() && info.remaining.is_none() && info.reset_at.is_none() {
            return;
        }
        let record = RateLimitRecord {
            limit: info.limit,
            remaining: info.remaining,
            reset_at: info.reset_at,
        };
        self.records
            .lock()
            .expect("rate limit lock")
            .insert(endpoint.to_string(), record);
    }

    /// Last record for an endpoint.
    #[must_use]
    pub fn record(&self, endpoint: &str) -> Option<RateLimitRecord> {
        self.records
            .lock()
            .expect("rate limit lock")
            .get(endpoint)
            .cloned()
    }

    /// How long to wait before calling `endpoint` again, if its window is
    /// known to be exhausted. The gateway never paces automatically unless
    /// configured to; this is the manual helper.
    #[must_use]
    pub fn wait_hint(&self, endpoint: &str) -> Option<Duration> {
        let record = self.record(endpoint)?;
        if record.remaining == Some(0)
            && let Some(reset) = record.reset_at
        {
            return Some(Duration::from_secs(reset.saturating_sub(now_secs())));
        }
        None
    }
}

impl Default for RateLimitTracker {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
