//! The failure decision table.
//!
//! Given a settled HTTP response and the request's endpoint identity,
//! decide whether the gateway recovers (one token refresh or one CSRF
//! re-issue, never more), surfaces the failure, or swallows it silently.
//! The table is pure; the gateway applies its side effects (clearing
//! credentials, broadcasts, cache invalidation) from the verdict.

use crate::routes;
use serde_json::Value;

/// Which attempt produced the response being classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pass {
    /// Initial attempt; recovery is still available.
    First,
    /// The single permitted retry; every failure is terminal now.
    Retry,
}

/// A recovery the gateway performs before its one retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Recovery {
    RefreshToken,
    ReissueCsrf,
}

/// A terminal failure, before the gateway attaches payloads and side
/// effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Terminal {
    /// Unrecoverable 401 (or vanished identity): clear local credentials;
    /// `redirect` asks the UI to navigate to login.
    AuthFailure { redirect: bool },
    /// The auth flow refused the credentials offered to it (wrong
    /// password, dead refresh cookie). Says nothing about the session
    /// already held on this machine, which stays intact.
    LoginRejected,
    /// The anti-forgery token was rejected again after a re-issue.
    CsrfRejected,
    /// Silent not-found.
    NotFound,
    /// Permission refusal.
    Forbidden,
    /// Throttled.
    RateLimited,
    /// Account lockout.
    Locked,
    /// Everything else, surfaced as-is.
    ServerFault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verdict {
    Success,
    Recover(Recovery),
    Fail(Terminal),
}

/// Applies the decision table. `refresh_allowed` is false when the caller
/// opted out of silent refresh for this request.
pub(crate) fn verdict(
    status: u16,
    body: &Value,
    path: &str,
    refresh_allowed: bool,
    pass: Pass,
) -> Verdict {
    match status {
        200..=299 => Verdict::Success,
        401 => unauthorized(path, refresh_allowed, pass),
        403 if is_csrf_failure(body) => match pass {
            Pass::First => Verdict::Recover(Recovery::ReissueCsrf),
            Pass::Retry => Verdict::Fail(Terminal::CsrfRejected),
        },
        403 => Verdict::Fail(Terminal::Forbidden),
        404 => not_found(path),
        423 => Verdict::Fail(Terminal::Locked),
        429 => Verdict::Fail(Terminal::RateLimited),
        _ => Verdict::Fail(Terminal::ServerFault),
    }
}

fn unauthorized(path: &str, refresh_allowed: bool, pass: Pass) -> Verdict {
    if pass == Pass::First && refresh_allowed && !routes::is_auth_flow(path) {
        return Verdict::Recover(Recovery::RefreshToken);
    }
    Verdict::Fail(auth_failure(path))
}

/// The terminal 401 rule: a rejected auth-flow call touches nothing
/// (a mistyped password is not a dead session); public content and the
/// identity probe clear credentials without forcing navigation;
/// everything protected redirects to login.
pub(crate) fn auth_failure(path: &str) -> Terminal {
    if routes::is_auth_flow(path) {
        return Terminal::LoginRejected;
    }
    let keep_view = routes::is_public_content(path) || routes::is_identity_check(path);
    Terminal::AuthFailure {
        redirect: !keep_view,
    }
}

fn not_found(path: &str) -> Verdict {
    if routes::is_identity_check(path) {
        // The session's own identity vanished: treat like a dead session,
        // not like missing content.
        return Verdict::Fail(Terminal::AuthFailure { redirect: true });
    }
    Verdict::Fail(Terminal::NotFound)
}

/// A 403 is a CSRF failure when the server says so, by error code or by
/// wording.
fn is_csrf_failure(body: &Value) -> bool {
    if body
        .get("code")
        .and_then(Value::as_str)
        .is_some_and(|code| code.eq_ignore_ascii_case("EBADCSRFTOKEN"))
    {
        return true;
    }
    ["error", "message"].iter().any(|field| {
        body.get(*field)
            .and_then(Value::as_str)
            .is_some_and(|text| text.to_ascii_lowercase().contains("csrf"))
    })
}

/// Best-effort human message out of an error body.
pub(crate) fn server_message(body: &Value) -> Option<String> {
    ["message", "error", "detail"]
        .iter()
        .find_map(|field| body.get(*field).and_then(Value::as_str))
        .map(String::from)
}
