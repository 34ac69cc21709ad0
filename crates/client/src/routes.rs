//! Endpoint identity.
//!
//! The failure classifier keys on what an endpoint *is*, never on who asked
//! or what was on screen: the same path always classifies the same way.
//! This module owns those identity predicates plus the invalidation
//! families for writes.

/// The primary public listing endpoint. A 404 here is a routing defect,
/// not a content miss, and is logged as such.
pub const POSTS_LIST: &str = "/posts";

/// The session identity probe.
pub const IDENTITY: &str = "/auth/me";

/// Read paths that stay meaningful for anonymous sessions.
const PUBLIC_CONTENT: &[&str] = &["/posts", "/categories", "/tags", "/authors", "/search"];

/// Endpoints that mint or destroy sessions. Failures here must never
/// trigger a token refresh; a failed login is not a stale session.
const AUTH_FLOW: &[&str] = &[
    "/auth/login",
    "/auth/register",
    "/auth/refresh",
    "/auth/logout",
    "/auth/csrf-token",
    "/auth/forgot-password",
    "/auth/reset-password",
];

fn bare(path: &str) -> &str {
    path.split('?').next().unwrap_or(path)
}

fn head_matches(path: &str, prefix: &str) -> bool {
    let bare = bare(path);
    bare == prefix || bare.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
}

/// Returns `true` for endpoints in the login/refresh/logout flow itself.
/// The identity probe is deliberately not one of them: a 401 there is an
/// ordinary stale-session signal.
#[must_use]
pub fn is_auth_flow(path: &str) -> bool {
    AUTH_FLOW.iter().any(|p| head_matches(path, p))
}

/// Returns `true` for read paths that stay meaningful when anonymous.
#[must_use]
pub fn is_public_content(path: &str) -> bool {
    PUBLIC_CONTENT.iter().any(|p| head_matches(path, p))
}

/// Returns `true` only for the unambiguous session identity probe.
#[must_use]
pub fn is_identity_check(path: &str) -> bool {
    bare(path) == IDENTITY
}

/// Returns `true` for the primary list-posts endpoint, no trailing
/// segments.
#[must_use]
pub fn is_posts_list(path: &str) -> bool {
    bare(path) == POSTS_LIST
}

/// Cache families a successful write must invalidate, keyed by the write's
/// leading path segment.
///
/// Families whose cached content embeds the mutated resource are included:
/// comment counts ride on posts, category labels ride on posts, poll
/// results render inline in posts, follows surface in author profiles and
/// notifications.
#[must_use]
pub fn invalidation_prefixes(path: &str) -> &'static [&'static str] {
    let head = bare(path)
        .trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or_default();
    match head {
        "posts" => &["/posts", "/search"],
        "comments" => &["/comments", "/posts"],
        "categories" => &["/categories", "/posts"],
        "polls" => &["/polls", "/posts"],
        "follows" => &["/authors", "/notifications"],
        "users" | "admin" => &["/authors", "/notifications"],
        "collaborations" => &["/collaborations", "/notifications"],
        "newsletters" => &["/newsletters"],
        "images" => &["/images"],
        "templates" => &["/templates"],
        "notifications" => &["/notifications"],
        _ => &[],
    }
}
