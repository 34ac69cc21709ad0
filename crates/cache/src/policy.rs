//! Which responses are cacheable, and for how long.

use http::Method;
use std::time::Duration;

/// Resource families with distinct cache lifetimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceClass {
    /// Post lists and individual posts.
    Posts,
    /// Category listings; these change rarely.
    Categories,
    /// Notifications; near-real-time, kept barely long enough to absorb
    /// burst refetches.
    Notifications,
    /// Public author profiles.
    AuthorProfile,
    /// Anything else on the allow-list.
    Other,
}

impl ResourceClass {
    /// Classifies a request path by its leading segment.
    #[must_use]
    pub fn of(path: &str) -> Self {
        let head = path
            .trim_start_matches('/')
            .split(['/', '?'])
            .next()
            .unwrap_or_default();
        match head {
            "posts" => Self::Posts,
            "categories" => Self::Categories,
            "notifications" => Self::Notifications,
            "authors" => Self::AuthorProfile,
            _ => Self::Other,
        }
    }
}

/// The TTL table plus the allow-list of cacheable path prefixes.
///
/// Only idempotent GETs get cached, and only against allow-listed paths:
/// everything authenticated-and-personal stays out so a shared screen never
/// replays another session's data after re-login.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    pub ttl_posts: Duration,
    pub ttl_categories: Duration,
    pub ttl_notifications: Duration,
    pub ttl_author_profile: Duration,
    pub ttl_default: Duration,
    pub cacheable_prefixes: Vec<String>,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            ttl_posts: Duration::from_secs(120),
            ttl_categories: Duration::from_secs(600),
            ttl_notifications: Duration::from_secs(30),
            ttl_author_profile: Duration::from_secs(300),
            ttl_default: Duration::from_secs(60),
            cacheable_prefixes: default_prefixes(),
        }
    }
}

/// Built-in allow-list of cacheable path prefixes.
#[must_use]
pub fn default_prefixes() -> Vec<String> {
    ["/posts", "/categories", "/notifications", "/authors", "/tags", "/search"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl CachePolicy {
    /// Returns `true` when a response for this request may be stored.
    #[must_use]
    pub fn should_cache(&self, method: &Method, path: &str) -> bool {
        *method == Method::GET
            && self
                .cacheable_prefixes
                .iter()
                .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// TTL for a path, by resource class.
    #[must_use]
    pub fn ttl(&self, path: &str) -> Duration {
        match ResourceClass::of(path) {
            ResourceClass::Posts => self.ttl_posts,
            ResourceClass::Categories => self.ttl_categories,
            ResourceClass::Notifications => self.ttl_notifications,
            ResourceClass::AuthorProfile => self.ttl_author_profile,
            ResourceClass::Other => self.ttl_default,
        }
    }
}
