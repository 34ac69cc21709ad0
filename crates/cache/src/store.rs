//! TTL'd response store with prefix invalidation.

use crate::key::CacheKey;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// The persisted part of a response: status plus parsed body. Headers are
/// deliberately not stored; replays carry a placeholder header map.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResponse {
    pub status: u16,
    pub data: Value,
}

#[derive(Debug)]
struct CacheEntry {
    payload: CachedResponse,
    expires_at: Instant,
}

/// In-memory response cache keyed by [`CacheKey`].
///
/// Expiry is strict: an entry is served only while `now < expires_at`, so
/// an entry exactly at its deadline is already a miss. Eviction is lazy;
/// expired entries are dropped when a lookup touches them.
///
/// Uses `tokio::time::Instant` so tests can drive expiry with a paused
/// clock.
pub struct ResponseCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl ResponseCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Looks up a fresh entry, evicting it if expired.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<CachedResponse> {
        let mut entries = self.entries.lock().expect("cache lock");
        match entries.get(key) {
            Some(entry) if Instant::now() < entry.expires_at => Some(entry.payload.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores a response under `key` for `ttl`.
    pub fn put(&self, key: CacheKey, payload: CachedResponse, ttl: Duration) {
        let entry = CacheEntry {
            payload,
            expires_at: Instant::now() + ttl,
        };
        self.entries.lock().expect("cache lock").insert(key, entry);
    }

    /// Removes every entry whose path starts with `prefix`; returns how
    /// many were dropped.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.entries.lock().expect("cache lock");
        let before = entries.len();
        entries.retain(|key, _| !key.matches_prefix(prefix));
        before - entries.len()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.lock().expect("cache lock").clear();
    }

    /// Number of stored entries, including any not yet lazily evicted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NO_PARAMS: &[(&str, &str)] = &[];

    fn payload(tag: &str) -> CachedResponse {
        CachedResponse {
            status: 200,
            data: json!({ "tag": tag }),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_within_ttl() {
        let cache = ResponseCache::new();
        let key = CacheKey::new("/posts", &[("limit", "10")]);
        cache.put(key.clone(), payload("a"), Duration::from_secs(120));
        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(cache.get(&key), Some(payload("a")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_miss_at_exact_deadline() {
        let cache = ResponseCache::new();
        let key = CacheKey::new("/posts", NO_PARAMS);
        cache.put(key.clone(), payload("a"), Duration::from_secs(5));
        tokio::time::advance(Duration::from_millis(4_999)).await;
        assert!(cache.get(&key).is_some());
        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(cache.get(&key).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_evicted_on_lookup() {
        let cache = ResponseCache::new();
        let key = CacheKey::new("/notifications", NO_PARAMS);
        cache.put(key.clone(), payload("n"), Duration::from_secs(30));
        tokio::time::advance(Duration::from_secs(31)).await;
        assert!(cache.get(&key).is_none());
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_prefix_scope() {
        let cache = ResponseCache::new();
        cache.put(
            CacheKey::new("/posts?limit=10", NO_PARAMS),
            payload("list"),
            Duration::from_secs(120),
        );
        cache.put(
            CacheKey::new("/posts/my-slug", NO_PARAMS),
            payload("one"),
            Duration::from_secs(120),
        );
        cache.put(
            CacheKey::new("/categories", NO_PARAMS),
            payload("cats"),
            Duration::from_secs(600),
        );
        let removed = cache.invalidate_prefix("/posts");
        assert_eq!(removed, 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&CacheKey::new("/categories", NO_PARAMS)).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_prefix_without_matches() {
        let cache = ResponseCache::new();
        cache.put(
            CacheKey::new("/categories", NO_PARAMS),
            payload("cats"),
            Duration::from_secs(600),
        );
        assert_eq!(cache.invalidate_prefix("/polls"), 0);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear() {
        let cache = ResponseCache::new();
        cache.put(
            CacheKey::new("/posts", NO_PARAMS),
            payload("a"),
            Duration::from_secs(120),
        );
        cache.clear();
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_put_replaces_entry_and_ttl() {
        let cache = ResponseCache::new();
        let key = CacheKey::new("/posts", NO_PARAMS);
        cache.put(key.clone(), payload("old"), Duration::from_secs(5));
        tokio::time::advance(Duration::from_secs(4)).await;
        cache.put(key.clone(), payload("new"), Duration::from_secs(5));
        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(cache.get(&key), Some(payload("new")));
    }
}
