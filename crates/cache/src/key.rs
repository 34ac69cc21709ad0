//! Cache-key normalization.
//!
//! A read can arrive as `"/posts?limit=10"` or as `"/posts"` plus an
//! explicit params list; both must collide to one key so a cached response
//! is reused regardless of call style. Explicit params win over values
//! embedded in the path, and params stay sorted so insertion order never
//! matters.

use std::collections::BTreeMap;
use std::fmt;

/// Normalized identity of a cacheable request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    path: String,
    params: BTreeMap<String, String>,
}

impl CacheKey {
    /// Builds a key from a path (optionally carrying an embedded query
    /// string) and explicit params.
    pub fn new<K, V>(path: &str, params: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let (path, mut merged) = split_query(path);
        for (k, v) in params {
            merged.insert(k.as_ref().to_string(), v.as_ref().to_string());
        }
        Self {
            path,
            params: merged,
        }
    }

    /// The bare path, query stripped.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query pairs in sorted order.
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns `true` when the key's path begins with `prefix`.
    #[must_use]
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        self.path.starts_with(prefix)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)?;
        for (i, (k, v)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{k}={v}")?;
        }
        Ok(())
    }
}

fn split_query(path: &str) -> (String, BTreeMap<String, String>) {
    let Some((bare, query)) = path.split_once('?') else {
        return (path.to_string(), BTreeMap::new());
    };
    let mut params = BTreeMap::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        match pair.split_once('=') {
            Some((k, v)) => params.insert(k.to_string(), v.to_string()),
            None => params.insert(pair.to_string(), String::new()),
        };
    }
    (bare.to_string(), params)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_PARAMS: &[(&str, &str)] = &[];

    #[test]
    fn test_embedded_and_explicit_styles_collide() {
        let embedded = CacheKey::new("/posts?limit=10", NO_PARAMS);
        let explicit = CacheKey::new("/posts", &[("limit", "10")]);
        assert_eq!(embedded, explicit);
    }

    #[test]
    fn test_param_order_does_not_matter() {
        let a = CacheKey::new("/posts", &[("limit", "10"), ("sort", "new")]);
        let b = CacheKey::new("/posts", &[("sort", "new"), ("limit", "10")]);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "/posts?limit=10&sort=new");
    }

    #[test]
    fn test_explicit_params_win_over_embedded() {
        let key = CacheKey::new("/posts?limit=10", &[("limit", "25")]);
        assert_eq!(key.to_string(), "/posts?limit=25");
    }

    #[test]
    fn test_bare_path_display() {
        let key = CacheKey::new("/categories", NO_PARAMS);
        assert_eq!(key.to_string(), "/categories");
        assert_eq!(key.path(), "/categories");
    }

    #[test]
    fn test_valueless_and_empty_pairs() {
        let key = CacheKey::new("/search?q=&draft&", NO_PARAMS);
        assert_eq!(key.to_string(), "/search?draft=&q=");
    }

    #[test]
    fn test_prefix_matching() {
        let key = CacheKey::new("/posts/my-slug?full=1", NO_PARAMS);
        assert!(key.matches_prefix("/posts"));
        assert!(key.matches_prefix("/posts/my-slug"));
        assert!(!key.matches_prefix("/categories"));
    }
}
