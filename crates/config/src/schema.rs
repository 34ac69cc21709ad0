use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_base_url() -> String {
    "http://localhost:4000/api".to_string()
}

fn default_ttl_posts() -> u64 {
    120
}
fn default_ttl_categories() -> u64 {
    600
}
fn default_ttl_notifications() -> u64 {
    30
}
fn default_ttl_author_profile() -> u64 {
    300
}
fn default_ttl_fallback() -> u64 {
    60
}

fn default_cacheable_prefixes() -> Vec<String> {
    ["/posts", "/categories", "/notifications", "/authors", "/tags", "/search"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Cache lifetimes, in seconds, per resource class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheTtlConfig {
    #[serde(default = "default_ttl_posts")]
    pub posts: u64,
    #[serde(default = "default_ttl_categories")]
    pub categories: u64,
    #[serde(default = "default_ttl_notifications")]
    pub notifications: u64,
    #[serde(default = "default_ttl_author_profile")]
    pub author_profile: u64,
    /// Applied to allow-listed paths outside the named classes.
    #[serde(default = "default_ttl_fallback")]
    pub fallback: u64,
}

impl Default for CacheTtlConfig {
    fn default() -> Self {
        Self {
            posts: default_ttl_posts(),
            categories: default_ttl_categories(),
            notifications: default_ttl_notifications(),
            author_profile: default_ttl_author_profile(),
            fallback: default_ttl_fallback(),
        }
    }
}

/// Top-level client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API root every request path is appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds; `None` keeps the transport default.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Retry a throttled call once after the advertised wait. Off by
    /// default: pacing is the caller's decision.
    #[serde(default)]
    pub auto_retry_rate_limited: bool,
    /// Cache lifetimes per resource class.
    #[serde(default)]
    pub cache_ttl: CacheTtlConfig,
    /// Path prefixes whose GETs may be cached.
    #[serde(default = "default_cacheable_prefixes")]
    pub cacheable_prefixes: Vec<String>,
    /// Session file location; `None` uses `~/.inkpress/session.json`.
    #[serde(default)]
    pub session_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: None,
            auto_retry_rate_limited: false,
            cache_ttl: CacheTtlConfig::default(),
            cacheable_prefixes: default_cacheable_prefixes(),
            session_file: None,
        }
    }
}

impl Config {
    /// Parses configuration from a YAML string, merged with defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the YAML is invalid or extraction fails.
    #[allow(clippy::result_large_err)]
    pub fn from_yaml(yaml: &str) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Format as _, Serialized, Yaml},
        };
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::string(yaml))
            .extract()
    }

    /// Loads configuration from a file path, merged with defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the file cannot be read or parsed.
    #[allow(clippy::result_large_err)]
    pub fn from_file(path: &std::path::Path) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Format as _, Serialized, Yaml},
        };
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_YAML: &str = r#"
base_url: "https://blog.example.com/api"
request_timeout_secs: 15
auto_retry_rate_limited: true
cache_ttl:
  posts: 60
  notifications: 10
cacheable_prefixes:
  - /posts
  - /categories
session_file: "/tmp/inkpress-test/session.json"
"#;

    #[test]
    fn test_default_config() {
        let c = Config::default();
        assert_eq!(c.base_url, "http://localhost:4000/api");
        assert_eq!(c.request_timeout_secs, None);
        assert!(!c.auto_retry_rate_limited);
        assert_eq!(c.cache_ttl.posts, 120);
        assert_eq!(c.cache_ttl.categories, 600);
        assert_eq!(c.cache_ttl.notifications, 30);
        assert_eq!(c.cache_ttl.author_profile, 300);
        assert_eq!(c.cache_ttl.fallback, 60);
        assert!(c.cacheable_prefixes.contains(&"/search".to_string()));
        assert!(c.session_file.is_none());
    }

    #[test]
    fn test_from_yaml_overrides() {
        let c = Config::from_yaml(SAMPLE_YAML).unwrap();
        assert_eq!(c.base_url, "https://blog.example.com/api");
        assert_eq!(c.request_timeout_secs, Some(15));
        assert!(c.auto_retry_rate_limited);
        assert_eq!(
            c.session_file.as_deref(),
            Some(std::path::Path::new("/tmp/inkpress-test/session.json"))
        );
    }

    #[test]
    fn test_from_yaml_partial_ttl_keeps_defaults() {
        let c = Config::from_yaml(SAMPLE_YAML).unwrap();
        assert_eq!(c.cache_ttl.posts, 60);
        assert_eq!(c.cache_ttl.notifications, 10);
        // Untouched classes keep their defaults.
        assert_eq!(c.cache_ttl.categories, 600);
        assert_eq!(c.cache_ttl.author_profile, 300);
    }

    #[test]
    fn test_from_yaml_replaces_prefix_list() {
        let c = Config::from_yaml(SAMPLE_YAML).unwrap();
        assert_eq!(c.cacheable_prefixes, vec!["/posts", "/categories"]);
    }

    #[test]
    fn test_from_yaml_empty_uses_defaults() {
        let c = Config::from_yaml("").unwrap();
        assert_eq!(c.base_url, "http://localhost:4000/api");
        assert_eq!(c.cache_ttl.posts, 120);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inkpress.yaml");
        std::fs::write(&path, SAMPLE_YAML).unwrap();
        let c = Config::from_file(&path).unwrap();
        assert_eq!(c.base_url, "https://blog.example.com/api");
    }
}
