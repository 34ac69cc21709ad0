//! Typed content models with pinned field normalization.
//!
//! The platform API has served several spellings for the same field over
//! its history (`id` vs `_id`, camelCase vs snake_case). Each model pins
//! the accepted spellings with serde aliases so downstream code never
//! probes alternatives dynamically.

use serde::{Deserialize, Serialize};

/// A published or draft post as the server returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, alias = "body")]
    pub content: String,
    #[serde(default, alias = "categoryId")]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, alias = "authorName")]
    pub author: Option<String>,
    #[serde(default, alias = "isPublished")]
    pub published: bool,
    #[serde(default, alias = "commentCount")]
    pub comment_count: Option<u64>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
    #[serde(default, alias = "updatedAt")]
    pub updated_at: Option<String>,
}

/// A content category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "postCount")]
    pub post_count: Option<u64>,
}

/// Public profile of an author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorProfile {
    #[serde(alias = "_id")]
    pub id: String,
    pub username: String,
    #[serde(default, alias = "displayName")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, alias = "avatarUrl")]
    pub avatar_url: Option<String>,
    #[serde(default, alias = "followerCount")]
    pub follower_count: Option<u64>,
}

/// A comment on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "postId")]
    pub post_id: String,
    #[serde(default, alias = "authorName")]
    pub author: Option<String>,
    pub content: String,
    #[serde(default)]
    pub approved: bool,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
}

/// A locally persisted editor draft. The gateway never sends drafts to the
/// server; the editor owns their lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Unix timestamp (seconds) of the last local edit.
    pub updated_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_post_accepts_legacy_spellings() {
        let raw = json!({
            "_id": "p1",
            "title": "Hello",
            "body": "first post",
            "categoryId": "c9",
            "isPublished": true,
            "commentCount": 3,
            "createdAt": "2026-01-01T00:00:00Z"
        });
        let post: Post = serde_json::from_value(raw).unwrap();
        assert_eq!(post.id, "p1");
        assert_eq!(post.content, "first post");
        assert_eq!(post.category.as_deref(), Some("c9"));
        assert!(post.published);
        assert_eq!(post.comment_count, Some(3));
    }

    #[test]
    fn test_post_accepts_canonical_spellings() {
        let raw = json!({
            "id": "p2",
            "title": "Plain",
            "content": "text",
            "published": false
        });
        let post: Post = serde_json::from_value(raw).unwrap();
        assert_eq!(post.id, "p2");
        assert_eq!(post.content, "text");
        assert!(!post.published);
        assert!(post.tags.is_empty());
    }

    #[test]
    fn test_author_profile_aliases() {
        let raw = json!({
            "_id": "u1",
            "username": "ada",
            "displayName": "Ada L.",
            "followerCount": 12
        });
        let author: AuthorProfile = serde_json::from_value(raw).unwrap();
        assert_eq!(author.display_name.as_deref(), Some("Ada L."));
        assert_eq!(author.follower_count, Some(12));
    }

    #[test]
    fn test_comment_requires_post_id() {
        let raw = json!({"id": "c1", "content": "nice"});
        assert!(serde_json::from_value::<Comment>(raw).is_err());
    }
}
