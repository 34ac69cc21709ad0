//! Resource-grouped call surface.
//!
//! Each group is a cheap borrowing handle over the [`ApiClient`]; all
//! policy (tokens, CSRF, cache, dedup, classification) stays in the
//! gateway. Groups add only paths, payload shapes, and typed parsing.

mod auth;
mod categories;
mod collaborations;
mod comments;
mod follows;
mod images;
mod newsletters;
mod polls;
mod posts;
mod search;
mod templates;
mod users;

pub use auth::AuthApi;
pub use categories::CategoriesApi;
pub use collaborations::CollaborationsApi;
pub use comments::CommentsApi;
pub use follows::FollowsApi;
pub use images::ImagesApi;
pub use newsletters::NewslettersApi;
pub use polls::PollsApi;
pub use posts::PostsApi;
pub use search::SearchApi;
pub use templates::TemplatesApi;
pub use users::UsersApi;

use crate::gateway::ApiClient;
use inkpress_types::{GatewayError, traits::Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

impl ApiClient {
    #[must_use]
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    #[must_use]
    pub fn posts(&self) -> PostsApi<'_> {
        PostsApi::new(self)
    }

    #[must_use]
    pub fn comments(&self) -> CommentsApi<'_> {
        CommentsApi::new(self)
    }

    #[must_use]
    pub fn categories(&self) -> CategoriesApi<'_> {
        CategoriesApi::new(self)
    }

    #[must_use]
    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }

    #[must_use]
    pub fn newsletters(&self) -> NewslettersApi<'_> {
        NewslettersApi::new(self)
    }

    #[must_use]
    pub fn search(&self) -> SearchApi<'_> {
        SearchApi::new(self)
    }

    #[must_use]
    pub fn images(&self) -> ImagesApi<'_> {
        ImagesApi::new(self)
    }

    #[must_use]
    pub fn polls(&self) -> PollsApi<'_> {
        PollsApi::new(self)
    }

    #[must_use]
    pub fn follows(&self) -> FollowsApi<'_> {
        FollowsApi::new(self)
    }

    #[must_use]
    pub fn collaborations(&self) -> CollaborationsApi<'_> {
        CollaborationsApi::new(self)
    }

    #[must_use]
    pub fn templates(&self) -> TemplatesApi<'_> {
        TemplatesApi::new(self)
    }
}

/// Reads a typed list that some endpoints return bare and others wrap
/// under a named field.
pub(crate) fn collection<T: DeserializeOwned>(data: &Value, key: &str) -> Result<Vec<T>> {
    let raw = if data.is_array() {
        data
    } else {
        data.get(key)
            .ok_or_else(|| GatewayError::Decode(format!("reply missing `{key}` collection")))?
    };
    serde_json::from_value(raw.clone()).map_err(|e| GatewayError::Decode(e.to_string()))
}

/// Reads a typed object that some endpoints return bare and others wrap
/// under a named field.
pub(crate) fn single<T: DeserializeOwned>(data: &Value, key: &str) -> Result<T> {
    let raw = data.get(key).unwrap_or(data);
    serde_json::from_value(raw.clone()).map_err(|e| GatewayError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkpress_types::Category;
    use serde_json::json;

    #[test]
    fn test_collection_accepts_bare_and_wrapped() {
        let bare = json!([{ "_id": "c1", "name": "Rust", "slug": "rust" }]);
        let wrapped = json!({ "categories": [{ "_id": "c1", "name": "Rust", "slug": "rust" }] });
        let a: Vec<Category> = collection(&bare, "categories").unwrap();
        let b: Vec<Category> = collection(&wrapped, "categories").unwrap();
        assert_eq!(a, b);
        assert!(collection::<Category>(&json!({}), "categories").is_err());
    }

    #[test]
    fn test_single_prefers_wrapped_field() {
        let wrapped = json!({ "category": { "_id": "c1", "name": "Rust", "slug": "rust" } });
        let cat: Category = single(&wrapped, "category").unwrap();
        assert_eq!(cat.slug.as_deref(), Some("rust"));
    }
}
