//! Posts: listing, reading, authoring.

use crate::api::{collection, single};
use crate::gateway::ApiClient;
use crate::routes;
use inkpress_types::{Envelope, Post, traits::Result};
use serde_json::{Value, json};

pub struct PostsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> PostsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Published posts, newest first. `limit` and `page` are optional.
    ///
    /// # Errors
    ///
    /// Classified per the failure table; [`inkpress_types::GatewayError::Decode`]
    /// when the reply shape is unrecognizable.
    pub async fn list(&self, limit: Option<u32>, page: Option<u32>) -> Result<Vec<Post>> {
        let mut params: Vec<(String, String)> = Vec::new();
        if let Some(limit) = limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(page) = page {
            params.push(("page".to_string(), page.to_string()));
        }
        let params: Vec<(&str, &str)> = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let envelope = self.client.get(routes::POSTS_LIST, &params).await?;
        collection(&envelope.data, "posts")
    }

    /// One post by slug or id.
    ///
    /// # Errors
    ///
    /// A missing post is the silent [`inkpress_types::GatewayError::NotFound`].
    pub async fn get(&self, slug: &str) -> Result<Post> {
        let envelope = self.client.get(&format!("/posts/{slug}"), &[]).await?;
        single(&envelope.data, "post")
    }

    /// Posts in one category.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn by_category(&self, slug: &str) -> Result<Vec<Post>> {
        let envelope = self
            .client
            .get(&format!("/posts/category/{slug}"), &[])
            .await?;
        collection(&envelope.data, "posts")
    }

    /// The signed-in author's own posts, drafts included.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn mine(&self) -> Result<Vec<Post>> {
        let envelope = self.client.get("/posts/my-posts", &[]).await?;
        collection(&envelope.data, "posts")
    }

    /// Publishes a new post. Invalidates the posts and search families.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn create(&self, payload: Value) -> Result<Envelope> {
        self.client.post("/posts/create", payload).await
    }

    /// Updates an existing post.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn update(&self, id: &str, payload: Value) -> Result<Envelope> {
        self.client.put(&format!("/posts/{id}"), payload).await
    }

    /// Deletes a post.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn delete(&self, id: &str) -> Result<Envelope> {
        self.client.delete(&format!("/posts/{id}")).await
    }

    /// Toggles the like flag on a post.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn like(&self, id: &str) -> Result<Envelope> {
        self.client
            .post(&format!("/posts/{id}/like"), json!({}))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkpress_config::Config;
    use inkpress_store::InMemorySessionStore;
    use std::sync::Arc;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        let config = Config {
            base_url: server.uri(),
            ..Config::default()
        };
        ApiClient::new(&config, Arc::new(InMemorySessionStore::new())).unwrap()
    }

    #[tokio::test]
    async fn test_list_parses_wrapped_posts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts"))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "posts": [
                    { "_id": "p1", "title": "One", "body": "a" },
                    { "id": "p2", "title": "Two", "content": "b" }
                ]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let posts = client.posts().list(Some(2), None).await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, "p1");
        assert_eq!(posts[1].content, "b");
    }

    #[tokio::test]
    async fn test_get_parses_bare_post() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts/hello-world"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_id": "p1",
                "title": "Hello World",
                "body": "first"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let post = client.posts().get("hello-world").await.unwrap();
        assert_eq!(post.title, "Hello World");
    }
}
