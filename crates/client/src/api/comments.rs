//! Comments. Writes here invalidate the posts family too, since comment
//! counts render inline on cached post lists.

use crate::api::collection;
use crate::gateway::ApiClient;
use inkpress_types::{Comment, Envelope, traits::Result};
use serde_json::json;

pub struct CommentsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> CommentsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Approved comments on one post.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn for_post(&self, post_id: &str) -> Result<Vec<Comment>> {
        let envelope = self
            .client
            .get(&format!("/comments/post/{post_id}"), &[])
            .await?;
        collection(&envelope.data, "comments")
    }

    /// Adds a comment to a post.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn add(&self, post_id: &str, content: &str) -> Result<Envelope> {
        self.client
            .post(
                "/comments/create",
                json!({ "postId": post_id, "content": content }),
            )
            .await
    }

    /// Deletes a comment (own, or any when moderating).
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn remove(&self, id: &str) -> Result<Envelope> {
        self.client.delete(&format!("/comments/{id}")).await
    }
}
