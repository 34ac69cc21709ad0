//! Author follow graph. Writes invalidate author profiles and
//! notifications, where follower counts and follow events surface.

use crate::api::collection;
use crate::gateway::ApiClient;
use inkpress_types::{AuthorProfile, Envelope, traits::Result};
use serde_json::json;

pub struct FollowsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> FollowsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Follows an author.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn follow(&self, username: &str) -> Result<Envelope> {
        self.client
            .post(&format!("/follows/{username}"), json!({}))
            .await
    }

    /// Unfollows an author.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn unfollow(&self, username: &str) -> Result<Envelope> {
        self.client.delete(&format!("/follows/{username}")).await
    }

    /// Who follows the given author.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn followers(&self, username: &str) -> Result<Vec<AuthorProfile>> {
        let envelope = self
            .client
            .get(&format!("/follows/followers/{username}"), &[])
            .await?;
        collection(&envelope.data, "followers")
    }
}
