//! Co-authoring invitations.

use crate::gateway::ApiClient;
use inkpress_types::{Envelope, traits::Result};
use serde_json::json;

pub struct CollaborationsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> CollaborationsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Open invitations involving the signed-in author.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn list(&self) -> Result<Envelope> {
        self.client.get("/collaborations", &[]).await
    }

    /// Invites another author onto a post.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn invite(&self, post_id: &str, username: &str) -> Result<Envelope> {
        self.client
            .post(
                "/collaborations/invite",
                json!({ "postId": post_id, "username": username }),
            )
            .await
    }

    /// Accepts or declines an invitation.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn respond(&self, id: &str, accept: bool) -> Result<Envelope> {
        self.client
            .post(
                &format!("/collaborations/{id}/respond"),
                json!({ "accept": accept }),
            )
            .await
    }
}
