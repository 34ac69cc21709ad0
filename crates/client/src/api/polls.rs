//! Reader polls. Votes invalidate the posts family because results
//! render inline in post bodies.

use crate::gateway::ApiClient;
use inkpress_types::{Envelope, traits::Result};
use serde_json::{Value, json};

pub struct PollsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> PollsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Current results for one poll.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn results(&self, id: &str) -> Result<Envelope> {
        self.client.get(&format!("/polls/{id}"), &[]).await
    }

    /// Casts a vote.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn vote(&self, id: &str, option: &str) -> Result<Envelope> {
        self.client
            .post(&format!("/polls/{id}/vote"), json!({ "option": option }))
            .await
    }

    /// Creates a poll attached to a post.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn create(&self, payload: Value) -> Result<Envelope> {
        self.client.post("/polls/create", payload).await
    }
}
