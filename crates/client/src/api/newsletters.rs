//! Newsletter subscriptions.

use crate::gateway::ApiClient;
use inkpress_types::{Envelope, traits::Result};
use serde_json::{Value, json};

pub struct NewslettersApi<'a> {
    client: &'a ApiClient,
}

impl<'a> NewslettersApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Subscribes an address. The endpoint is aggressively throttled
    /// server-side; expect [`inkpress_types::GatewayError::RateLimited`]
    /// under repeat calls.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn subscribe(&self, email: &str) -> Result<Envelope> {
        self.client
            .post("/newsletters/subscribe", json!({ "email": email }))
            .await
    }

    /// Removes an address.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn unsubscribe(&self, email: &str) -> Result<Envelope> {
        self.client
            .post("/newsletters/unsubscribe", json!({ "email": email }))
            .await
    }

    /// Past issues (admin).
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn issues(&self) -> Result<Envelope> {
        self.client.get("/newsletters", &[]).await
    }

    /// Sends a new issue to all subscribers (admin).
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn send_issue(&self, payload: Value) -> Result<Envelope> {
        self.client.post("/newsletters/send", payload).await
    }
}
