//! Reusable post templates.

use crate::gateway::ApiClient;
use inkpress_types::{Envelope, traits::Result};
use serde_json::Value;

pub struct TemplatesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> TemplatesApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// The signed-in author's templates.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn list(&self) -> Result<Envelope> {
        self.client.get("/templates", &[]).await
    }

    /// Saves a template.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn save(&self, payload: Value) -> Result<Envelope> {
        self.client.post("/templates/create", payload).await
    }

    /// Deletes a template.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn remove(&self, id: &str) -> Result<Envelope> {
        self.client.delete(&format!("/templates/{id}")).await
    }
}
