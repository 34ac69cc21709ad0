//! Uploaded images. Payloads are JSON (data-URL content), matching the
//! platform's editor upload shape.

use crate::gateway::ApiClient;
use inkpress_types::{Envelope, traits::Result};
use serde_json::json;

pub struct ImagesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ImagesApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// The signed-in author's uploads.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn list(&self) -> Result<Envelope> {
        self.client.get("/images", &[]).await
    }

    /// Uploads one image as a data URL.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn upload(&self, name: &str, data_url: &str) -> Result<Envelope> {
        self.client
            .post("/images/upload", json!({ "name": name, "data": data_url }))
            .await
    }

    /// Deletes an upload.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn remove(&self, id: &str) -> Result<Envelope> {
        self.client.delete(&format!("/images/{id}")).await
    }
}
