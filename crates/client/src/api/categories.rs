//! Categories.

use crate::api::{collection, single};
use crate::gateway::ApiClient;
use inkpress_types::{Category, Envelope, traits::Result};
use serde_json::Value;

pub struct CategoriesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> CategoriesApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// All categories. Served from cache for up to the categories TTL.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn list(&self) -> Result<Vec<Category>> {
        let envelope = self.client.get("/categories", &[]).await?;
        collection(&envelope.data, "categories")
    }

    /// One category by slug or id.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn get(&self, slug: &str) -> Result<Category> {
        let envelope = self.client.get(&format!("/categories/{slug}"), &[]).await?;
        single(&envelope.data, "category")
    }

    /// Creates a category (admin).
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn create(&self, payload: Value) -> Result<Envelope> {
        self.client.post("/categories/create", payload).await
    }

    /// Deletes a category (admin).
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn remove(&self, id: &str) -> Result<Envelope> {
        self.client.delete(&format!("/categories/{id}")).await
    }
}
