//! Full-text search. Identical concurrent queries coalesce in the
//! gateway, which matters here: search-as-you-type fires duplicates.

use crate::api::collection;
use crate::gateway::ApiClient;
use inkpress_types::{Envelope, Post, traits::Result};

pub struct SearchApi<'a> {
    client: &'a ApiClient,
}

impl<'a> SearchApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Mixed-type search across the platform.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn query(&self, q: &str) -> Result<Envelope> {
        self.client.get("/search", &[("q", q)]).await
    }

    /// Post-only search, parsed.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn posts(&self, q: &str) -> Result<Vec<Post>> {
        let envelope = self.client.get("/search/posts", &[("q", q)]).await?;
        collection(&envelope.data, "posts")
    }
}
