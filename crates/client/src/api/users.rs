//! Author profiles, notifications, and the admin user surface.

use crate::api::{collection, single};
use crate::gateway::ApiClient;
use inkpress_types::{AuthorProfile, Envelope, traits::Result};
use serde_json::{Value, json};

pub struct UsersApi<'a> {
    client: &'a ApiClient,
}

impl<'a> UsersApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Public profile of one author.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn author(&self, username: &str) -> Result<AuthorProfile> {
        let envelope = self.client.get(&format!("/authors/{username}"), &[]).await?;
        single(&envelope.data, "author")
    }

    /// Updates the signed-in user's own profile.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn update_profile(&self, payload: Value) -> Result<Envelope> {
        self.client.put("/users/profile", payload).await
    }

    /// The signed-in user's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn notifications(&self) -> Result<Envelope> {
        self.client.get("/notifications", &[]).await
    }

    /// Marks one notification read.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn mark_read(&self, id: &str) -> Result<Envelope> {
        self.client
            .patch(&format!("/notifications/{id}/read"), json!({}))
            .await
    }

    /// Lists all accounts (admin).
    ///
    /// # Errors
    ///
    /// Non-admin sessions see [`inkpress_types::GatewayError::Forbidden`].
    pub async fn admin_list(&self) -> Result<Vec<AuthorProfile>> {
        let envelope = self.client.get("/admin/users", &[]).await?;
        collection(&envelope.data, "users")
    }

    /// Changes an account's role (admin).
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn set_role(&self, id: &str, role: &str) -> Result<Envelope> {
        self.client
            .patch(&format!("/admin/users/{id}/role"), json!({ "role": role }))
            .await
    }
}
