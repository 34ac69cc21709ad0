//! Session lifecycle: login, logout, registration, identity.
//!
//! Login and registration run with `no_refresh` (a rejected password must
//! never trigger a token rotation) and install the returned credential
//! through the token manager so it is persisted. Both login and logout
//! clear the response cache: cached reads must never cross sessions.

use crate::api::single;
use crate::gateway::{ApiClient, ApiRequest};
use crate::routes;
use inkpress_auth::parse_credential;
use inkpress_types::{AuthorProfile, Envelope, GatewayError, traits::Result};
use reqwest::Method;
use serde_json::json;

pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Signs in and installs the returned credential.
    ///
    /// # Errors
    ///
    /// Classified per the failure table; a 423 lockout surfaces as
    /// [`GatewayError::AccountLocked`]. [`GatewayError::Decode`] when the
    /// reply carries no access token.
    pub async fn login(&self, email: &str, password: &str) -> Result<Envelope> {
        let envelope = self
            .client
            .send(
                ApiRequest::new(Method::POST, "/auth/login")
                    .body(json!({ "email": email, "password": password }))
                    .no_refresh(),
            )
            .await?;
        self.adopt(&envelope).await?;
        Ok(envelope)
    }

    /// Creates an account; the server signs the new account in, so the
    /// returned credential is installed like a login.
    ///
    /// # Errors
    ///
    /// Classified per the failure table; [`GatewayError::Decode`] when the
    /// reply carries no access token.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<Envelope> {
        let envelope = self
            .client
            .send(
                ApiRequest::new(Method::POST, "/auth/register")
                    .body(json!({
                        "username": username,
                        "email": email,
                        "password": password
                    }))
                    .no_refresh(),
            )
            .await?;
        self.adopt(&envelope).await?;
        Ok(envelope)
    }

    /// Signs out. Local session state (credential, anti-forgery token,
    /// cached reads) is cleared even when the server call fails; a dead
    /// backend must not pin a session on this machine.
    ///
    /// # Errors
    ///
    /// Propagates the session store's clear failure.
    pub async fn logout(&self) -> Result<()> {
        let call = self
            .client
            .send(ApiRequest::new(Method::POST, "/auth/logout").no_refresh())
            .await;
        if let Err(e) = call {
            tracing::debug!(error = %e, "server logout failed, clearing local session anyway");
        }
        self.client.tokens().clear().await?;
        self.client.csrf().invalidate();
        self.client.clear_cache();
        Ok(())
    }

    /// The signed-in author's own profile.
    ///
    /// # Errors
    ///
    /// A dead session surfaces as [`GatewayError::AuthInvalid`] after the
    /// single refresh attempt.
    pub async fn me(&self) -> Result<AuthorProfile> {
        let envelope = self.client.get(routes::IDENTITY, &[]).await?;
        single(&envelope.data, "user")
    }

    /// Requests a password-reset email.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn forgot_password(&self, email: &str) -> Result<Envelope> {
        self.client
            .send(
                ApiRequest::new(Method::POST, "/auth/forgot-password")
                    .body(json!({ "email": email }))
                    .no_refresh(),
            )
            .await
    }

    /// Completes a password reset with an emailed token.
    ///
    /// # Errors
    ///
    /// Classified per the failure table.
    pub async fn reset_password(&self, token: &str, password: &str) -> Result<Envelope> {
        self.client
            .send(
                ApiRequest::new(Method::POST, "/auth/reset-password")
                    .body(json!({ "token": token, "password": password }))
                    .no_refresh(),
            )
            .await
    }

    /// Installs the credential from a token-bearing reply and drops every
    /// cached read from the previous (or anonymous) session.
    async fn adopt(&self, envelope: &Envelope) -> Result<()> {
        let cred = parse_credential(&envelope.data)
            .ok_or_else(|| GatewayError::Decode("reply carries no access token".to_string()))?;
        self.client.tokens().install(cred).await?;
        self.client.clear_cache();
        Ok(())
    }
}
