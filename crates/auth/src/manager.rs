//! Access-credential lifecycle: expiry, silent refresh, persistence.
//!
//! Responsibilities:
//! - Hold the process-wide credential singleton, reloading it from the
//!   [`SessionStore`] when the in-memory slot is empty.
//! - Detect expiry (with skew) and refresh against the auth endpoint. The
//!   long-lived refresh credential rides in the transport cookie jar and
//!   is never readable here.
//! - Coalesce concurrent refreshes: callers that observed the same stale
//!   token reuse one rotation instead of racing it, since the server may
//!   reject refresh-credential replay.
//! - Never drop a credential because a refresh failed; transient faults
//!   must not log the user out.

use inkpress_types::{AccessCredential, GatewayError, SessionStore, traits::Result};
use serde::Deserialize;
use std::sync::{Arc, Mutex};

/// Access-token lifetime assumed when the server omits expiry metadata.
const DEFAULT_TOKEN_TTL_SECS: u64 = 15 * 60;

/// Wire shape of the refresh reply. Login replies share it.
#[derive(Debug, Deserialize)]
struct TokenReply {
    #[serde(alias = "accessToken")]
    access_token: String,
    #[serde(default, alias = "expiresIn")]
    expires_in: Option<u64>,
    #[serde(default, alias = "expiresAt")]
    expires_at: Option<u64>,
}

impl TokenReply {
    fn into_credential(self) -> AccessCredential {
        match (self.expires_at, self.expires_in) {
            (Some(at), _) => AccessCredential::new(self.access_token, at),
            (None, Some(ttl)) => AccessCredential::with_ttl(self.access_token, ttl),
            (None, None) => AccessCredential::with_ttl(self.access_token, DEFAULT_TOKEN_TTL_SECS),
        }
    }
}

/// Parses a credential out of a token-bearing reply body (login, register,
/// refresh). Extra fields in the reply are ignored.
#[must_use]
pub fn parse_credential(value: &serde_json::Value) -> Option<AccessCredential> {
    serde_json::from_value::<TokenReply>(value.clone())
        .ok()
        .map(TokenReply::into_credential)
}

pub struct TokenManager {
    http: reqwest::Client,
    refresh_url: String,
    store: Arc<dyn SessionStore>,
    current: Mutex<Option<AccessCredential>>,
    /// Serializes rotations; held across the refresh round trip.
    refresh_gate: tokio::sync::Mutex<()>,
}

impl TokenManager {
    /// The `http` client must share the cookie jar with the rest of the
    /// gateway, otherwise the refresh credential is not sent.
    pub fn new(
        http: reqwest::Client,
        refresh_url: impl Into<String>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            http,
            refresh_url: refresh_url.into(),
            store,
            current: Mutex::new(None),
            refresh_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Current credential, reloading from the session store when the
    /// in-memory slot is empty (a fresh process with a persisted session).
    pub async fn credential(&self) -> Option<AccessCredential> {
        if let Some(cred) = self.current.lock().expect("credential lock").clone() {
            return Some(cred);
        }
        match self.store.load_credential().await {
            Ok(Some(cred)) => {
                *self.current.lock().expect("credential lock") = Some(cred.clone());
                Some(cred)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::debug!(error = %e, "session store read failed");
                None
            }
        }
    }

    /// Bearer token ready to attach, refreshing first when the credential
    /// is stale. Anonymous sessions yield `None`; a failed refresh also
    /// yields `None` so the request proceeds unauthenticated and the
    /// response drives recovery instead.
    pub async fn bearer(&self) -> Option<String> {
        let cred = self.credential().await?;
        if !cred.is_expired() {
            return Some(cred.token);
        }
        match self.refresh_observed(Some(&cred.token)).await {
            Ok(fresh) => Some(fresh.token),
            Err(e) => {
                tracing::debug!(error = %e, "pre-flight refresh failed, proceeding anonymously");
                None
            }
        }
    }

    /// Rotates the credential, coalescing with any rotation already in
    /// flight.
    ///
    /// `observed` is the token the caller saw fail (or found expired). If
    /// a concurrent rotation already replaced it with a fresh one, that
    /// result is reused rather than rotating again.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::AuthExpired`] when the server rejects the
    /// refresh, [`GatewayError::Network`] when it is unreachable.
    pub async fn refresh_observed(&self, observed: Option<&str>) -> Result<AccessCredential> {
        let _gate = self.refresh_gate.lock().await;
        if let Some(observed) = observed
            && let Some(current) = self.current.lock().expect("credential lock").clone()
            && current.token != observed
            && !current.is_expired()
        {
            return Ok(current);
        }
        self.rotate().await
    }

    /// Unconditional rotation, still serialized behind the gate.
    ///
    /// # Errors
    ///
    /// Same as [`Self::refresh_observed`].
    pub async fn refresh(&self) -> Result<AccessCredential> {
        let _gate = self.refresh_gate.lock().await;
        self.rotate().await
    }

    async fn rotate(&self) -> Result<AccessCredential> {
        let response = self.http.post(&self.refresh_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "refresh rejected");
            return Err(GatewayError::AuthExpired);
        }
        let reply: TokenReply = response.json().await?;
        let cred = reply.into_credential();
        *self.current.lock().expect("credential lock") = Some(cred.clone());
        if let Err(e) = self.store.save_credential(&cred).await {
            tracing::warn!(error = %e, "failed to persist rotated credential");
        }
        tracing::debug!("access credential rotated");
        Ok(cred)
    }

    /// Installs a credential obtained outside the refresh flow (login).
    ///
    /// # Errors
    ///
    /// Propagates the session store's save failure.
    pub async fn install(&self, cred: AccessCredential) -> Result<()> {
        *self.current.lock().expect("credential lock") = Some(cred.clone());
        self.store.save_credential(&cred).await
    }

    /// Clears the in-memory credential and the persisted session.
    ///
    /// # Errors
    ///
    /// Propagates the session store's clear failure.
    pub async fn clear(&self) -> Result<()> {
        *self.current.lock().expect("credential lock") = None;
        self.store.clear_credential().await
    }

    /// Returns `true` when a credential exists and is outside the expiry
    /// skew window.
    pub async fn is_authenticated(&self) -> bool {
        self.credential().await.is_some_and(|c| !c.is_expired())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkpress_store::InMemorySessionStore;
    use std::time::{SystemTime, UNIX_EPOCH};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn past_ts(secs: u64) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
            .saturating_sub(secs)
    }

    fn manager_for(server_uri: &str, store: Arc<InMemorySessionStore>) -> TokenManager {
        TokenManager::new(
            reqwest::Client::new(),
            format!("{server_uri}/auth/refresh"),
            store,
        )
    }

    #[tokio::test]
    async fn test_credential_reloaded_from_store() {
        let store = Arc::new(InMemorySessionStore::new());
        store
            .save_credential(&AccessCredential::with_ttl("persisted", 3600))
            .await
            .unwrap();
        let manager = manager_for("http://127.0.0.1:9", store);
        let cred = manager.credential().await.unwrap();
        assert_eq!(cred.token, "persisted");
        assert!(manager.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_bearer_skips_refresh_when_fresh() {
        let store = Arc::new(InMemorySessionStore::new());
        store
            .save_credential(&AccessCredential::with_ttl("fresh", 3600))
            .await
            .unwrap();
        // Unroutable refresh URL: reaching it would fail the test.
        let manager = manager_for("http://127.0.0.1:9", store);
        assert_eq!(manager.bearer().await.as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn test_bearer_none_for_anonymous() {
        let manager = manager_for("http://127.0.0.1:9", Arc::new(InMemorySessionStore::new()));
        assert!(manager.bearer().await.is_none());
        assert!(!manager.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_expired_credential_is_rotated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "accessToken": "rotated",
                "expiresIn": 900
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(InMemorySessionStore::new());
        store
            .save_credential(&AccessCredential::new("stale", past_ts(100)))
            .await
            .unwrap();
        let manager = manager_for(&server.uri(), Arc::clone(&store));

        assert_eq!(manager.bearer().await.as_deref(), Some("rotated"));
        // The rotation was persisted.
        let persisted = store.load_credential().await.unwrap().unwrap();
        assert_eq!(persisted.token, "rotated");
        assert!(!persisted.is_expired());
    }

    #[tokio::test]
    async fn test_concurrent_rotations_coalesce() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(std::time::Duration::from_millis(150))
                    .set_body_json(serde_json::json!({
                        "accessToken": "rotated-once",
                        "expiresIn": 900
                    })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(InMemorySessionStore::new());
        store
            .save_credential(&AccessCredential::new("stale", past_ts(100)))
            .await
            .unwrap();
        let manager = Arc::new(manager_for(&server.uri(), store));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let manager = Arc::clone(&manager);
            handles.push(tokio::spawn(async move {
                manager.refresh_observed(Some("stale")).await
            }));
        }
        for handle in handles {
            let cred = handle.await.unwrap().unwrap();
            assert_eq!(cred.token, "rotated-once");
        }
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_old_credential() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let store = Arc::new(InMemorySessionStore::new());
        let stale = AccessCredential::new("stale", past_ts(100));
        store.save_credential(&stale).await.unwrap();
        let manager = manager_for(&server.uri(), Arc::clone(&store));

        let err = manager.refresh().await.unwrap_err();
        assert!(matches!(err, GatewayError::AuthExpired));
        // Neither memory nor the store lost the credential.
        assert_eq!(manager.credential().await.unwrap().token, "stale");
        assert_eq!(store.load_credential().await.unwrap().unwrap(), stale);
    }

    #[tokio::test]
    async fn test_refresh_network_failure_is_network_error() {
        let manager = manager_for("http://127.0.0.1:9", Arc::new(InMemorySessionStore::new()));
        let err = manager.refresh().await.unwrap_err();
        assert!(matches!(err, GatewayError::Network(_)));
    }

    #[tokio::test]
    async fn test_clear_wipes_memory_and_store() {
        let store = Arc::new(InMemorySessionStore::new());
        store
            .save_credential(&AccessCredential::with_ttl("tok", 3600))
            .await
            .unwrap();
        let manager = manager_for("http://127.0.0.1:9", Arc::clone(&store));
        assert!(manager.credential().await.is_some());

        manager.clear().await.unwrap();
        assert!(manager.credential().await.is_none());
        assert!(store.load_credential().await.unwrap().is_none());
    }

    #[test]
    fn test_parse_credential_from_login_reply() {
        let cred = parse_credential(&serde_json::json!({
            "accessToken": "login-tok",
            "expiresIn": 1200,
            "user": { "username": "ada" }
        }))
        .unwrap();
        assert_eq!(cred.token, "login-tok");
        assert!(!cred.is_expired());
        assert!(parse_credential(&serde_json::json!({ "user": {} })).is_none());
    }

    #[tokio::test]
    async fn test_snake_case_reply_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "snake",
                "expires_in": 600
            })))
            .mount(&server)
            .await;

        let manager = manager_for(&server.uri(), Arc::new(InMemorySessionStore::new()));
        let cred = manager.refresh().await.unwrap();
        assert_eq!(cred.token, "snake");
    }
}
