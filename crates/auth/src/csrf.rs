//! Anti-forgery token guard for state-changing requests.
//!
//! GETs are exempt: cross-site request forgery only matters for
//! mutations. The token is issued lazily on the first mutation, reused
//! until the server rejects it, and rotated whenever a response pushes a
//! replacement header.

use inkpress_cache::FlightTable;
use inkpress_types::{GatewayError, traits::Result};
use serde::Deserialize;
use std::sync::Mutex;

/// Header carrying the anti-forgery token, both directions.
pub const CSRF_HEADER: &str = "x-csrf-token";

#[derive(Debug, Deserialize)]
struct CsrfReply {
    #[serde(alias = "csrfToken")]
    csrf_token: String,
}

pub struct CsrfGuard {
    http: reqwest::Client,
    issue_url: String,
    token: Mutex<Option<String>>,
    /// Concurrent first mutations coalesce onto one issuing call.
    flights: FlightTable<Result<String>>,
}

impl CsrfGuard {
    pub fn new(http: reqwest::Client, issue_url: impl Into<String>) -> Self {
        Self {
            http,
            issue_url: issue_url.into(),
            token: Mutex::new(None),
            flights: FlightTable::new(),
        }
    }

    /// Cached token, if one has been issued.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.token.lock().expect("csrf token lock").clone()
    }

    /// Returns a token, issuing one from the server if none is cached.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Network`] when the issuing endpoint is
    /// unreachable, [`GatewayError::Server`] when it answers non-2xx.
    pub async fn ensure(&self) -> Result<String> {
        if let Some(token) = self.token() {
            return Ok(token);
        }
        self.flights
            .run(&self.issue_url, self.issue())
            .await
            .unwrap_or_else(|| {
                Err(GatewayError::Network(
                    "security token issue abandoned".to_string(),
                ))
            })
    }

    async fn issue(&self) -> Result<String> {
        let response = self.http.get(&self.issue_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Server {
                status: status.as_u16(),
                message: "security token endpoint failed".to_string(),
            });
        }
        let reply: CsrfReply = response.json().await?;
        *self.token.lock().expect("csrf token lock") = Some(reply.csrf_token.clone());
        tracing::debug!("security token issued");
        Ok(reply.csrf_token)
    }

    /// Drops the cached token so the next mutation re-issues.
    pub fn invalidate(&self) {
        *self.token.lock().expect("csrf token lock") = None;
    }

    /// Discards the rejected token and issues a fresh one.
    ///
    /// # Errors
    ///
    /// Same as [`Self::ensure`].
    pub async fn reissue(&self) -> Result<String> {
        self.invalidate();
        self.ensure().await
    }

    /// Absorbs a rotated token pushed on a response header.
    pub fn absorb(&self, headers: &http::HeaderMap) {
        if let Some(value) = headers.get(CSRF_HEADER)
            && let Ok(token) = value.to_str()
            && !token.is_empty()
        {
            *self.token.lock().expect("csrf token lock") = Some(token.to_string());
        }
    }
}
