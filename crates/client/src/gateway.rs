//! The outbound request pipeline.
//!
//! Every call runs the same stages in order: token check (with silent
//! refresh), CSRF attach for mutations, cache lookup, coalesced network
//! dispatch, header absorption, cache store or invalidation, failure
//! classification. At most one automatic retry happens per request, and
//! only after a token refresh or a CSRF re-issue.
//!
//! All shared state hangs off the [`ApiClient`] context object; nothing is
//! module-global, so tests and embedders can run isolated instances side
//! by side. Synchronous critical sections are short and never held across
//! a suspension point.

use crate::classify::{self, Pass, Recovery, Terminal, Verdict};
use crate::limits::{self, RateLimitTracker};
use crate::routes;
use inkpress_auth::{CSRF_HEADER, CsrfGuard, TokenManager};
use inkpress_cache::{CacheKey, CachePolicy, CachedResponse, FlightTable, ResponseCache};
use inkpress_config::Config;
use inkpress_types::{Envelope, GatewayError, GatewayEvent, SessionStore, traits::Result};
use reqwest::Method;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// How many events the broadcast channel buffers for slow subscribers.
const EVENT_BUFFER: usize = 16;

/// Longest advertised wait the gateway will sleep through when
/// `auto_retry_rate_limited` is on. Anything longer surfaces immediately.
const MAX_AUTO_RETRY_WAIT: Duration = Duration::from_secs(30);

/// Per-request options.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestOptions {
    /// Opt this call out of the silent-refresh recovery.
    pub no_refresh: bool,
    /// Bypass the response cache even for cacheable paths.
    pub no_cache: bool,
}

/// One outbound call, built with the fluent helpers below.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) params: Vec<(String, String)>,
    pub(crate) body: Option<Value>,
    pub(crate) options: RequestOptions,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Vec::new(),
            body: None,
            options: RequestOptions::default(),
        }
    }

    /// Adds one query parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Attaches a JSON body.
    #[must_use]
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Replaces all options at once.
    #[must_use]
    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Opts this call out of silent refresh.
    #[must_use]
    pub fn no_refresh(mut self) -> Self {
        self.options.no_refresh = true;
        self
    }

    /// Bypasses the response cache for this call.
    #[must_use]
    pub fn no_cache(mut self) -> Self {
        self.options.no_cache = true;
        self
    }
}

/// A settled HTTP response before classification.
struct RawResponse {
    status: u16,
    headers: http::HeaderMap,
    body: Value,
}

/// What the recovery stage decided to do before the single retry.
enum Step {
    Refresh,
    Reissue,
    Pace(Duration),
}

/// The gateway context: one instance per API origin.
///
/// Owns the HTTP client (with its cookie jar, which carries the refresh
/// credential), both auth guards, the response cache, the in-flight table,
/// and the event channel.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenManager,
    csrf: CsrfGuard,
    cache: ResponseCache,
    policy: CachePolicy,
    flights: FlightTable<Result<Envelope>>,
    limits: RateLimitTracker,
    events: broadcast::Sender<GatewayEvent>,
    auto_retry_rate_limited: bool,
}

impl ApiClient {
    /// Builds a client from configuration and a session store.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] when the HTTP transport cannot be
    /// constructed.
    pub fn new(config: &Config, store: Arc<dyn SessionStore>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().cookie_store(true);
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| GatewayError::Config(e.to_string()))?;
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let tokens = TokenManager::new(
            http.clone(),
            format!("{base_url}/auth/refresh"),
            store,
        );
        let csrf = CsrfGuard::new(http.clone(), format!("{base_url}/auth/csrf-token"));
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Ok(Self {
            http,
            base_url,
            tokens,
            csrf,
            cache: ResponseCache::new(),
            policy: cache_policy(config),
            flights: FlightTable::new(),
            limits: RateLimitTracker::new(),
            events,
            auto_retry_rate_limited: config.auto_retry_rate_limited,
        })
    }

    /// Subscribes to process-wide gateway events (lockout, login required).
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.events.subscribe()
    }

    /// The credential manager, exposed for session bootstrap and login.
    #[must_use]
    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Observed per-endpoint throttle state.
    #[must_use]
    pub fn rate_limits(&self) -> &RateLimitTracker {
        &self.limits
    }

    /// Drops cached reads under a path prefix; returns how many entries
    /// were removed. Writes do this automatically; this is the manual
    /// override.
    pub fn invalidate_cached(&self, prefix: &str) -> usize {
        self.cache.invalidate_prefix(prefix)
    }

    /// Number of live cache entries.
    #[must_use]
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    pub(crate) fn csrf(&self) -> &CsrfGuard {
        &self.csrf
    }

    pub(crate) fn clear_cache(&self) {
        self.cache.clear();
    }

    // ── Verb helpers ─────────────────────────────────────────────────────────

    /// GET with query parameters.
    ///
    /// # Errors
    ///
    /// Classified per the failure table; see [`GatewayError`].
    pub async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Envelope> {
        let mut request = ApiRequest::new(Method::GET, path);
        for (k, v) in params {
            request = request.param(*k, *v);
        }
        self.send(request).await
    }

    /// POST with a JSON body.
    ///
    /// # Errors
    ///
    /// Classified per the failure table; see [`GatewayError`].
    pub async fn post(&self, path: &str, body: Value) -> Result<Envelope> {
        self.send(ApiRequest::new(Method::POST, path).body(body)).await
    }

    /// PUT with a JSON body.
    ///
    /// # Errors
    ///
    /// Classified per the failure table; see [`GatewayError`].
    pub async fn put(&self, path: &str, body: Value) -> Result<Envelope> {
        self.send(ApiRequest::new(Method::PUT, path).body(body)).await
    }

    /// PATCH with a JSON body.
    ///
    /// # Errors
    ///
    /// Classified per the failure table; see [`GatewayError`].
    pub async fn patch(&self, path: &str, body: Value) -> Result<Envelope> {
        self.send(ApiRequest::new(Method::PATCH, path).body(body)).await
    }

    /// DELETE, no body.
    ///
    /// # Errors
    ///
    /// Classified per the failure table; see [`GatewayError`].
    pub async fn delete(&self, path: &str) -> Result<Envelope> {
        self.send(ApiRequest::new(Method::DELETE, path)).await
    }

    // ── The pipeline ─────────────────────────────────────────────────────────

    /// Sends one request through the full policy chain.
    ///
    /// # Errors
    ///
    /// Classified per the failure table; see [`GatewayError`].
    pub async fn send(&self, request: ApiRequest) -> Result<Envelope> {
        let key = CacheKey::new(&request.path, &request.params);
        let cacheable =
            !request.options.no_cache && self.policy.should_cache(&request.method, &request.path);

        let bearer = self.bearer_for(request.options).await;
        let csrf = if mutating(&request.method) {
            Some(self.csrf.ensure().await?)
        } else {
            None
        };

        if cacheable && let Some(hit) = self.cache.get(&key) {
            tracing::debug!(key = %key, "cache hit");
            return Ok(Envelope::replayed(hit.status, hit.data));
        }

        let flight_key = flight_key(&request, &key);
        self.flights
            .run(
                &flight_key,
                self.dispatch(&request, &key, cacheable, bearer, csrf),
            )
            .await
            .unwrap_or_else(|| {
                Err(GatewayError::Network(
                    "coalesced request abandoned".to_string(),
                ))
            })
    }

    /// First attempt, one recovery, at most one retry.
    async fn dispatch(
        &self,
        request: &ApiRequest,
        key: &CacheKey,
        cacheable: bool,
        bearer: Option<String>,
        csrf: Option<String>,
    ) -> Result<Envelope> {
        let first = self
            .attempt(request, key, bearer.as_deref(), csrf.as_deref())
            .await?;
        let refresh_allowed = !request.options.no_refresh;
        let verdict = classify::verdict(
            first.status,
            &first.body,
            &request.path,
            refresh_allowed,
            Pass::First,
        );

        let step = match verdict {
            Verdict::Success => return Ok(self.complete(request, key, cacheable, first)),
            Verdict::Recover(Recovery::RefreshToken) => Step::Refresh,
            Verdict::Recover(Recovery::ReissueCsrf) => Step::Reissue,
            Verdict::Fail(Terminal::RateLimited) if self.auto_retry_rate_limited => {
                match limits::advertised_wait(&first.headers) {
                    Some(wait) if wait <= MAX_AUTO_RETRY_WAIT => Step::Pace(wait),
                    _ => return Err(self.terminal(request, Terminal::RateLimited, &first).await),
                }
            }
            Verdict::Fail(terminal) => return Err(self.terminal(request, terminal, &first).await),
        };

        match step {
            Step::Refresh => {
                if let Err(e) = self.tokens.refresh_observed(bearer.as_deref()).await {
                    tracing::debug!(path = %request.path, error = %e, "refresh failed");
                    return Err(self
                        .terminal(request, classify::auth_failure(&request.path), &first)
                        .await);
                }
            }
            Step::Reissue => {
                if let Err(e) = self.csrf.reissue().await {
                    tracing::debug!(path = %request.path, error = %e, "security token re-issue failed");
                    return Err(self.terminal(request, Terminal::CsrfRejected, &first).await);
                }
            }
            Step::Pace(wait) => {
                tracing::debug!(
                    path = %request.path,
                    wait_secs = wait.as_secs(),
                    "throttled, pacing one retry"
                );
                tokio::time::sleep(wait).await;
            }
        }

        let bearer = self.bearer_for(request.options).await;
        let csrf = if mutating(&request.method) {
            Some(self.csrf.ensure().await?)
        } else {
            None
        };
        let second = self
            .attempt(request, key, bearer.as_deref(), csrf.as_deref())
            .await?;
        let verdict = classify::verdict(second.status, &second.body, &request.path, false, Pass::Retry);
        let terminal = match verdict {
            Verdict::Success => return Ok(self.complete(request, key, cacheable, second)),
            // The retry pass never yields another recovery.
            Verdict::Recover(Recovery::RefreshToken) => classify::auth_failure(&request.path),
            Verdict::Recover(Recovery::ReissueCsrf) => Terminal::CsrfRejected,
            Verdict::Fail(terminal) => terminal,
        };
        Err(self.terminal(request, terminal, &second).await)
    }

    /// One wire round trip. Absorbs pushed CSRF rotations and throttle
    /// headers from every response, success or not.
    async fn attempt(
        &self,
        request: &ApiRequest,
        key: &CacheKey,
        bearer: Option<&str>,
        csrf: Option<&str>,
    ) -> Result<RawResponse> {
        let url = format!("{}{}", self.base_url, key.path());
        let mut call = self.http.request(request.method.clone(), &url);
        let query: Vec<(&str, &str)> = key.params().collect();
        if !query.is_empty() {
            call = call.query(&query);
        }
        if let Some(token) = bearer {
            call = call.bearer_auth(token);
        }
        if let Some(token) = csrf {
            call = call.header(CSRF_HEADER, token);
        }
        if let Some(body) = &request.body {
            call = call.json(body);
        }

        let response = call.send().await.map_err(|e| {
            tracing::debug!(path = %request.path, error = %e, "network failure");
            GatewayError::Network(e.to_string())
        })?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        self.csrf.absorb(&headers);
        self.limits.observe(key.path(), &headers);
        let bytes = response.bytes().await?;
        Ok(RawResponse {
            status,
            headers,
            body: parse_body(&bytes),
        })
    }

    /// Success path: store cacheable reads, invalidate after writes. Both
    /// happen before the envelope is handed back, so no caller can observe
    /// pre-invalidation state after its own write resolved.
    fn complete(
        &self,
        request: &ApiRequest,
        key: &CacheKey,
        cacheable: bool,
        raw: RawResponse,
    ) -> Envelope {
        if cacheable {
            self.cache.put(
                key.clone(),
                CachedResponse {
                    status: raw.status,
                    data: raw.body.clone(),
                },
                self.policy.ttl(&request.path),
            );
        }
        if mutating(&request.method) {
            for prefix in routes::invalidation_prefixes(&request.path) {
                let removed = self.cache.invalidate_prefix(prefix);
                if removed > 0 {
                    tracing::debug!(prefix, removed, "invalidated cached reads");
                }
            }
        }
        Envelope::new(raw.status, raw.headers, raw.body)
    }

    /// Terminal failure: build the classified error and apply its side
    /// effects (clearing credentials, broadcasts, logging).
    async fn terminal(
        &self,
        request: &ApiRequest,
        terminal: Terminal,
        raw: &RawResponse,
    ) -> GatewayError {
        let err = match terminal {
            Terminal::AuthFailure { redirect } => self.expire_session(redirect).await,
            // The session already on this machine is untouched: only the
            // credentials offered to the auth flow were refused.
            Terminal::LoginRejected => GatewayError::AuthInvalid {
                message: classify::server_message(&raw.body)
                    .unwrap_or_else(|| "invalid credentials".to_string()),
                redirect: false,
            },
            Terminal::CsrfRejected => GatewayError::CsrfInvalid,
            Terminal::NotFound => GatewayError::NotFound {
                path: request.path.clone(),
            },
            Terminal::Forbidden => GatewayError::Forbidden {
                message: classify::server_message(&raw.body)
                    .unwrap_or_else(|| "access denied".to_string()),
            },
            Terminal::RateLimited => {
                let info = limits::parse_rate_limit(&raw.headers);
                GatewayError::RateLimited {
                    message: limits::wait_message(&info),
                    info,
                }
            }
            Terminal::Locked => {
                let info = limits::parse_lockout(&raw.body);
                let _ = self.events.send(GatewayEvent::Lockout(info.clone()));
                GatewayError::AccountLocked { info }
            }
            Terminal::ServerFault => GatewayError::Server {
                status: raw.status,
                message: classify::server_message(&raw.body).unwrap_or_default(),
            },
        };
        if err.is_silent() {
            if raw.status == 404 && routes::is_posts_list(&request.path) {
                tracing::warn!(path = %request.path, "list endpoint returned 404, likely a routing defect");
            } else {
                tracing::debug!(path = %request.path, status = raw.status, error = %err, "silent failure");
            }
        } else {
            tracing::debug!(path = %request.path, status = raw.status, error = %err, "request failed");
        }
        err
    }

    /// The terminal 401 side effects. Credentials are cleared either way;
    /// only the redirect case tears down the rest of the local session
    /// state and tells the UI to navigate.
    async fn expire_session(&self, redirect: bool) -> GatewayError {
        if let Err(e) = self.tokens.clear().await {
            tracing::warn!(error = %e, "failed to clear persisted session");
        }
        if redirect {
            self.csrf.invalidate();
            self.cache.clear();
            let _ = self.events.send(GatewayEvent::LoginRequired);
            GatewayError::AuthInvalid {
                message: "session expired, sign in again".to_string(),
                redirect: true,
            }
        } else {
            GatewayError::AuthInvalid {
                message: "session expired".to_string(),
                redirect: false,
            }
        }
    }

    /// Bearer to attach, honoring the per-request refresh opt-out.
    async fn bearer_for(&self, options: RequestOptions) -> Option<String> {
        if options.no_refresh {
            self.tokens
                .credential()
                .await
                .filter(|c| !c.is_expired())
                .map(|c| c.token)
        } else {
            self.tokens.bearer().await
        }
    }
}

/// Identity of a request for coalescing: method, normalized key, a body
/// digest when present, and the option flags. Two calls that differ only
/// in options must not share an outcome; the opted-out one would inherit
/// recovery behavior it declined.
fn flight_key(request: &ApiRequest, key: &CacheKey) -> String {
    let mut flight = format!("{} {}", request.method, key);
    if let Some(body) = &request.body {
        let digest = Sha256::digest(body.to_string().as_bytes());
        flight.push(' ');
        flight.push_str(&hex::encode(digest));
    }
    if request.options.no_refresh {
        flight.push_str(" no-refresh");
    }
    if request.options.no_cache {
        flight.push_str(" no-cache");
    }
    flight
}

fn mutating(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH | Method::DELETE)
}

fn parse_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

fn cache_policy(config: &Config) -> CachePolicy {
    CachePolicy {
        ttl_posts: Duration::from_secs(config.cache_ttl.posts),
        ttl_categories: Duration::from_secs(config.cache_ttl.categories),
        ttl_notifications: Duration::from_secs(config.cache_ttl.notifications),
        ttl_author_profile: Duration::from_secs(config.cache_ttl.author_profile),
        ttl_default: Duration::from_secs(config.cache_ttl.fallback),
        cacheable_prefixes: config.cacheable_prefixes.clone(),
    }
}
