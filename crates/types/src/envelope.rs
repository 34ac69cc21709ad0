//! Uniform response envelope shared by live and cache-replayed responses.

use crate::error::Result;
use http::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// What every gateway call resolves to: the parsed body plus enough of the
/// HTTP layer that callers never branch on where a response came from.
///
/// Cache replays carry an empty placeholder header map; everything else a
/// caller legitimately consumes is identical between a network response and
/// a replay of one.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// HTTP status of the (original) response.
    pub status: u16,
    /// Response headers; empty for cache replays.
    pub headers: HeaderMap,
    /// Parsed JSON body. Non-JSON bodies are wrapped as a JSON string,
    /// empty bodies as `null`.
    pub data: Value,
}

impl Envelope {
    /// Envelope for a live network response.
    #[must_use]
    pub fn new(status: u16, headers: HeaderMap, data: Value) -> Self {
        Self {
            status,
            headers,
            data,
        }
    }

    /// Envelope reconstructed from a cache entry.
    #[must_use]
    pub fn replayed(status: u16, data: Value) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            data,
        }
    }

    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserialize the body into a typed model.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GatewayError::Decode`] when the body does not match
    /// the target shape.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.data.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Ping {
        ok: bool,
    }

    #[test]
    fn test_replay_has_empty_headers() {
        let env = Envelope::replayed(200, json!({"ok": true}));
        assert!(env.headers.is_empty());
        assert!(env.is_success());
    }

    #[test]
    fn test_json_decodes_typed_model() {
        let env = Envelope::replayed(200, json!({"ok": true}));
        let ping: Ping = env.json().unwrap();
        assert_eq!(ping, Ping { ok: true });
    }

    #[test]
    fn test_json_mismatch_is_decode_error() {
        let env = Envelope::replayed(200, json!({"ok": "yes"}));
        let err = env.json::<Ping>().unwrap_err();
        assert!(matches!(err, crate::GatewayError::Decode(_)));
    }

    #[test]
    fn test_is_success_bounds() {
        assert!(Envelope::replayed(200, Value::Null).is_success());
        assert!(Envelope::replayed(299, Value::Null).is_success());
        assert!(!Envelope::replayed(304, Value::Null).is_success());
        assert!(!Envelope::replayed(404, Value::Null).is_success());
    }
}
