//! The inkpress API gateway client.
//!
//! One wrapper around every outbound call, unifying authentication, CSRF
//! protection, response caching, request coalescing, and failure
//! classification. Callers use the resource modules under [`api`] (or the
//! raw verb helpers on [`ApiClient`]) and receive either a uniform
//! [`Envelope`](inkpress_types::Envelope) or a classified
//! [`GatewayError`](inkpress_types::GatewayError); no raw HTTP detail ever
//! leaks through.

pub mod api;
mod classify;
pub mod gateway;
pub mod limits;
pub mod routes;

pub use gateway::{ApiClient, ApiRequest, RequestOptions};
pub use limits::{RateLimitRecord, RateLimitTracker};
