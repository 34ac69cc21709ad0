//! Core types and traits for the inkpress workspace.
//!
//! This crate defines the shared abstractions used across all layers of the
//! inkpress gateway client, including the classified error type, the access
//! credential representation, the uniform response envelope, and the async
//! traits that each layer implements.

pub mod envelope;
pub mod error;
pub mod events;
pub mod limits;
pub mod models;
pub mod token;
pub mod traits;

pub use envelope::Envelope;
pub use error::GatewayError;
pub use events::GatewayEvent;
pub use limits::{LockoutInfo, RateLimitInfo};
pub use models::{AuthorProfile, Category, Comment, Draft, Post};
pub use token::{AccessCredential, EXPIRY_SKEW_SECS};
pub use traits::{Result, SessionStore};
