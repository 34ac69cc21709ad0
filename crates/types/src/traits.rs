//! Async traits shared across inkpress crates.
//!
//! Cross-crate abstractions live here so higher layers depend only on
//! `inkpress-types`, never on each other.

use crate::models::Draft;
use crate::token::AccessCredential;
use async_trait::async_trait;

pub use crate::error::Result;

/// Durable session state, the local-storage analog of a browser client.
///
/// Holds the persisted access credential (so a fresh process knows the
/// session's freshness without a round trip) and a small rolling set of
/// editor drafts. Implementations must tolerate concurrent calls.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the persisted credential, if any.
    async fn load_credential(&self) -> Result<Option<AccessCredential>>;

    /// Persist (or overwrite) the credential.
    async fn save_credential(&self, credential: &AccessCredential) -> Result<()>;

    /// Remove the persisted credential.
    async fn clear_credential(&self) -> Result<()>;

    /// Load the draft set, newest first.
    async fn load_drafts(&self) -> Result<Vec<Draft>>;

    /// Replace the draft set.
    async fn save_drafts(&self, drafts: &[Draft]) -> Result<()>;
}
