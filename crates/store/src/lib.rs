//! Session persistence for the inkpress client.
//!
//! Two [`SessionStore`](inkpress_types::SessionStore) implementations: a
//! JSON file under the user's home directory for real use, and an in-memory
//! store for tests and ephemeral sessions. The drafts module owns the
//! rolling-set arithmetic both share.

pub mod drafts;
pub mod file;
pub mod memory;
pub mod paths;

pub use drafts::{DRAFT_LIMIT, new_draft, push_draft, roll};
pub use file::JsonSessionStore;
pub use memory::InMemorySessionStore;
