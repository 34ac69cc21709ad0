//! In-memory session store backed by mutex-guarded slots.

use async_trait::async_trait;
use inkpress_types::{AccessCredential, Draft, SessionStore, traits::Result};
use std::sync::Mutex;

/// An in-memory [`SessionStore`] implementation for testing and ephemeral
/// sessions.
pub struct InMemorySessionStore {
    credential: Mutex<Option<AccessCredential>>,
    drafts: Mutex<Vec<Draft>>,
}

impl InMemorySessionStore {
    /// Creates a new empty in-memory session store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            credential: Mutex::new(None),
            drafts: Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load_credential(&self) -> Result<Option<AccessCredential>> {
        Ok(self.credential.lock().unwrap().clone())
    }

    async fn save_credential(&self, credential: &AccessCredential) -> Result<()> {
        *self.credential.lock().unwrap() = Some(credential.clone());
        Ok(())
    }

    async fn clear_credential(&self) -> Result<()> {
        *self.credential.lock().unwrap() = None;
        Ok(())
    }

    async fn load_drafts(&self) -> Result<Vec<Draft>> {
        Ok(self.drafts.lock().unwrap().clone())
    }

    async fn save_drafts(&self, drafts: &[Draft]) -> Result<()> {
        *self.drafts.lock().unwrap() = drafts.to_vec();
        Ok(())
    }
}
