//! Rolling draft set arithmetic.
//!
//! The editor keeps at most [`DRAFT_LIMIT`] drafts, newest first. Saving a
//! draft whose id already exists replaces it in place of adding a copy;
//! saving past the cap silently drops the oldest entry.

use inkpress_types::{Draft, SessionStore, traits::Result};
use std::time::{SystemTime, UNIX_EPOCH};

/// How many editor drafts the rolling set keeps.
pub const DRAFT_LIMIT: usize = 10;

/// Builds a fresh draft stamped with the current time.
#[must_use]
pub fn new_draft(title: impl Into<String>, content: impl Into<String>) -> Draft {
    Draft {
        id: uuid::Uuid::new_v4().to_string(),
        title: title.into(),
        content: content.into(),
        updated_at: now_secs(),
    }
}

/// Inserts `draft` into `drafts`, enforcing newest-first order, id
/// uniqueness, and the [`DRAFT_LIMIT`] cap.
#[must_use]
pub fn roll(mut drafts: Vec<Draft>, draft: Draft) -> Vec<Draft> {
    drafts.retain(|d| d.id != draft.id);
    drafts.insert(0, draft);
    drafts.truncate(DRAFT_LIMIT);
    drafts
}

/// Loads the draft set, rolls `draft` in, and persists the result.
///
/// # Errors
///
/// Propagates the store's load or save failure.
pub async fn push_draft(store: &dyn SessionStore, draft: Draft) -> Result<Vec<Draft>> {
    let drafts = roll(store.load_drafts().await?, draft);
    store.save_drafts(&drafts).await?;
    Ok(drafts)
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
