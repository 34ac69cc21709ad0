//! Process-wide gateway notifications.

use crate::limits::LockoutInfo;
use serde::{Deserialize, Serialize};

/// Broadcast to every subscriber when a condition concerns the whole
/// session rather than a single call. Per-call failures stay on the call's
/// own result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatewayEvent {
    /// The server locked the account; carries the computed unlock time.
    Lockout(LockoutInfo),
    /// The session is gone and cannot be recovered; the UI should show its
    /// login view.
    LoginRequired,
}
