//! Session authentication for the inkpress gateway.
//!
//! Two guards live here: the [`TokenManager`], which owns the short-lived
//! access credential and its silent-refresh lifecycle, and the
//! [`CsrfGuard`], which issues and rotates the anti-forgery token attached
//! to state-changing requests.

pub mod csrf;
pub mod manager;

pub use csrf::{CSRF_HEADER, CsrfGuard};
pub use manager::{TokenManager, parse_credential};
