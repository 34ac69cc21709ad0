//! Well-known on-disk locations for the inkpress client.

use inkpress_types::{GatewayError, traits::Result};
use std::path::PathBuf;

/// Return the user's home directory, or error if unset.
///
/// # Errors
///
/// Returns [`GatewayError::Storage`] when `HOME` is not set.
pub fn home_dir() -> Result<PathBuf> {
    std::env::var("HOME")
        .map(PathBuf::from)
        .map_err(|_| GatewayError::Storage("HOME environment variable not set".to_string()))
}

/// Default location of the persisted session file.
///
/// # Errors
///
/// Returns [`GatewayError::Storage`] when the home directory is unknown.
pub fn session_path() -> Result<PathBuf> {
    Ok(home_dir()?.join(".inkpress").join("session.json"))
}
