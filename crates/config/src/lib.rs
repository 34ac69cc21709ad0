//! Configuration loading for the inkpress client.
//!
//! YAML on disk merged over compiled-in defaults via figment. Every field
//! has a default so a missing or partial file always yields a usable
//! configuration.

pub mod schema;

pub use schema::{CacheTtlConfig, Config};
