//! Response caching and request coalescing for the inkpress gateway.
//!
//! Four pieces: key normalization (so equivalent call styles collide),
//! the per-resource-class TTL policy, the TTL'd response store with prefix
//! invalidation, and the in-flight table that collapses concurrent
//! identical requests onto one network call.

pub mod flight;
pub mod key;
pub mod policy;
pub mod store;

pub use flight::FlightTable;
pub use key::CacheKey;
pub use policy::{CachePolicy, ResourceClass};
pub use store::{CachedResponse, ResponseCache};
