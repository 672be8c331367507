//! Generic caching layer for list persistence.
//!
//! This module provides a domain-agnostic caching mechanism that:
//! - Stores whole lists as an envelope (payload + write timestamp) in a key-value store
//! - Serves an envelope while it is younger than the time-to-live
//! - Scopes envelopes so a list cached for one guild is never served for another

mod layer;
mod storage;
mod traits;

pub use layer::CacheLayer;
pub use storage::{KeyValueStore, NoopStore, SqliteStore};
pub use traits::{CacheResult, CacheSource, Cacheable};

#[cfg(test)]
pub use storage::MemoryStore;
#[cfg(test)]
pub use traits::ManualClock;
