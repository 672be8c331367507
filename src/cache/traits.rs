//! Core traits and types for the caching system.

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};

/// Trait for list entries that can be cached.
pub trait Cacheable: Clone + Send + Sync + Serialize + DeserializeOwned {
  /// Key prefix the list is stored under (e.g., "blocked_users").
  ///
  /// The payload lives at `<prefix>`, its write time at `<prefix>_timestamp`
  /// and the scope it belongs to at `<prefix>_scope`.
  fn cache_prefix() -> &'static str;
}

/// A cached list together with the time it was written
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEnvelope<T> {
  pub payload: Vec<T>,
  /// Epoch milliseconds at write time
  pub timestamp: i64,
}

/// Result from a cache operation, including data and metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
  /// Envelope timestamp (epoch millis) of the data
  pub cached_at: i64,
}

impl<T> CacheResult<T> {
  /// Fresh network data that was just written at `cached_at`.
  pub fn from_network(data: T, cached_at: i64) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      cached_at,
    }
  }

  /// Data served from a still-valid envelope.
  pub fn from_cache(data: T, cached_at: i64) -> Self {
    Self {
      data,
      source: CacheSource::CacheFresh,
      cached_at,
    }
  }
}

/// Indicates where cached data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fresh data from network
  Network,
  /// Data from cache, still within its time-to-live
  CacheFresh,
}

/// Source of "now" for cache validity checks
pub trait Clock: Send + Sync {
  /// Current time in epoch milliseconds
  fn now_millis(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now_millis(&self) -> i64 {
    Utc::now().timestamp_millis()
  }
}

/// Clock that only moves when told to
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ManualClock {
  now: std::sync::atomic::AtomicI64,
}

#[cfg(test)]
impl ManualClock {
  pub fn at(millis: i64) -> Self {
    Self {
      now: std::sync::atomic::AtomicI64::new(millis),
    }
  }

  pub fn advance(&self, millis: i64) {
    self
      .now
      .fetch_add(millis, std::sync::atomic::Ordering::SeqCst);
  }
}

#[cfg(test)]
impl Clock for ManualClock {
  fn now_millis(&self) -> i64 {
    self.now.load(std::sync::atomic::Ordering::SeqCst)
  }
}
