//! Cache layer that orchestrates caching logic with network fetching.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::storage::KeyValueStore;
use super::traits::{CacheEnvelope, CacheResult, Cacheable, Clock, SystemClock};

/// Default time-to-live of a cached list
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

/// Cache layer that manages caching logic and network fetching.
///
/// Lists are stored as a [`CacheEnvelope`] tagged with the scope (e.g. the
/// guild) they were fetched for. Storage failures never fail a fetch: a
/// broken read is a miss and a broken write is logged.
pub struct CacheLayer {
  storage: Arc<dyn KeyValueStore>,
  clock: Arc<dyn Clock>,
  /// How long a written envelope stays valid
  ttl: Duration,
}

impl CacheLayer {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
    Self {
      storage,
      clock: Arc::new(SystemClock),
      ttl: DEFAULT_TTL,
    }
  }

  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    self.ttl = ttl;
    self
  }

  #[cfg(test)]
  pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }

  fn ttl_millis(&self) -> i64 {
    i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX)
  }

  /// An envelope is valid while `0 <= now - timestamp < ttl`. A timestamp
  /// from the future (the wall clock stepped back) counts as expired.
  fn is_fresh(&self, timestamp: i64) -> bool {
    let age = self.clock.now_millis().saturating_sub(timestamp);
    (0..self.ttl_millis()).contains(&age)
  }

  /// Read the envelope stored for `scope`, regardless of its age.
  pub fn read<T: Cacheable>(&self, scope: &str) -> Option<CacheEnvelope<T>> {
    match self.try_read(scope) {
      Ok(envelope) => envelope,
      Err(e) => {
        warn!(prefix = T::cache_prefix(), "Ignoring unreadable cache entry: {}", e);
        None
      }
    }
  }

  fn try_read<T: Cacheable>(&self, scope: &str) -> color_eyre::Result<Option<CacheEnvelope<T>>> {
    let prefix = T::cache_prefix();

    let stored_scope = self.storage.get(&scope_key(prefix))?;
    if stored_scope.as_deref() != Some(scope) {
      return Ok(None);
    }

    let (Some(payload), Some(timestamp)) = (
      self.storage.get(prefix)?,
      self.storage.get(&timestamp_key(prefix))?,
    ) else {
      return Ok(None);
    };

    let timestamp: i64 = timestamp.trim().parse()?;
    let payload: Vec<T> = serde_json::from_str(&payload)?;

    Ok(Some(CacheEnvelope { payload, timestamp }))
  }

  /// Persist `payload` for `scope` with `timestamp = now`, returning the timestamp.
  pub fn write<T: Cacheable>(&self, scope: &str, payload: &[T]) -> i64 {
    let prefix = T::cache_prefix();
    let timestamp = self.clock.now_millis();

    if let Err(e) = self.try_write(prefix, scope, payload, timestamp) {
      warn!(prefix, "Failed to write cache: {}", e);
    }

    timestamp
  }

  fn try_write<T: Cacheable>(
    &self,
    prefix: &str,
    scope: &str,
    payload: &[T],
    timestamp: i64,
  ) -> color_eyre::Result<()> {
    let json = serde_json::to_string(payload)?;
    let timestamp_key = timestamp_key(prefix);
    let timestamp = timestamp.to_string();
    let scope_key = scope_key(prefix);

    self.storage.set_many(&[
      (prefix, json.as_str()),
      (timestamp_key.as_str(), timestamp.as_str()),
      (scope_key.as_str(), scope),
    ])
  }

  /// Fetch a list with cache-first strategy.
  ///
  /// 1. Unless `bypass` is set, return a still-valid envelope immediately
  /// 2. Otherwise call the fetcher
  /// 3. On success, store the result with a new timestamp
  /// 4. On failure, return the fetcher's error untouched
  pub async fn fetch_list<T, E, F, Fut>(
    &self,
    scope: &str,
    bypass: bool,
    fetcher: F,
  ) -> Result<CacheResult<Vec<T>>, E>
  where
    T: Cacheable,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
  {
    if !bypass {
      if let Some(cached) = self.read::<T>(scope) {
        if self.is_fresh(cached.timestamp) {
          debug!(prefix = T::cache_prefix(), scope, "Cache hit");
          return Ok(CacheResult::from_cache(cached.payload, cached.timestamp));
        }
        debug!(prefix = T::cache_prefix(), scope, "Cache expired");
      }
    }

    let data = fetcher().await?;
    let cached_at = self.write(scope, &data);
    Ok(CacheResult::from_network(data, cached_at))
  }
}

impl Clone for CacheLayer {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      clock: Arc::clone(&self.clock),
      ttl: self.ttl,
    }
  }
}

fn timestamp_key(prefix: &str) -> String {
  format!("{}_timestamp", prefix)
}

fn scope_key(prefix: &str) -> String {
  format!("{}_scope", prefix)
}
