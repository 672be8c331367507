//! Key-value storage trait and SQLite implementation.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// Persistent string key-value store backing the cache.
pub trait KeyValueStore: Send + Sync {
  /// Get the value stored under `key`.
  fn get(&self, key: &str) -> Result<Option<String>>;

  /// Store `value` under `key`, replacing any previous value.
  fn set(&self, key: &str, value: &str) -> Result<()>;

  /// Store several entries. Backends that can should apply them atomically.
  fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
    for (key, value) in entries {
      self.set(key, value)?;
    }
    Ok(())
  }
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStore;

impl KeyValueStore for NoopStore {
  fn get(&self, _key: &str) -> Result<Option<String>> {
    Ok(None) // Always miss
  }

  fn set(&self, _key: &str, _value: &str) -> Result<()> {
    Ok(()) // Discard
  }
}

/// SQLite-based key-value store.
pub struct SqliteStore {
  conn: Mutex<Connection>,
}

impl SqliteStore {
  /// Open the store at the default location.
  pub fn open() -> Result<Self> {
    let path = Self::default_path()?;
    Self::open_at(&path)
  }

  /// Open (or create) the store at `path`.
  pub fn open_at(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    let storage = Self {
      conn: Mutex::new(conn),
    };
    storage.run_migrations()?;

    Ok(storage)
  }

  /// Get the default database path.
  fn default_path() -> Result<std::path::PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("blockwatch").join("cache.db"))
  }

  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(())
  }
}

const CACHE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS kv_cache (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

impl KeyValueStore for SqliteStore {
  fn get(&self, key: &str) -> Result<Option<String>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .query_row(
        "SELECT value FROM kv_cache WHERE key = ?",
        params![key],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read cache key {}: {}", key, e))
  }

  fn set(&self, key: &str, value: &str) -> Result<()> {
    self.set_many(&[(key, value)])
  }

  fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
    let mut conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let tx = conn
      .transaction()
      .map_err(|e| eyre!("Failed to begin transaction: {}", e))?;

    for (key, value) in entries {
      tx.execute(
        "INSERT OR REPLACE INTO kv_cache (key, value) VALUES (?, ?)",
        params![key, value],
      )
      .map_err(|e| eyre!("Failed to write cache key {}: {}", key, e))?;
    }

    tx.commit()
      .map_err(|e| eyre!("Failed to commit transaction: {}", e))?;

    Ok(())
  }
}

/// In-memory store for tests
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
  entries: Mutex<std::collections::HashMap<String, String>>,
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
  fn get(&self, key: &str) -> Result<Option<String>> {
    Ok(self.entries.lock().unwrap().get(key).cloned())
  }

  fn set(&self, key: &str, value: &str) -> Result<()> {
    self
      .entries
      .lock()
      .unwrap()
      .insert(key.to_string(), value.to_string());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_sqlite_roundtrip_and_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open_at(&dir.path().join("nested").join("cache.db")).unwrap();

    assert_eq!(store.get("blocked_users").unwrap(), None);

    store.set("blocked_users", "[]").unwrap();
    assert_eq!(store.get("blocked_users").unwrap().as_deref(), Some("[]"));

    store
      .set_many(&[("blocked_users", "[1]"), ("blocked_users_timestamp", "1000")])
      .unwrap();
    assert_eq!(store.get("blocked_users").unwrap().as_deref(), Some("[1]"));
    assert_eq!(
      store.get("blocked_users_timestamp").unwrap().as_deref(),
      Some("1000")
    );
  }

  #[test]
  fn test_sqlite_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.db");

    SqliteStore::open_at(&path).unwrap().set("k", "v").unwrap();

    let reopened = SqliteStore::open_at(&path).unwrap();
    assert_eq!(reopened.get("k").unwrap().as_deref(), Some("v"));
  }

  #[test]
  fn test_noop_store_always_misses() {
    let store = NoopStore;
    store.set("k", "v").unwrap();
    assert_eq!(store.get("k").unwrap(), None);
  }
}
