//! Cache-aware loading and mutation of a guild's block-list.

use std::sync::Arc;
use tracing::{info, warn};

use super::notice::{self, Notice};
use super::records::{is_valid, remove_user, sanitize_user_id, sort_records, upsert_and_sort};
use crate::api::{ApiError, BlockedRecord, BlocklistApi, RedirectReason};
use crate::cache::{CacheLayer, CacheResult};

/// Loading state observed by the presentation layer.
///
/// Passed into and returned from [`BlocklistService::fetch`] rather than
/// shared, so overlapping fetches cannot clobber each other's flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadingFlags {
  pub is_loading: bool,
  pub start_loading: bool,
}

impl LoadingFlags {
  #[cfg(test)]
  pub fn started() -> Self {
    Self {
      is_loading: true,
      start_loading: true,
    }
  }

  pub fn settled() -> Self {
    Self::default()
  }

  #[cfg(test)]
  pub fn any(&self) -> bool {
    self.is_loading || self.start_loading
  }
}

#[derive(Debug)]
pub enum FetchOutcome {
  /// No guild selected, nothing happened
  Skipped,
  Loaded(CacheResult<Vec<BlockedRecord>>),
  Failed(RedirectReason),
}

/// Result of a fetch along with the loading flags to apply
#[derive(Debug)]
pub struct Fetch {
  pub outcome: FetchOutcome,
  pub loading: LoadingFlags,
}

/// Result of an add/edit/delete
#[derive(Debug, Default)]
pub struct Mutation {
  /// Replacement for the working list, when it changed
  pub records: Option<Vec<BlockedRecord>>,
  pub notice: Option<Notice>,
}

impl Mutation {
  fn notice(notice: Notice) -> Self {
    Self {
      records: None,
      notice: Some(notice),
    }
  }
}

/// Block-list operations backed by the API and the local cache
#[derive(Clone)]
pub struct BlocklistService {
  api: Arc<dyn BlocklistApi>,
  cache: CacheLayer,
}

impl BlocklistService {
  pub fn new(api: Arc<dyn BlocklistApi>, cache: CacheLayer) -> Self {
    Self { api, cache }
  }

  /// Load the block-list for `guild_id`.
  ///
  /// A valid cache envelope is served without touching the network unless
  /// `bypass_cache` is set. Network results are sorted into block-list order
  /// before they are cached. An empty guild id is a silent no-op and hands
  /// `loading` back untouched.
  pub async fn fetch(&self, guild_id: &str, bypass_cache: bool, loading: LoadingFlags) -> Fetch {
    if guild_id.is_empty() {
      return Fetch {
        outcome: FetchOutcome::Skipped,
        loading,
      };
    }

    let result = self
      .cache
      .fetch_list(guild_id, bypass_cache, || async {
        let mut records = self.api.get_blocked_users(guild_id).await?;
        sort_records(&mut records);
        Ok::<_, ApiError>(records)
      })
      .await;

    let outcome = match result {
      Ok(result) => {
        info!(
          guild_id,
          count = result.data.len(),
          source = ?result.source,
          "Loaded blocked users"
        );
        FetchOutcome::Loaded(result)
      }
      Err(e) => {
        warn!(guild_id, "Failed to load blocked users: {}", e);
        FetchOutcome::Failed(e.redirect_reason())
      }
    };

    Fetch {
      outcome,
      loading: LoadingFlags::settled(),
    }
  }

  /// Add or edit a block, merging the stored record into `current`.
  pub async fn save(
    &self,
    guild_id: &str,
    mut record: BlockedRecord,
    current: Vec<BlockedRecord>,
  ) -> Mutation {
    if guild_id.is_empty() {
      return Mutation::default();
    }

    sanitize_user_id(&mut record);
    if !is_valid(&record) {
      return Mutation::notice(Notice::alert(notice::INVALID_TITLE, notice::INVALID_BODY));
    }

    match self.api.add_blocked_user(guild_id, &record).await {
      Ok(stored) => {
        info!(guild_id, user_id = %stored.user_id, "Saved block");
        let records = upsert_and_sort(current, stored);
        self.cache.write(guild_id, &records);
        Mutation {
          records: Some(records),
          notice: Some(Notice::alert(notice::SAVED_TITLE, notice::SAVED_BODY)),
        }
      }
      Err(e) => {
        warn!(guild_id, user_id = %record.user_id, "Failed to save block: {}", e);
        Mutation::notice(failure_notice(&e, notice::ERROR_SAVE))
      }
    }
  }

  /// Lift a block. A block that is already gone still leaves the list.
  pub async fn delete(
    &self,
    guild_id: &str,
    user_id: &str,
    mut current: Vec<BlockedRecord>,
  ) -> Mutation {
    if guild_id.is_empty() {
      return Mutation::default();
    }

    let notice = match self.api.delete_blocked_user(guild_id, user_id).await {
      Ok(()) => {
        info!(guild_id, user_id, "Deleted block");
        Notice::alert(notice::DELETED_TITLE, notice::DELETED_BODY)
      }
      Err(ApiError::NotFound) => {
        info!(guild_id, user_id, "Block was already gone");
        Notice::alert(notice::NOT_FOUND_TITLE, notice::NOT_FOUND_BODY)
      }
      Err(e) => {
        warn!(guild_id, user_id, "Failed to delete block: {}", e);
        return Mutation::notice(failure_notice(&e, notice::ERROR_DELETE));
      }
    };

    remove_user(&mut current, user_id);
    self.cache.write(guild_id, &current);

    Mutation {
      records: Some(current),
      notice: Some(notice),
    }
  }
}

fn failure_notice(e: &ApiError, body: &'static str) -> Notice {
  if e.requires_redirect() {
    Notice::Redirect(e.redirect_reason())
  } else {
    Notice::alert(notice::ERROR_TITLE, body)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::EndDate;
  use crate::cache::{CacheSource, ManualClock, MemoryStore};
  use async_trait::async_trait;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Mutex;

  /// In-memory API that can be told to fail with a status code
  #[derive(Default)]
  struct FakeApi {
    records: Mutex<Vec<BlockedRecord>>,
    fail_status: Mutex<Option<u16>>,
    calls: AtomicUsize,
  }

  impl FakeApi {
    fn with_records(records: Vec<BlockedRecord>) -> Self {
      Self {
        records: Mutex::new(records),
        ..Self::default()
      }
    }

    fn fail_with(&self, status: u16) {
      *self.fail_status.lock().unwrap() = Some(status);
    }

    fn calls(&self) -> usize {
      self.calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), ApiError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      match *self.fail_status.lock().unwrap() {
        Some(status) => Err(ApiError::from_status(status, "fake failure")),
        None => Ok(()),
      }
    }
  }

  #[async_trait]
  impl BlocklistApi for FakeApi {
    async fn get_blocked_users(&self, _guild_id: &str) -> Result<Vec<BlockedRecord>, ApiError> {
      self.check()?;
      Ok(self.records.lock().unwrap().clone())
    }

    async fn add_blocked_user(
      &self,
      _guild_id: &str,
      record: &BlockedRecord,
    ) -> Result<BlockedRecord, ApiError> {
      self.check()?;
      let mut stored = record.clone();
      stored.staff_name = "Mod".to_string();
      Ok(stored)
    }

    async fn delete_blocked_user(&self, _guild_id: &str, _user_id: &str) -> Result<(), ApiError> {
      self.check()
    }
  }

  fn record(id: &str, end_date: Option<&str>) -> BlockedRecord {
    BlockedRecord::new(id, "spam", end_date.map(|d| EndDate::Text(d.to_string())))
  }

  fn service(api: FakeApi) -> (BlocklistService, Arc<FakeApi>, Arc<ManualClock>) {
    let api = Arc::new(api);
    let clock = Arc::new(ManualClock::at(1_700_000_000_000));
    let cache = CacheLayer::new(Arc::new(MemoryStore::default())).with_clock(clock.clone());
    (BlocklistService::new(api.clone(), cache), api, clock)
  }

  fn loaded(fetch: Fetch) -> CacheResult<Vec<BlockedRecord>> {
    match fetch.outcome {
      FetchOutcome::Loaded(result) => result,
      other => panic!("expected loaded, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_fetch_without_guild_is_noop() {
    let (service, api, _) = service(FakeApi::default());

    let fetch = service.fetch("", false, LoadingFlags::started()).await;

    assert!(matches!(fetch.outcome, FetchOutcome::Skipped));
    assert_eq!(fetch.loading, LoadingFlags::started());
    assert_eq!(api.calls(), 0);
  }

  #[tokio::test]
  async fn test_fetch_serves_cache_within_ttl() {
    let (service, api, clock) = service(FakeApi::with_records(vec![record("1", None)]));

    let first = loaded(service.fetch("guild", false, LoadingFlags::started()).await);
    assert_eq!(first.source, CacheSource::Network);

    clock.advance(29_999);
    let fetch = service.fetch("guild", false, LoadingFlags::started()).await;
    assert_eq!(fetch.loading, LoadingFlags::settled());
    let second = loaded(fetch);

    assert_eq!(second.source, CacheSource::CacheFresh);
    assert_eq!(second.data, vec![record("1", None)]);
    assert_eq!(api.calls(), 1);
  }

  #[tokio::test]
  async fn test_fetch_hits_network_after_ttl() {
    let (service, api, clock) = service(FakeApi::with_records(vec![record("1", None)]));
    service.fetch("guild", false, LoadingFlags::started()).await;

    clock.advance(30_000);
    let result = loaded(service.fetch("guild", false, LoadingFlags::started()).await);

    assert_eq!(result.source, CacheSource::Network);
    assert_eq!(api.calls(), 2);
  }

  #[tokio::test]
  async fn test_bypass_cache_always_hits_network() {
    let (service, api, _) = service(FakeApi::default());
    service.fetch("guild", false, LoadingFlags::started()).await;

    service.fetch("guild", true, LoadingFlags::started()).await;
    service.fetch("guild", true, LoadingFlags::started()).await;

    assert_eq!(api.calls(), 3);
  }

  #[tokio::test]
  async fn test_fetch_normalizes_order() {
    let (service, _, _) = service(FakeApi::with_records(vec![
      record("1", None),
      record("2", Some("2030-02-01")),
      record("3", Some("2030-01-01")),
    ]));

    let result = loaded(service.fetch("guild", false, LoadingFlags::started()).await);

    let ids: Vec<_> = result.data.iter().map(|r| r.user_id.as_str()).collect();
    assert_eq!(ids, vec!["3", "2", "1"]);
  }

  #[tokio::test]
  async fn test_fetch_failures_are_classified() {
    for (status, reason) in [
      (401, RedirectReason::NoClank),
      (429, RedirectReason::Requests),
      (500, RedirectReason::Unknown),
    ] {
      let (service, api, _) = service(FakeApi::default());
      api.fail_with(status);

      let fetch = service.fetch("guild", true, LoadingFlags::started()).await;

      assert!(
        matches!(fetch.outcome, FetchOutcome::Failed(r) if r == reason),
        "status {} gave {:?}",
        status,
        fetch.outcome
      );
      assert_eq!(fetch.loading, LoadingFlags::settled());
      assert!(!fetch.loading.any());
    }
  }

  #[tokio::test]
  async fn test_failed_fetch_does_not_write_cache() {
    let (service, api, _) = service(FakeApi::default());
    api.fail_with(500);
    service.fetch("guild", false, LoadingFlags::started()).await;

    *api.fail_status.lock().unwrap() = None;
    let result = loaded(service.fetch("guild", false, LoadingFlags::started()).await);

    assert_eq!(result.source, CacheSource::Network);
    assert_eq!(api.calls(), 2);
  }

  #[tokio::test]
  async fn test_save_upserts_and_persists() {
    let (service, api, _) = service(FakeApi::default());
    let current = vec![record("2", None), record("3", Some("2030-01-01"))];

    let mutation = service
      .save("guild", record("1x", Some("2029-01-01")), current)
      .await;

    let records = mutation.records.unwrap();
    let ids: Vec<_> = records.iter().map(|r| r.user_id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3", "2"]);
    assert_eq!(records[0].staff_name, "Mod");
    assert_eq!(
      mutation.notice,
      Some(Notice::alert(notice::SAVED_TITLE, notice::SAVED_BODY))
    );

    // The merged list is what the next fetch serves from cache
    let cached = loaded(service.fetch("guild", false, LoadingFlags::started()).await);
    assert_eq!(cached.source, CacheSource::CacheFresh);
    assert_eq!(cached.data, records);
    assert_eq!(api.calls(), 1);
  }

  #[tokio::test]
  async fn test_save_replaces_existing_entry() {
    let (service, _, _) = service(FakeApi::default());
    let mut old = record("123", None);
    old.reason = "Old".to_string();
    let mut new = record("123", None);
    new.reason = "New".to_string();

    let records = service.save("guild", new, vec![old]).await.records.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].reason, "New");
  }

  #[tokio::test]
  async fn test_save_rejects_invalid_record() {
    let (service, api, _) = service(FakeApi::default());

    let mutation = service
      .save("guild", record("123", Some("2000-01-01")), Vec::new())
      .await;

    assert!(mutation.records.is_none());
    assert_eq!(
      mutation.notice,
      Some(Notice::alert(notice::INVALID_TITLE, notice::INVALID_BODY))
    );
    assert_eq!(api.calls(), 0);
  }

  #[tokio::test]
  async fn test_save_failures() {
    let (service, api, _) = service(FakeApi::default());

    api.fail_with(500);
    let mutation = service.save("guild", record("1", None), Vec::new()).await;
    assert!(mutation.records.is_none());
    assert_eq!(
      mutation.notice,
      Some(Notice::alert(notice::ERROR_TITLE, notice::ERROR_SAVE))
    );

    api.fail_with(401);
    let mutation = service.save("guild", record("1", None), Vec::new()).await;
    assert_eq!(
      mutation.notice,
      Some(Notice::Redirect(RedirectReason::NoClank))
    );
  }

  #[tokio::test]
  async fn test_delete_removes_entry() {
    let (service, _, _) = service(FakeApi::default());
    let current = vec![record("1", None), record("2", None)];

    let mutation = service.delete("guild", "1", current).await;

    assert_eq!(mutation.records, Some(vec![record("2", None)]));
    assert_eq!(
      mutation.notice,
      Some(Notice::alert(notice::DELETED_TITLE, notice::DELETED_BODY))
    );
  }

  #[tokio::test]
  async fn test_delete_not_found_still_removes_entry() {
    let (service, api, _) = service(FakeApi::default());
    api.fail_with(404);

    let mutation = service
      .delete("guild", "1", vec![record("1", None)])
      .await;

    assert_eq!(mutation.records, Some(Vec::new()));
    assert_eq!(
      mutation.notice,
      Some(Notice::alert(notice::NOT_FOUND_TITLE, notice::NOT_FOUND_BODY))
    );
  }

  #[tokio::test]
  async fn test_delete_failure_keeps_list() {
    let (service, api, _) = service(FakeApi::default());

    api.fail_with(503);
    let mutation = service
      .delete("guild", "1", vec![record("1", None)])
      .await;
    assert!(mutation.records.is_none());
    assert_eq!(
      mutation.notice,
      Some(Notice::alert(notice::ERROR_TITLE, notice::ERROR_DELETE))
    );

    api.fail_with(429);
    let mutation = service
      .delete("guild", "1", vec![record("1", None)])
      .await;
    assert_eq!(
      mutation.notice,
      Some(Notice::Redirect(RedirectReason::Requests))
    );
  }

  #[tokio::test]
  async fn test_mutations_without_guild_are_noops() {
    let (service, api, _) = service(FakeApi::default());

    let saved = service.save("", record("1", None), Vec::new()).await;
    let deleted = service.delete("", "1", Vec::new()).await;

    assert!(saved.records.is_none() && saved.notice.is_none());
    assert!(deleted.records.is_none() && deleted.notice.is_none());
    assert_eq!(api.calls(), 0);
  }
}
