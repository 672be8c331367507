//! Ordering, search and validation of block-list entries.

use crate::api::types::{BlockedRecord, EndDate};
use crate::cache::Cacheable;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

impl Cacheable for BlockedRecord {
  fn cache_prefix() -> &'static str {
    "blocked_users"
  }
}

/// Block-list order: expiring blocks first, soonest expiry first, indefinite
/// blocks last.
///
/// End dates that cannot be parsed sort after every parseable date but still
/// before indefinite blocks. Ties compare equal so a stable sort keeps their
/// relative order.
pub fn compare_end_dates(a: &BlockedRecord, b: &BlockedRecord) -> Ordering {
  match (&a.end_date, &b.end_date) {
    (None, None) => Ordering::Equal,
    (Some(_), None) => Ordering::Less,
    (None, Some(_)) => Ordering::Greater,
    (Some(x), Some(y)) => match (x.instant(), y.instant()) {
      (Some(x), Some(y)) => x.cmp(&y),
      (Some(_), None) => Ordering::Less,
      (None, Some(_)) => Ordering::Greater,
      (None, None) => Ordering::Equal,
    },
  }
}

/// Stable sort into block-list order.
pub fn sort_records(records: &mut [BlockedRecord]) {
  records.sort_by(compare_end_dates);
}

/// Replace the entry for `record.user_id` (or add it) and re-sort.
///
/// The record is removed and appended before sorting, so among equal end
/// dates it lands after the entries that were not touched.
pub fn upsert_and_sort(mut records: Vec<BlockedRecord>, record: BlockedRecord) -> Vec<BlockedRecord> {
  records.retain(|r| r.user_id != record.user_id);
  records.push(record);
  sort_records(&mut records);
  records
}

/// Drop the entry for `user_id`. Returns whether anything was removed.
pub fn remove_user(records: &mut Vec<BlockedRecord>, user_id: &str) -> bool {
  let before = records.len();
  records.retain(|r| r.user_id != user_id);
  records.len() != before
}

/// Case-insensitive substring search over ids, names and reason.
///
/// An empty term matches everything.
pub fn filter<'a>(records: &'a [BlockedRecord], term: &str) -> Vec<&'a BlockedRecord> {
  if term.is_empty() {
    return records.iter().collect();
  }

  let term = term.to_lowercase();
  records
    .iter()
    .filter(|r| {
      [
        &r.user_id,
        &r.staff_id,
        &r.user_name,
        &r.staff_name,
        &r.reason,
      ]
      .iter()
      .any(|field| field.to_lowercase().contains(&term))
    })
    .collect()
}

/// Whether a record may be submitted at `now`.
///
/// Requires a numeric user id, a reason, and an end date that is either
/// absent or not before `now`.
pub fn is_valid_at(record: &BlockedRecord, now: DateTime<Utc>) -> bool {
  is_numeric_id(&record.user_id)
    && !record.reason.is_empty()
    && record
      .end_date
      .as_ref()
      .map_or(true, |end| end_date_allowed(end, now))
}

pub fn is_valid(record: &BlockedRecord) -> bool {
  is_valid_at(record, Utc::now())
}

fn end_date_allowed(end: &EndDate, now: DateTime<Utc>) -> bool {
  end.instant().is_some_and(|instant| instant >= now)
}

fn is_numeric_id(id: &str) -> bool {
  !id.is_empty() && id.chars().all(|c| c.is_ascii_digit())
}

/// Strip every non-digit from the user id.
pub fn sanitize_user_id(record: &mut BlockedRecord) {
  record.user_id = sanitize_digits(&record.user_id);
}

pub fn sanitize_digits(s: &str) -> String {
  s.chars().filter(|c| c.is_ascii_digit()).collect()
}
