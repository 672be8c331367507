//! Wire types for the block-list endpoints.
//!
//! Field names follow the dashboard API (snake_case). Identifiers arrive as
//! strings from most endpoints but some older ones send bare numbers, so both
//! are accepted.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A single entry in a guild's block-list
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockedRecord {
  #[serde(deserialize_with = "string_or_number")]
  pub user_id: String,
  #[serde(default)]
  pub user_name: String,
  #[serde(default)]
  pub user_avatar: Option<String>,
  #[serde(default, deserialize_with = "string_or_number")]
  pub staff_id: String,
  #[serde(default)]
  pub staff_name: String,
  #[serde(default)]
  pub staff_avatar: Option<String>,
  #[serde(default)]
  pub reason: String,
  /// `None` means the block never expires
  #[serde(default)]
  pub end_date: Option<EndDate>,
}

#[cfg(test)]
impl BlockedRecord {
  /// A record carrying only the fields a moderator fills in.
  /// The server resolves names and avatars when it stores the block.
  pub fn new(user_id: impl Into<String>, reason: impl Into<String>, end_date: Option<EndDate>) -> Self {
    Self {
      user_id: user_id.into(),
      reason: reason.into(),
      end_date,
      ..Self::default()
    }
  }
}

/// Expiry of a block: epoch milliseconds or a date string
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EndDate {
  Millis(i64),
  Text(String),
}

impl<'de> Deserialize<'de> for EndDate {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
      Int(i64),
      Float(f64),
      Text(String),
    }

    // Fractional millis are truncated toward zero
    Ok(match Raw::deserialize(deserializer)? {
      Raw::Int(ms) => EndDate::Millis(ms),
      Raw::Float(ms) => EndDate::Millis(ms.trunc() as i64),
      Raw::Text(s) => EndDate::Text(s),
    })
  }
}

impl EndDate {
  /// Resolve to an instant, or `None` if the text is not a recognizable date.
  ///
  /// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS` and `YYYY-MM-DD HH:MM` (taken
  /// as UTC) and plain `YYYY-MM-DD` (midnight UTC).
  pub fn instant(&self) -> Option<DateTime<Utc>> {
    match self {
      EndDate::Millis(ms) => DateTime::from_timestamp_millis(*ms),
      EndDate::Text(s) => parse_date_text(s.trim()),
    }
  }

  /// Text shown in list and form fields
  pub fn display(&self) -> String {
    match self {
      EndDate::Millis(_) => self
        .instant()
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "invalid date".to_string()),
      EndDate::Text(s) => s.clone(),
    }
  }
}

fn parse_date_text(s: &str) -> Option<DateTime<Utc>> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(dt.with_timezone(&Utc));
  }
  for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
      return Some(dt.and_utc());
    }
  }
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|dt| dt.and_utc())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Id {
    Text(String),
    Number(u64),
  }

  Ok(match Id::deserialize(deserializer)? {
    Id::Text(s) => s,
    Id::Number(n) => n.to_string(),
  })
}
