//! English text for alert translation keys.

use crate::blocklist::notice;

const STRINGS: &[(&str, &str)] = &[
  (notice::SAVED_TITLE, "Saved"),
  (notice::SAVED_BODY, "The block was saved."),
  (notice::DELETED_TITLE, "Unblocked"),
  (notice::DELETED_BODY, "The user can use the bot again."),
  (notice::NOT_FOUND_TITLE, "Already unblocked"),
  (notice::NOT_FOUND_BODY, "That user was not blocked anymore."),
  (notice::INVALID_TITLE, "Invalid block"),
  (
    notice::INVALID_BODY,
    "A block needs a numeric user id, a reason and an end date that is not in the past.",
  ),
  (notice::ERROR_TITLE, "Something went wrong"),
  (notice::ERROR_SAVE, "The block could not be saved."),
  (notice::ERROR_DELETE, "The block could not be lifted."),
];

/// Look up the text for `key`, falling back to the key itself
pub fn text(key: &str) -> &str {
  STRINGS
    .iter()
    .find(|(k, _)| *k == key)
    .map(|(_, v)| *v)
    .unwrap_or(key)
}

/// Whether an alert with this title key reports a failure
pub fn is_error(title_key: &str) -> bool {
  title_key == notice::ERROR_TITLE || title_key == notice::INVALID_TITLE
}
