use crate::api::EndDate;
use ratatui::prelude::Rect;

/// Truncate a string to at most `max_len` chars, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Display text for a block's end date
pub fn format_end_date(end_date: Option<&EndDate>) -> String {
  match end_date {
    Some(end) => match end.instant() {
      Some(instant) => instant.format("%Y-%m-%d %H:%M").to_string(),
      None => end.display(),
    },
    None => "indefinite".to_string(),
  }
}

/// Rect of at most `width` x `height` centered in `area`
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  let x = area.x + (area.width - width) / 2;
  let y = area.y + (area.height - height) / 2;
  Rect::new(x, y, width, height)
}
