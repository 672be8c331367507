use crate::api::RedirectReason;
use crate::ui::renderfns::centered_rect;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// Shown instead of the dashboard when the API refuses us
pub struct LoginErrorView {
  reason: RedirectReason,
}

impl LoginErrorView {
  pub fn new(reason: RedirectReason) -> Self {
    Self { reason }
  }

  fn message(&self) -> (&'static str, &'static str) {
    match self.reason {
      RedirectReason::NoClank => (
        "Not signed in",
        "The dashboard rejected the API token. Check BLOCKWATCH_API_TOKEN and that the bot is in this guild.",
      ),
      RedirectReason::Requests => (
        "Too many requests",
        "The dashboard is rate limiting us. Wait a moment, then go back and refresh.",
      ),
      RedirectReason::Unknown => (
        "Something went wrong",
        "The dashboard could not be reached or returned an unexpected error. See the log file for details.",
      ),
    }
  }
}

impl View for LoginErrorView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let (title, body) = self.message();

    let block = Block::default()
      .title(format!(" {} ", title))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Red));

    let text = vec![
      Line::raw(body),
      Line::raw(""),
      Line::styled(
        format!("error: {}", self.reason.tag()),
        Style::default().fg(Color::DarkGray),
      ),
    ];

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, centered_rect(area, 72, 8));
  }

  fn breadcrumb_label(&self) -> String {
    "Login error".to_string()
  }

  fn login_error(&self) -> Option<RedirectReason> {
    Some(self.reason)
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  #[test]
  fn test_any_dismiss_key_pops() {
    let mut view = LoginErrorView::new(RedirectReason::NoClank);
    for code in [KeyCode::Char('q'), KeyCode::Esc, KeyCode::Enter] {
      assert!(matches!(
        view.handle_key(KeyEvent::new(code, KeyModifiers::NONE)),
        ViewAction::Pop
      ));
    }
    assert!(matches!(
      view.handle_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE)),
      ViewAction::None
    ));
  }
}
