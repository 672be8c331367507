use super::KeyResult;
use crate::ui::renderfns::centered_rect;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

/// Events emitted by the confirm dialog that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmEvent {
  /// Confirmed, returns the subject the dialog was opened for
  Confirmed(String),
  Cancelled,
}

/// Yes/no prompt guarding a destructive action
#[derive(Debug, Clone, Default)]
pub struct ConfirmDialog {
  active: bool,
  subject: String,
  message: String,
}

impl ConfirmDialog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Show the dialog for `subject` (e.g. a user id)
  pub fn show(&mut self, subject: impl Into<String>, message: impl Into<String>) {
    self.active = true;
    self.subject = subject.into();
    self.message = message.into();
  }

  pub fn hide(&mut self) {
    self.active = false;
    self.subject.clear();
    self.message.clear();
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<ConfirmEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
        let subject = std::mem::take(&mut self.subject);
        self.hide();
        KeyResult::Event(ConfirmEvent::Confirmed(subject))
      }
      KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Char('q') | KeyCode::Esc => {
        self.hide();
        KeyResult::Event(ConfirmEvent::Cancelled)
      }
      _ => KeyResult::Handled,
    }
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let overlay_area = centered_rect(area, 50, 6);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Red))
      .title(" Confirm ");

    let text = vec![
      Line::raw(self.message.as_str()),
      Line::raw(""),
      Line::from(vec![
        Span::styled("<y>", Style::default().fg(Color::Cyan)),
        Span::styled(" yes   ", Style::default().fg(Color::DarkGray)),
        Span::styled("<n>", Style::default().fg(Color::Cyan)),
        Span::styled(" no", Style::default().fg(Color::DarkGray)),
      ]),
    ];

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, overlay_area);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn test_inactive_passes_keys_through() {
    let mut dialog = ConfirmDialog::new();
    assert_eq!(dialog.handle_key(key(KeyCode::Char('y'))), KeyResult::NotHandled);
  }

  #[test]
  fn test_confirm_returns_subject() {
    let mut dialog = ConfirmDialog::new();
    dialog.show("123", "Unblock 123?");

    assert_eq!(dialog.handle_key(key(KeyCode::Char('x'))), KeyResult::Handled);
    assert_eq!(
      dialog.handle_key(key(KeyCode::Char('y'))),
      KeyResult::Event(ConfirmEvent::Confirmed("123".to_string()))
    );
    assert!(!dialog.is_active());
  }

  #[test]
  fn test_cancel() {
    let mut dialog = ConfirmDialog::new();
    dialog.show("123", "Unblock 123?");

    assert_eq!(
      dialog.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(ConfirmEvent::Cancelled)
    );
    assert!(!dialog.is_active());
  }
}
