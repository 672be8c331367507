use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::api::{BlockedRecord, EndDate};
use crate::blocklist::records::{is_valid, sanitize_digits};
use crate::ui::renderfns::centered_rect;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

const USER_ID: usize = 0;
const REASON: usize = 1;
const END_DATE: usize = 2;

const LABELS: [&str; 3] = ["User ID", "Reason", "Ends"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMode {
  #[default]
  Add,
  /// User id is fixed while editing
  Edit,
}

/// Events emitted by the record form that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
  /// Valid record ready to save
  Submitted(BlockedRecord),
  Cancelled,
}

/// Modal form for adding or editing a block
#[derive(Debug, Clone, Default)]
pub struct RecordForm {
  active: bool,
  mode: FormMode,
  fields: [TextInput; 3],
  focus: usize,
  /// Record being edited, carries the fields the form doesn't show
  original: Option<BlockedRecord>,
  error: Option<&'static str>,
}

impl RecordForm {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn open_add(&mut self) {
    *self = Self {
      active: true,
      ..Self::default()
    };
  }

  pub fn open_edit(&mut self, record: &BlockedRecord) {
    *self = Self {
      active: true,
      mode: FormMode::Edit,
      fields: [
        TextInput::with_value(record.user_id.clone()),
        TextInput::with_value(record.reason.clone()),
        TextInput::with_value(
          record
            .end_date
            .as_ref()
            .map(EndDate::display)
            .unwrap_or_default(),
        ),
      ],
      focus: REASON,
      original: Some(record.clone()),
      error: None,
    };
  }

  fn close(&mut self) {
    *self = Self::default();
  }

  fn first_field(&self) -> usize {
    match self.mode {
      FormMode::Add => USER_ID,
      FormMode::Edit => REASON,
    }
  }

  fn focus_next(&mut self) {
    self.focus = if self.focus == END_DATE {
      self.first_field()
    } else {
      self.focus + 1
    };
  }

  fn focus_prev(&mut self) {
    self.focus = if self.focus == self.first_field() {
      END_DATE
    } else {
      self.focus - 1
    };
  }

  /// Record built from the current field values
  pub fn draft(&self) -> BlockedRecord {
    let mut record = self.original.clone().unwrap_or_default();
    record.user_id = self.fields[USER_ID].value().to_string();
    record.reason = self.fields[REASON].value().trim().to_string();

    let end_text = self.fields[END_DATE].value().trim();
    let unchanged = self
      .original
      .as_ref()
      .and_then(|r| r.end_date.as_ref())
      .filter(|end| end.display() == end_text)
      .cloned();

    record.end_date = match unchanged {
      Some(end) => Some(end),
      None if end_text.is_empty() => None,
      None => Some(EndDate::Text(end_text.to_string())),
    };
    record
  }

  fn problem(record: &BlockedRecord) -> &'static str {
    if record.user_id.is_empty() {
      "User ID is required"
    } else if record.reason.is_empty() {
      "Reason is required"
    } else {
      "End must be a future date (YYYY-MM-DD or RFC 3339), or empty"
    }
  }

  /// Handle a key event while the form is open
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<FormEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Esc => {
        self.close();
        return KeyResult::Event(FormEvent::Cancelled);
      }
      KeyCode::Tab | KeyCode::Down => {
        self.focus_next();
        return KeyResult::Handled;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.focus_prev();
        return KeyResult::Handled;
      }
      KeyCode::Enter => {
        let draft = self.draft();
        if is_valid(&draft) {
          self.close();
          return KeyResult::Event(FormEvent::Submitted(draft));
        }
        self.error = Some(Self::problem(&draft));
        return KeyResult::Handled;
      }
      _ => {}
    }

    let field = &mut self.fields[self.focus];
    if field.handle_key(key) == InputResult::Consumed {
      self.error = None;
      if self.focus == USER_ID {
        let digits = sanitize_digits(field.value());
        if digits != field.value() {
          field.set_value(digits);
        }
      }
    }
    KeyResult::Handled
  }

  /// Render the form overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let overlay_area = centered_rect(area, 64, 9);
    frame.render_widget(Clear, overlay_area);

    let title = match self.mode {
      FormMode::Add => " Block user ".to_string(),
      FormMode::Edit => format!(" Edit block {} ", self.fields[USER_ID].value()),
    };
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(title);

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let mut lines: Vec<Line> = Vec::new();
    for (i, field) in self.fields.iter().enumerate() {
      let focused = i == self.focus;
      let locked = i == USER_ID && self.mode == FormMode::Edit;

      let label_style = if focused {
        Style::default().fg(Color::Yellow).bold()
      } else {
        Style::default().fg(Color::DarkGray)
      };
      let mut spans = vec![Span::styled(format!("{:>8}: ", LABELS[i]), label_style)];

      if focused {
        let (before, after) = field.split_at_cursor();
        spans.push(Span::raw(before.to_string()));
        spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(after.to_string()));
      } else if locked {
        spans.push(Span::styled(
          field.value().to_string(),
          Style::default().fg(Color::DarkGray),
        ));
      } else if i == END_DATE && field.is_empty() {
        spans.push(Span::styled(
          "indefinite",
          Style::default().fg(Color::DarkGray).italic(),
        ));
      } else {
        spans.push(Span::raw(field.value().to_string()));
      }
      lines.push(Line::from(spans));
    }

    lines.push(Line::raw(""));
    lines.push(match self.error {
      Some(message) => Line::styled(message, Style::default().fg(Color::Red)),
      None => Line::raw(""),
    });
    lines.push(Line::styled(
      "Enter save  Tab next field  Esc cancel",
      Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(lines), inner);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn type_str(form: &mut RecordForm, s: &str) {
    for c in s.chars() {
      form.handle_key(key(KeyCode::Char(c)));
    }
  }

  #[test]
  fn test_user_id_is_sanitized_while_typing() {
    let mut form = RecordForm::new();
    form.open_add();
    type_str(&mut form, "12a3-4");

    assert_eq!(form.draft().user_id, "1234");
  }

  #[test]
  fn test_submit_add() {
    let mut form = RecordForm::new();
    form.open_add();
    type_str(&mut form, "555");
    form.handle_key(key(KeyCode::Tab));
    type_str(&mut form, " raiding ");

    let event = form.handle_key(key(KeyCode::Enter));

    let KeyResult::Event(FormEvent::Submitted(record)) = event else {
      panic!("expected submit, got {:?}", event);
    };
    assert_eq!(record.user_id, "555");
    assert_eq!(record.reason, "raiding");
    assert_eq!(record.end_date, None);
    assert!(!form.is_active());
  }

  #[test]
  fn test_invalid_submit_keeps_form_open() {
    let mut form = RecordForm::new();
    form.open_add();
    type_str(&mut form, "555");

    assert_eq!(form.handle_key(key(KeyCode::Enter)), KeyResult::Handled);
    assert!(form.is_active());
    assert_eq!(form.error, Some("Reason is required"));

    form.handle_key(key(KeyCode::Tab));
    type_str(&mut form, "spam");
    form.handle_key(key(KeyCode::Tab));
    type_str(&mut form, "2001-01-01");

    assert_eq!(form.handle_key(key(KeyCode::Enter)), KeyResult::Handled);
    assert!(form.error.unwrap().starts_with("End must be"));
  }

  #[test]
  fn test_edit_preserves_hidden_fields_and_locks_user_id() {
    let original = BlockedRecord {
      user_id: "42".to_string(),
      user_name: "Someone".to_string(),
      staff_name: "Mod".to_string(),
      reason: "old".to_string(),
      end_date: Some(EndDate::Text("2999-01-01".to_string())),
      ..BlockedRecord::default()
    };

    let mut form = RecordForm::new();
    form.open_edit(&original);
    assert_eq!(form.focus, REASON);

    // Focus cycles over reason and end date only
    form.handle_key(key(KeyCode::Tab));
    form.handle_key(key(KeyCode::Tab));
    assert_eq!(form.focus, REASON);

    form.handle_key(key(KeyCode::End));
    type_str(&mut form, "er");

    let KeyResult::Event(FormEvent::Submitted(record)) = form.handle_key(key(KeyCode::Enter))
    else {
      panic!("expected submit");
    };
    assert_eq!(record.user_id, "42");
    assert_eq!(record.user_name, "Someone");
    assert_eq!(record.reason, "older");
    assert_eq!(record.end_date, original.end_date);
  }

  #[test]
  fn test_escape_cancels() {
    let mut form = RecordForm::new();
    form.open_add();
    assert_eq!(
      form.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(FormEvent::Cancelled)
    );
    assert!(!form.is_active());
  }
}
