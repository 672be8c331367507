use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::commands::{self, Command};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};

/// Most recent command lines kept for recall
const HISTORY_LIMIT: usize = 50;

/// Events emitted by command input that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandEvent {
  /// Command line submitted
  Submitted(String),
  /// Command cancelled
  Cancelled,
}

/// `:` prompt with autocomplete and recall of earlier command lines
#[derive(Debug, Clone, Default)]
pub struct CommandInput {
  input: TextInput,
  active: bool,
  selected_suggestion: usize,
  /// Submitted lines, oldest first
  history: Vec<String>,
  /// Position while browsing history with Ctrl-p / Ctrl-n
  history_pos: Option<usize>,
}

impl CommandInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn activate(&mut self) {
    self.active = true;
    self.input.clear();
    self.selected_suggestion = 0;
    self.history_pos = None;
  }

  /// Autocomplete suggestions for the command word being typed
  pub fn suggestions(&self) -> Vec<&'static Command> {
    commands::get_suggestions(self.input.value())
  }

  /// Command whose argument is being typed, e.g. `guild` for "guild 12"
  fn argument_of(&self) -> Option<&'static Command> {
    let value = self.input.value();
    if !value.contains(char::is_whitespace) {
      return None;
    }
    value.split_whitespace().next().and_then(commands::resolve)
  }

  fn deactivate(&mut self) {
    self.active = false;
    self.input.clear();
    self.selected_suggestion = 0;
    self.history_pos = None;
  }

  fn remember(&mut self, line: &str) {
    if line.is_empty() || self.history.last().is_some_and(|last| last == line) {
      return;
    }
    self.history.push(line.to_string());
    if self.history.len() > HISTORY_LIMIT {
      self.history.remove(0);
    }
  }

  fn recall_older(&mut self) {
    if self.history.is_empty() {
      return;
    }
    let pos = match self.history_pos {
      None => self.history.len() - 1,
      Some(pos) => pos.saturating_sub(1),
    };
    self.history_pos = Some(pos);
    self.input.set_value(self.history[pos].clone());
    self.selected_suggestion = 0;
  }

  fn recall_newer(&mut self) {
    let Some(pos) = self.history_pos else {
      return;
    };
    if pos + 1 < self.history.len() {
      self.history_pos = Some(pos + 1);
      self.input.set_value(self.history[pos + 1].clone());
    } else {
      self.history_pos = None;
      self.input.clear();
    }
    self.selected_suggestion = 0;
  }

  /// Handle a key event
  /// Call this regardless of active state - it handles activation too
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<CommandEvent> {
    if !self.active {
      if key.code == KeyCode::Char(':') {
        self.activate();
        return KeyResult::Handled;
      }
      return KeyResult::NotHandled;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
      KeyCode::Esc => {
        self.deactivate();
        return KeyResult::Event(CommandEvent::Cancelled);
      }
      KeyCode::Enter => {
        let line = self.resolve_line();
        self.remember(&line);
        self.deactivate();
        return KeyResult::Event(CommandEvent::Submitted(line));
      }
      KeyCode::Tab => {
        // Complete the selected suggestion so an argument can follow
        if let Some(cmd) = self.suggestions().get(self.selected_suggestion) {
          self.input.set_value(format!("{} ", cmd.name));
          self.selected_suggestion = 0;
        }
        return KeyResult::Handled;
      }
      KeyCode::Char('p') if ctrl => {
        self.recall_older();
        return KeyResult::Handled;
      }
      KeyCode::Char('n') if ctrl => {
        self.recall_newer();
        return KeyResult::Handled;
      }
      KeyCode::Down | KeyCode::Up | KeyCode::BackTab => {
        let count = self.suggestions().len();
        if count > 0 {
          self.selected_suggestion = if key.code == KeyCode::Down {
            (self.selected_suggestion + 1) % count
          } else {
            (self.selected_suggestion + count - 1) % count
          };
        }
        return KeyResult::Handled;
      }
      _ => {}
    }

    if self.input.handle_key(key) == InputResult::Consumed {
      self.selected_suggestion = 0;
      self.history_pos = None;
    }
    KeyResult::Handled
  }

  /// Final command line: the highlighted suggestion, or the typed text once
  /// an argument follows the command word
  fn resolve_line(&self) -> String {
    match self.suggestions().get(self.selected_suggestion) {
      Some(cmd) => cmd.name.to_string(),
      None => self.input.value().trim().to_string(),
    }
  }

  /// Render the command overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let suggestions = self.suggestions();
    let hint = self.argument_of();

    let width = (area.width * 60 / 100).clamp(30, 60).min(area.width);
    let body_rows = if hint.is_some() {
      1
    } else {
      suggestions.len().min(8) as u16
    };
    let overlay_area = Rect::new(area.x + 1, area.y + 1, width, 3 + body_rows).intersection(area);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(" Command ");

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Length(1), Constraint::Min(0)])
      .split(inner);

    let (before, after) = self.input.split_at_cursor();
    let input_line = Line::from(vec![
      Span::styled(":", Style::default().fg(Color::Yellow)),
      Span::raw(before),
      Span::styled("_", Style::default().fg(Color::Yellow)), // Cursor
      Span::raw(after),
    ]);
    frame.render_widget(Paragraph::new(input_line), chunks[0]);

    if chunks[1].height == 0 {
      return;
    }

    if let Some(cmd) = hint {
      let line = Line::styled(cmd.description, Style::default().fg(Color::DarkGray));
      frame.render_widget(Paragraph::new(line), chunks[1]);
      return;
    }

    if suggestions.is_empty() {
      return;
    }

    let items: Vec<ListItem> = suggestions
      .iter()
      .take(8)
      .map(|cmd| {
        ListItem::new(Line::from(vec![
          Span::styled(format!("{:<12}", cmd.name), Style::default().fg(Color::Cyan)),
          Span::styled(cmd.description, Style::default().fg(Color::DarkGray)),
        ]))
      })
      .collect();

    let list =
      List::new(items).highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));
    let mut state = ListState::default();
    state.select(Some(self.selected_suggestion));

    frame.render_stateful_widget(list, chunks[1], &mut state);
  }
}
