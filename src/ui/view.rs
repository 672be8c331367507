use crate::api::RedirectReason;
use crate::blocklist::NoticeSink;
use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// A keyboard shortcut hint for display in the header
#[derive(Debug, Clone)]
pub struct ShortcutInfo {
  pub key: &'static str,
  pub label: &'static str,
  pub priority: u8, // Lower = shown first
}

impl ShortcutInfo {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      priority: 100,
    }
  }

  pub const fn with_priority(mut self, priority: u8) -> Self {
    self.priority = priority;
    self
  }
}

/// Actions that a view can request in response to user input
pub enum ViewAction {
  /// No action needed
  None,
  /// Pop current view from stack (go back, or quit from the root)
  Pop,
}

/// Trait for view behavior
///
/// Views handle their own input modes (search, forms, dialogs) and return
/// actions for the App to execute. This creates a clean delegation chain:
/// App → View → Components
///
/// Views that load data asynchronously own a `Task<T>` and poll it in
/// `tick()`, reporting anything the user must see through the sink.
pub trait View {
  /// Handle a key event, returning an action for App to execute
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  /// Render the view to the frame
  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Get the breadcrumb label for this view
  fn breadcrumb_label(&self) -> String;

  /// Guild id shown in the header, if this view has one
  fn guild(&self) -> Option<&str> {
    None
  }

  /// Called on each tick to allow views to poll background tasks
  fn tick(&mut self, _sink: &mut dyn NoticeSink) {}

  /// Reload from the server. Returns false when the reload was refused.
  fn refresh(&mut self) -> bool {
    false
  }

  /// Reason this view is showing, if it is the login-error screen
  fn login_error(&self) -> Option<RedirectReason> {
    None
  }

  /// True while a text field or dialog owns the keyboard
  fn is_capturing_input(&self) -> bool {
    false
  }

  /// Get keyboard shortcuts to display in the header
  /// Override this to provide view-specific shortcuts
  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
