use crate::api::RedirectReason;
use crate::blocklist::{BlocklistService, NoticeSink};
use crate::commands::{self, Action};
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::ui;
use crate::ui::components::{CommandEvent, CommandInput, KeyResult};
use crate::ui::renderfns::StatusAlert;
use crate::ui::view::{View, ViewAction};
use crate::ui::views::{BlocklistView, LoginErrorView};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::{Duration, Instant};
use tracing::info;

/// How long an alert stays in the footer
const ALERT_TTL: Duration = Duration::from_secs(6);

/// Notices collected from views during a tick
#[derive(Debug, Default)]
struct PendingNotices {
  alerts: Vec<StatusAlert>,
  redirects: Vec<RedirectReason>,
}

impl NoticeSink for PendingNotices {
  fn show_alert(&mut self, title_key: &'static str, body_key: &'static str) {
    self.alerts.push(StatusAlert::from_keys(title_key, body_key));
  }

  fn redirect_login_error(&mut self, reason: RedirectReason) {
    self.redirects.push(reason);
  }
}

/// Main application state
pub struct App {
  /// Navigation stack - root is always at index 0
  view_stack: Vec<Box<dyn View>>,

  /// Command input component (handles : mode)
  command: CommandInput,

  /// Application configuration
  config: Config,

  /// Block-list operations shared by every view
  service: BlocklistService,

  /// Footer alert and when it was raised
  alert: Option<(StatusAlert, Instant)>,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: Config, service: BlocklistService) -> Self {
    let guild = config.default_guild.clone().unwrap_or_default();
    let root = BlocklistView::new(service.clone(), guild, config.refresh.cooldown());

    Self {
      view_stack: vec![Box::new(root)],
      command: CommandInput::new(),
      config,
      service,
      alert: None,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = self.event_loop(&mut terminal).await;

    // Cleanup terminal, even when the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop(
    &mut self,
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
  ) -> Result<()> {
    let mut events = EventHandler::new(Duration::from_millis(100));

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(Event::Key(key)) => self.handle_key(key),
        Some(Event::Tick) => self.tick(),
        Some(Event::Resize) => {}
        None => break,
      }
    }

    Ok(())
  }

  fn tick(&mut self) {
    let mut notices = PendingNotices::default();
    for view in self.view_stack.iter_mut() {
      view.tick(&mut notices);
    }
    self.apply_notices(notices);

    if let Some((_, raised)) = &self.alert {
      if raised.elapsed() > ALERT_TTL {
        self.alert = None;
      }
    }
  }

  fn apply_notices(&mut self, notices: PendingNotices) {
    if let Some(alert) = notices.alerts.into_iter().last() {
      self.set_alert(alert);
    }

    if let Some(reason) = notices.redirects.into_iter().last() {
      let already_shown = self
        .current_view()
        .and_then(|view| view.login_error())
        .is_some_and(|shown| shown == reason);
      if !already_shown {
        info!(reason = %reason, "Redirecting to login error");
        self.view_stack.push(Box::new(LoginErrorView::new(reason)));
      }
    }
  }

  fn set_alert(&mut self, alert: StatusAlert) {
    self.alert = Some((alert, Instant::now()));
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    // Command mode is only reachable when the view isn't taking text input
    let view_capturing = self
      .current_view()
      .is_some_and(|view| view.is_capturing_input());
    if self.command.is_active() || !view_capturing {
      match self.command.handle_key(key) {
        KeyResult::Event(CommandEvent::Submitted(line)) => {
          self.execute_command(&line);
          return;
        }
        KeyResult::Event(CommandEvent::Cancelled) | KeyResult::Handled => return,
        KeyResult::NotHandled => {}
      }
    }

    let action = match self.view_stack.last_mut() {
      Some(view) => view.handle_key(key),
      None => ViewAction::None,
    };
    self.apply_action(action);
  }

  fn apply_action(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
    }
  }

  fn execute_command(&mut self, line: &str) {
    match commands::parse(line) {
      Action::SwitchGuild(guild) => {
        info!(guild_id = %guild, "Switching guild");
        let view = BlocklistView::new(self.service.clone(), guild, self.config.refresh.cooldown());
        self.view_stack = vec![Box::new(view)];
      }
      Action::Refresh => {
        self.view_stack.truncate(1);
        let refreshed = self
          .view_stack
          .first_mut()
          .is_some_and(|view| view.refresh());
        if !refreshed {
          self.set_alert(StatusAlert::info(
            "Refresh",
            "Wait a moment before refreshing again.",
          ));
        }
      }
      Action::Quit => self.should_quit = true,
      Action::Usage(usage) => self.set_alert(StatusAlert::error("Usage", usage)),
      Action::Unknown(word) if word.is_empty() => {}
      Action::Unknown(word) => {
        self.set_alert(StatusAlert::error("Unknown command", word));
      }
    }
  }

  // Accessors for UI rendering
  pub fn current_view(&self) -> Option<&dyn View> {
    self.view_stack.last().map(|v| v.as_ref())
  }

  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn command_input(&self) -> &CommandInput {
    &self.command
  }

  pub fn alert(&self) -> Option<&StatusAlert> {
    self.alert.as_ref().map(|(alert, _)| alert)
  }

  pub fn title(&self) -> &str {
    self.config.title.as_deref().unwrap_or("blockwatch")
  }

  pub fn api_url(&self) -> &str {
    &self.config.api.url
  }

  pub fn view_breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::{ApiError, BlockedRecord, BlocklistApi};
  use crate::cache::{CacheLayer, MemoryStore};
  use crate::config::{ApiConfig, CacheConfig, RefreshConfig};
  use async_trait::async_trait;
  use std::sync::Arc;

  struct DownApi;

  #[async_trait]
  impl BlocklistApi for DownApi {
    async fn get_blocked_users(&self, _guild_id: &str) -> Result<Vec<BlockedRecord>, ApiError> {
      Err(ApiError::from_status(401, ""))
    }

    async fn add_blocked_user(
      &self,
      _guild_id: &str,
      _record: &BlockedRecord,
    ) -> Result<BlockedRecord, ApiError> {
      Err(ApiError::from_status(401, ""))
    }

    async fn delete_blocked_user(&self, _guild_id: &str, _user_id: &str) -> Result<(), ApiError> {
      Err(ApiError::from_status(401, ""))
    }
  }

  fn app(guild: Option<&str>) -> App {
    let config = Config {
      api: ApiConfig {
        url: "https://dash.example.com/api".to_string(),
      },
      default_guild: guild.map(str::to_string),
      title: None,
      cache: CacheConfig::default(),
      refresh: RefreshConfig::default(),
    };
    let service = BlocklistService::new(
      Arc::new(DownApi),
      CacheLayer::new(Arc::new(MemoryStore::default())),
    );
    App::new(config, service)
  }

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[tokio::test]
  async fn test_unauthenticated_load_pushes_login_error_once() {
    let mut app = app(Some("42"));

    for _ in 0..100 {
      app.tick();
      if app.view_stack.len() > 1 {
        break;
      }
      tokio::task::yield_now().await;
    }
    app.tick();

    assert_eq!(app.view_breadcrumb(), vec!["Blocked users [42]", "Login error"]);
    assert_eq!(
      app.current_view().and_then(|v| v.login_error()),
      Some(RedirectReason::NoClank)
    );

    // Dismissing returns to the dashboard
    app.handle_key(key(KeyCode::Esc));
    assert_eq!(app.view_stack.len(), 1);
  }

  #[tokio::test]
  async fn test_guild_command_replaces_root() {
    let mut app = app(None);

    app.execute_command("guild 99");

    assert_eq!(app.view_breadcrumb(), vec!["Blocked users [99]"]);
  }

  #[tokio::test]
  async fn test_bad_commands_raise_alerts() {
    let mut app = app(None);

    app.execute_command("guild abc");
    assert_eq!(app.alert().map(|a| a.title.as_str()), Some("Usage"));

    app.execute_command("frobnicate");
    assert_eq!(app.alert().map(|a| a.body.as_str()), Some("frobnicate"));
  }

  #[tokio::test]
  async fn test_quit_from_root() {
    let mut app = app(None);
    app.handle_key(key(KeyCode::Char('q')));
    assert!(app.should_quit);
  }

  #[test]
  fn test_pending_notices_translate_keys() {
    let mut notices = PendingNotices::default();
    notices.show_alert(
      crate::blocklist::notice::SAVED_TITLE,
      crate::blocklist::notice::SAVED_BODY,
    );
    assert_eq!(notices.alerts[0].title, "Saved");
    assert!(!notices.alerts[0].is_error);
  }
}
