use crate::api::BlockedRecord;
use crate::blocklist::notice;
use crate::blocklist::records::filter;
use crate::blocklist::{
  BlocklistService, Fetch, FetchOutcome, LoadingFlags, Mutation, NoticeSink, RefreshThrottle,
};
use crate::cache::CacheSource;
use crate::task::{Task, TaskPoll};
use crate::ui::components::{
  ConfirmDialog, ConfirmEvent, FormEvent, KeyResult, RecordForm, SearchEvent, SearchInput,
};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{format_end_date, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use std::time::Duration;
use tracing::warn;

/// Where the records on screen came from
#[derive(Debug, Clone, Copy)]
struct Loaded {
  source: CacheSource,
  cached_at: i64,
}

/// Which change a mutation task is carrying out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MutationKind {
  Save,
  Delete,
}

impl MutationKind {
  /// Alert body raised when the task dies before reporting back
  fn failure_body(self) -> &'static str {
    match self {
      MutationKind::Save => notice::ERROR_SAVE,
      MutationKind::Delete => notice::ERROR_DELETE,
    }
  }
}

/// Block-list of one guild: browse, search, add, edit and lift blocks
pub struct BlocklistView {
  service: BlocklistService,
  guild_id: String,
  records: Vec<BlockedRecord>,
  loaded: Option<Loaded>,
  load_failed: bool,
  loading: LoadingFlags,
  fetch: Option<Task<Fetch>>,
  mutation: Option<(MutationKind, Task<Mutation>)>,
  throttle: RefreshThrottle,
  list_state: ListState,
  search: SearchInput,
  form: RecordForm,
  confirm: ConfirmDialog,
}

impl BlocklistView {
  pub fn new(service: BlocklistService, guild_id: String, cooldown: Duration) -> Self {
    let mut view = Self {
      service,
      guild_id,
      records: Vec::new(),
      loaded: None,
      load_failed: false,
      loading: LoadingFlags::default(),
      fetch: None,
      mutation: None,
      throttle: RefreshThrottle::new(cooldown),
      list_state: ListState::default(),
      search: SearchInput::new(),
      form: RecordForm::new(),
      confirm: ConfirmDialog::new(),
    };
    view.load(false);
    view
  }

  /// Start a fetch, replacing any fetch still in flight
  fn load(&mut self, bypass_cache: bool) {
    if self.guild_id.is_empty() {
      return;
    }

    let loading = LoadingFlags {
      is_loading: true,
      start_loading: self.loaded.is_none(),
    };
    self.loading = loading;

    let service = self.service.clone();
    let guild_id = self.guild_id.clone();
    self.fetch = Some(Task::spawn(async move {
      service.fetch(&guild_id, bypass_cache, loading).await
    }));
  }

  fn is_mutating(&self) -> bool {
    self
      .mutation
      .as_ref()
      .is_some_and(|(_, task)| task.is_running())
  }

  fn visible(&self) -> Vec<&BlockedRecord> {
    filter(&self.records, self.search.query())
  }

  fn clamp_selection(&mut self) {
    let len = self.visible().len();
    ensure_valid_selection(&mut self.list_state, len);
  }

  fn selected_record(&self) -> Option<BlockedRecord> {
    let idx = self.list_state.selected()?;
    self.visible().get(idx).map(|r| (*r).clone())
  }

  fn save(&mut self, record: BlockedRecord) {
    let service = self.service.clone();
    let guild_id = self.guild_id.clone();
    let current = self.records.clone();
    let task = Task::spawn(async move { service.save(&guild_id, record, current).await });
    self.mutation = Some((MutationKind::Save, task));
  }

  fn delete(&mut self, user_id: String) {
    let service = self.service.clone();
    let guild_id = self.guild_id.clone();
    let current = self.records.clone();
    let task = Task::spawn(async move { service.delete(&guild_id, &user_id, current).await });
    self.mutation = Some((MutationKind::Delete, task));
  }

  fn apply_fetch(&mut self, fetch: Fetch, sink: &mut dyn NoticeSink) {
    self.loading = fetch.loading;
    match fetch.outcome {
      FetchOutcome::Skipped => {}
      FetchOutcome::Loaded(result) => {
        self.records = result.data;
        self.loaded = Some(Loaded {
          source: result.source,
          cached_at: result.cached_at,
        });
        self.load_failed = false;
        self.clamp_selection();
      }
      FetchOutcome::Failed(reason) => {
        self.load_failed = true;
        sink.redirect_login_error(reason);
      }
    }
  }

  fn apply_mutation(&mut self, mutation: Mutation, sink: &mut dyn NoticeSink) {
    if let Some(records) = mutation.records {
      self.records = records;
      self.clamp_selection();
    }
    if let Some(notice) = mutation.notice {
      notice.deliver(sink);
    }
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let total = self.records.len();
    let visible_len = self.visible().len();
    self.clamp_selection();

    let status = if self.loading.start_loading {
      "loading...".to_string()
    } else if self.load_failed {
      "failed".to_string()
    } else if visible_len != total {
      format!("{}/{}", visible_len, total)
    } else {
      total.to_string()
    };
    let mut title = format!(" Blocked users ({}) ", status);
    if self.loading.is_loading && !self.loading.start_loading {
      title.push_str("(refreshing) ");
    } else if let Some(Loaded {
      source: CacheSource::CacheFresh,
      cached_at,
    }) = self.loaded
    {
      let age = (Utc::now().timestamp_millis() - cached_at).max(0) / 1000;
      title.push_str(&format!("(cached {}s ago) ", age));
    }
    if self.is_mutating() {
      title.push_str("(saving...) ");
    }

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if visible_len == 0 && !self.loading.start_loading {
      let content = if self.guild_id.is_empty() {
        "No guild selected. Set default_guild in config, pass --guild, or use :guild <id>.".to_string()
      } else if self.load_failed {
        "Failed to load blocked users. Press 'r' to retry.".to_string()
      } else if total > 0 {
        format!("No blocked users match '{}'.", self.search.query())
      } else {
        "No blocked users. Press 'a' to add one.".to_string()
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let now = Utc::now();
    let items: Vec<ListItem> = self
      .visible()
      .into_iter()
      .map(|record| {
        let user = if record.user_name.is_empty() {
          record.user_id.clone()
        } else {
          format!("{} ({})", record.user_name, record.user_id)
        };
        let staff = if record.staff_name.is_empty() {
          record.staff_id.as_str()
        } else {
          record.staff_name.as_str()
        };

        let expired = record
          .end_date
          .as_ref()
          .and_then(|end| end.instant())
          .is_some_and(|end| end < now);
        let end_style = match (&record.end_date, expired) {
          (None, _) => Style::default().fg(Color::Magenta),
          (Some(_), true) => Style::default().fg(Color::DarkGray),
          (Some(_), false) => Style::default().fg(Color::Yellow),
        };

        let line = Line::from(vec![
          Span::styled(
            format!("{:<34}", truncate(&user, 34)),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<16}", format_end_date(record.end_date.as_ref())),
            end_style,
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<16}", truncate(staff, 16)),
            Style::default().fg(Color::Green),
          ),
          Span::raw(" "),
          Span::raw(truncate(&record.reason, 60)),
        ]);
        ListItem::new(line)
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }
}

impl View for BlocklistView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.confirm.handle_key(key) {
      KeyResult::Event(ConfirmEvent::Confirmed(user_id)) => {
        self.delete(user_id);
        return ViewAction::None;
      }
      KeyResult::Event(ConfirmEvent::Cancelled) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match self.form.handle_key(key) {
      KeyResult::Event(FormEvent::Submitted(record)) => {
        self.save(record);
        return ViewAction::None;
      }
      KeyResult::Event(FormEvent::Cancelled) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match self.search.handle_key(key) {
      KeyResult::Event(SearchEvent::Changed(_)) => {
        self.list_state.select(None);
        self.clamp_selection();
        return ViewAction::None;
      }
      KeyResult::Event(SearchEvent::Submitted) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.list_state.select_next();
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.list_state.select_previous();
      }
      KeyCode::Char('r') => {
        self.refresh();
      }
      KeyCode::Char('a') if !self.guild_id.is_empty() && !self.is_mutating() => {
        self.form.open_add();
      }
      KeyCode::Char('e') | KeyCode::Enter if !self.is_mutating() => {
        if let Some(record) = self.selected_record() {
          self.form.open_edit(&record);
        }
      }
      KeyCode::Char('d') | KeyCode::Delete if !self.is_mutating() => {
        if let Some(record) = self.selected_record() {
          let who = if record.user_name.is_empty() {
            record.user_id.clone()
          } else {
            format!("{} ({})", record.user_name, record.user_id)
          };
          self
            .confirm
            .show(record.user_id, format!("Lift the block on {}?", who));
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
    let matches = self.visible().len();
    self.search.render_overlay(frame, area, matches);
    self.form.render_overlay(frame, area);
    self.confirm.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    if self.guild_id.is_empty() {
      "Blocked users".to_string()
    } else {
      format!("Blocked users [{}]", self.guild_id)
    }
  }

  fn guild(&self) -> Option<&str> {
    Some(&self.guild_id)
  }

  fn tick(&mut self, sink: &mut dyn NoticeSink) {
    if let Some(task) = self.fetch.as_mut() {
      match task.poll() {
        TaskPoll::Pending => {}
        TaskPoll::Ready(fetch) => {
          self.fetch = None;
          self.apply_fetch(fetch, sink);
        }
        TaskPoll::Failed(e) => {
          warn!(guild_id = %self.guild_id, "Block-list fetch task failed: {}", e);
          self.fetch = None;
          self.loading = LoadingFlags::settled();
          self.load_failed = true;
        }
        TaskPoll::Finished => self.fetch = None,
      }
    }

    if let Some((kind, task)) = self.mutation.as_mut() {
      let kind = *kind;
      match task.poll() {
        TaskPoll::Pending => {}
        TaskPoll::Ready(mutation) => {
          self.mutation = None;
          self.apply_mutation(mutation, sink);
        }
        TaskPoll::Failed(e) => {
          warn!(guild_id = %self.guild_id, ?kind, "Block-list update task failed: {}", e);
          self.mutation = None;
          sink.show_alert(notice::ERROR_TITLE, kind.failure_body());
        }
        TaskPoll::Finished => self.mutation = None,
      }
    }
  }

  fn refresh(&mut self) -> bool {
    if self.guild_id.is_empty() || !self.throttle.try_trigger() {
      return false;
    }
    self.load(true);
    true
  }

  fn is_capturing_input(&self) -> bool {
    self.search.is_active() || self.form.is_active() || self.confirm.is_active()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    let refresh = if self.throttle.is_disabled() {
      "refresh (cooling down)"
    } else {
      "refresh"
    };
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("/", "search").with_priority(20),
      ShortcutInfo::new("r", refresh).with_priority(30),
      ShortcutInfo::new("a", "add").with_priority(40),
      ShortcutInfo::new("e", "edit").with_priority(50),
      ShortcutInfo::new("d", "unblock").with_priority(60),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ]
  }
}
