pub mod components;
pub mod renderfns;
pub mod strings;
pub mod view;
pub mod views;

use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::ListState;
use renderfns::{draw_footer, draw_header};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Footer
    ])
    .split(frame.area());

  let breadcrumb = app.view_breadcrumb();
  let title = app.title().to_string();
  let api_url = app.api_url().to_string();

  if let Some(view) = app.current_view_mut() {
    let guild = view.guild().unwrap_or_default().to_string();
    draw_header(frame, chunks[0], &title, &api_url, &guild, &view.shortcuts());
    view.render(frame, chunks[1]);
  }

  app.command_input().render_overlay(frame, chunks[1]);
  draw_footer(frame, chunks[2], &breadcrumb, app.alert());
}

/// Keep a list selection inside `0..len`, selecting the first row when unset
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  if len == 0 {
    state.select(None);
    return;
  }

  match state.selected() {
    None => state.select(Some(0)),
    Some(i) if i >= len => state.select(Some(len - 1)),
    Some(_) => {}
  }
}
