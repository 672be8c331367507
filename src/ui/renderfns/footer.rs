use crate::ui::strings;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Alert shown in the footer until it expires
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusAlert {
  pub title: String,
  pub body: String,
  pub is_error: bool,
}

impl StatusAlert {
  /// Build from a pair of translation keys
  pub fn from_keys(title_key: &str, body_key: &str) -> Self {
    Self {
      title: strings::text(title_key).to_string(),
      body: strings::text(body_key).to_string(),
      is_error: strings::is_error(title_key),
    }
  }

  pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
    Self {
      title: title.into(),
      body: body.into(),
      is_error: true,
    }
  }

  pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
    Self {
      title: title.into(),
      body: body.into(),
      is_error: false,
    }
  }
}

/// Draw the footer bar with view breadcrumb and the current alert
pub fn draw_footer(frame: &mut Frame, area: Rect, breadcrumb: &[String], alert: Option<&StatusAlert>) {
  let mut spans = Vec::new();

  spans.push(Span::raw(" "));

  for (i, part) in breadcrumb.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
    }

    let style = if i == breadcrumb.len() - 1 {
      // Current view - highlighted
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default().fg(Color::White)
    };

    spans.push(Span::styled(part.clone(), style));
  }

  if let Some(alert) = alert {
    let color = if alert.is_error { Color::Red } else { Color::Green };
    spans.push(Span::styled("  │  ", Style::default().fg(Color::DarkGray)));
    spans.push(Span::styled(
      format!("{}: ", alert.title),
      Style::default().fg(color).bold(),
    ));
    spans.push(Span::styled(alert.body.clone(), Style::default().fg(color)));
  }

  let line = Line::from(spans);
  let paragraph = Paragraph::new(line).style(Style::default().bg(Color::Black));

  frame.render_widget(paragraph, area);
}
