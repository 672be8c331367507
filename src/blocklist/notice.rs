use crate::api::RedirectReason;

// Alert translation keys
pub const SAVED_TITLE: &str = "blocked.saved.title";
pub const SAVED_BODY: &str = "blocked.saved.body";
pub const DELETED_TITLE: &str = "blocked.deleted.title";
pub const DELETED_BODY: &str = "blocked.deleted.body";
pub const NOT_FOUND_TITLE: &str = "blocked.not_found.title";
pub const NOT_FOUND_BODY: &str = "blocked.not_found.body";
pub const INVALID_TITLE: &str = "blocked.invalid.title";
pub const INVALID_BODY: &str = "blocked.invalid.body";
pub const ERROR_TITLE: &str = "blocked.error.title";
pub const ERROR_SAVE: &str = "blocked.error.save";
pub const ERROR_DELETE: &str = "blocked.error.delete";

/// Something the user must be told after an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
  /// Fire-and-forget notification, as a pair of translation keys
  Alert {
    title: &'static str,
    body: &'static str,
  },
  /// Leave the dashboard for the login-error flow
  Redirect(RedirectReason),
}

impl Notice {
  pub fn alert(title: &'static str, body: &'static str) -> Self {
    Notice::Alert { title, body }
  }

  pub fn deliver(self, sink: &mut dyn NoticeSink) {
    match self {
      Notice::Alert { title, body } => sink.show_alert(title, body),
      Notice::Redirect(reason) => sink.redirect_login_error(reason),
    }
  }
}

/// Receiver of notices, implemented by the presentation layer
pub trait NoticeSink {
  fn show_alert(&mut self, title_key: &'static str, body_key: &'static str);
  fn redirect_login_error(&mut self, reason: RedirectReason);
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSink {
  pub alerts: Vec<(&'static str, &'static str)>,
  pub redirects: Vec<RedirectReason>,
}

#[cfg(test)]
impl NoticeSink for RecordingSink {
  fn show_alert(&mut self, title_key: &'static str, body_key: &'static str) {
    self.alerts.push((title_key, body_key));
  }

  fn redirect_login_error(&mut self, reason: RedirectReason) {
    self.redirects.push(reason);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_deliver_routes_to_sink() {
    let mut sink = RecordingSink::default();

    Notice::alert(SAVED_TITLE, SAVED_BODY).deliver(&mut sink);
    Notice::Redirect(RedirectReason::Requests).deliver(&mut sink);

    assert_eq!(sink.alerts, vec![(SAVED_TITLE, SAVED_BODY)]);
    assert_eq!(sink.redirects, vec![RedirectReason::Requests]);
  }
}
