use thiserror::Error;

/// Failure of a block-list API call, classified by transport status
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not authenticated")]
  Unauthenticated,

  #[error("rate limited")]
  RateLimited,

  #[error("not found")]
  NotFound,

  #[error("request failed (status {status:?}): {message}")]
  Unknown {
    status: Option<u16>,
    message: String,
  },
}

impl ApiError {
  pub fn from_status(status: u16, message: impl Into<String>) -> Self {
    match status {
      401 => ApiError::Unauthenticated,
      404 => ApiError::NotFound,
      429 => ApiError::RateLimited,
      _ => ApiError::Unknown {
        status: Some(status),
        message: message.into(),
      },
    }
  }

  pub fn unknown(message: impl Into<String>) -> Self {
    ApiError::Unknown {
      status: None,
      message: message.into(),
    }
  }

  /// Where the login-error flow should send the user after this failure
  pub fn redirect_reason(&self) -> RedirectReason {
    match self {
      ApiError::Unauthenticated => RedirectReason::NoClank,
      ApiError::RateLimited => RedirectReason::Requests,
      ApiError::NotFound | ApiError::Unknown { .. } => RedirectReason::Unknown,
    }
  }

  /// Session and quota failures leave the dashboard; everything else stays local
  pub fn requires_redirect(&self) -> bool {
    matches!(self, ApiError::Unauthenticated | ApiError::RateLimited)
  }
}

impl From<reqwest::Error> for ApiError {
  fn from(e: reqwest::Error) -> Self {
    match e.status() {
      Some(status) => ApiError::from_status(status.as_u16(), e.to_string()),
      None => ApiError::unknown(e.to_string()),
    }
  }
}

/// Reason tag handed to the login-error flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
  NoClank,
  Requests,
  Unknown,
}

impl RedirectReason {
  pub fn tag(self) -> &'static str {
    match self {
      RedirectReason::NoClank => "NO_CLANK",
      RedirectReason::Requests => "REQUESTS",
      RedirectReason::Unknown => "UNKNOWN",
    }
  }
}

impl std::fmt::Display for RedirectReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.tag())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_status_classification() {
    assert!(matches!(ApiError::from_status(401, ""), ApiError::Unauthenticated));
    assert!(matches!(ApiError::from_status(429, ""), ApiError::RateLimited));
    assert!(matches!(ApiError::from_status(404, ""), ApiError::NotFound));
    assert!(matches!(
      ApiError::from_status(500, "boom"),
      ApiError::Unknown {
        status: Some(500),
        ..
      }
    ));
  }

  #[test]
  fn test_redirect_reasons() {
    assert_eq!(ApiError::from_status(401, "").redirect_reason().tag(), "NO_CLANK");
    assert_eq!(ApiError::from_status(429, "").redirect_reason().tag(), "REQUESTS");
    assert_eq!(ApiError::from_status(500, "").redirect_reason().tag(), "UNKNOWN");
    assert_eq!(ApiError::unknown("bad json").redirect_reason().tag(), "UNKNOWN");
  }

  #[test]
  fn test_requires_redirect() {
    assert!(ApiError::Unauthenticated.requires_redirect());
    assert!(ApiError::RateLimited.requires_redirect());
    assert!(!ApiError::NotFound.requires_redirect());
    assert!(!ApiError::unknown("x").requires_redirect());
  }
}
