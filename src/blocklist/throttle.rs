use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Default time the manual refresh stays disabled after use
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(15);

/// Disables manual refresh for a fixed cooldown after each use.
///
/// The cooldown runs from the moment of the refresh, independent of when the
/// refresh completes. Must be triggered from within a tokio runtime; the
/// timer is aborted when the throttle is dropped.
#[derive(Debug)]
pub struct RefreshThrottle {
  disabled: Arc<AtomicBool>,
  cooldown: Duration,
  timer: Option<JoinHandle<()>>,
}

impl RefreshThrottle {
  pub fn new(cooldown: Duration) -> Self {
    Self {
      disabled: Arc::new(AtomicBool::new(false)),
      cooldown,
      timer: None,
    }
  }

  pub fn is_disabled(&self) -> bool {
    self.disabled.load(Ordering::SeqCst)
  }

  /// Start a cooldown. Returns `false` without doing anything while disabled.
  pub fn try_trigger(&mut self) -> bool {
    if self.is_disabled() {
      return false;
    }

    self.disabled.store(true, Ordering::SeqCst);

    let disabled = Arc::clone(&self.disabled);
    let cooldown = self.cooldown;
    let timer = tokio::spawn(async move {
      tokio::time::sleep(cooldown).await;
      disabled.store(false, Ordering::SeqCst);
    });

    if let Some(previous) = self.timer.replace(timer) {
      previous.abort();
    }
    true
  }
}

impl Default for RefreshThrottle {
  fn default() -> Self {
    Self::new(DEFAULT_COOLDOWN)
  }
}

impl Drop for RefreshThrottle {
  fn drop(&mut self) {
    if let Some(timer) = self.timer.take() {
      timer.abort();
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test(start_paused = true)]
  async fn test_disabled_until_cooldown_elapses() {
    let mut throttle = RefreshThrottle::default();
    assert!(!throttle.is_disabled());

    assert!(throttle.try_trigger());
    assert!(throttle.is_disabled());

    tokio::time::sleep(Duration::from_millis(14_999)).await;
    assert!(throttle.is_disabled());
    assert!(!throttle.try_trigger());

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert!(!throttle.is_disabled());
    assert!(throttle.try_trigger());
  }

  #[tokio::test(start_paused = true)]
  async fn test_custom_cooldown() {
    let mut throttle = RefreshThrottle::new(Duration::from_secs(1));
    throttle.try_trigger();

    tokio::time::sleep(Duration::from_millis(1_001)).await;
    assert!(!throttle.is_disabled());
  }

  #[tokio::test(start_paused = true)]
  async fn test_drop_aborts_timer() {
    let mut throttle = RefreshThrottle::default();
    throttle.try_trigger();
    let disabled = Arc::clone(&throttle.disabled);

    drop(throttle);
    tokio::time::sleep(Duration::from_secs(20)).await;

    // Timer never ran, so the flag was never cleared
    assert!(disabled.load(Ordering::SeqCst));
  }
}
