//! Background work owned by a view.
//!
//! A `Task<T>` runs a future on the tokio runtime and is polled from the UI
//! tick without blocking. Dropping the task aborts the future, so work started
//! by a view never outlives it.
//!
//! # Example
//!
//! ```ignore
//! let service = service.clone();
//! let mut task = Task::spawn(async move {
//!     service.fetch("123", false, LoadingFlags::started()).await
//! });
//!
//! // In event loop tick
//! if let TaskPoll::Ready(fetch) = task.poll() {
//!     // apply result, trigger re-render
//! }
//! ```

use futures::FutureExt;
use std::future::Future;
use tokio::task::JoinHandle;

/// Outcome of polling a task
#[derive(Debug)]
pub enum TaskPoll<T> {
  /// Still running
  Pending,
  /// Finished with a value. Later polls return `Finished`.
  Ready(T),
  /// The future panicked or was aborted
  Failed(String),
  /// The result was already taken
  Finished,
}

/// Handle to a spawned future whose result is collected by polling
#[derive(Debug)]
pub struct Task<T> {
  handle: Option<JoinHandle<T>>,
}

impl<T: Send + 'static> Task<T> {
  /// Spawn `future` on the current runtime.
  pub fn spawn<Fut>(future: Fut) -> Self
  where
    Fut: Future<Output = T> + Send + 'static,
  {
    Self {
      handle: Some(tokio::spawn(future)),
    }
  }

  /// Check for a result without waiting.
  pub fn poll(&mut self) -> TaskPoll<T> {
    let Some(handle) = self.handle.as_mut() else {
      return TaskPoll::Finished;
    };

    match handle.now_or_never() {
      None => TaskPoll::Pending,
      Some(result) => {
        self.handle = None;
        match result {
          Ok(value) => TaskPoll::Ready(value),
          Err(e) => TaskPoll::Failed(e.to_string()),
        }
      }
    }
  }

  pub fn is_running(&self) -> bool {
    self.handle.is_some()
  }
}

impl<T> Drop for Task<T> {
  fn drop(&mut self) {
    if let Some(handle) = self.handle.take() {
      handle.abort();
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicBool, Ordering};
  use std::sync::Arc;
  use std::time::Duration;

  #[tokio::test]
  async fn test_task_success() {
    let mut task = Task::spawn(async { vec![1, 2, 3] });

    // Wait for the result
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(matches!(task.poll(), TaskPoll::Ready(v) if v == vec![1, 2, 3]));
    assert!(!task.is_running());
    assert!(matches!(task.poll(), TaskPoll::Finished));
  }

  #[tokio::test]
  async fn test_task_pending() {
    let mut task = Task::spawn(async {
      tokio::time::sleep(Duration::from_millis(100)).await;
      42
    });

    assert!(matches!(task.poll(), TaskPoll::Pending));
    assert!(task.is_running());
  }

  #[tokio::test]
  async fn test_task_panic_is_failure() {
    let mut task = Task::spawn(async {
      let value: Option<i32> = None;
      value.expect("boom")
    });

    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(matches!(task.poll(), TaskPoll::Failed(_)));
  }

  #[tokio::test]
  async fn test_drop_aborts_future() {
    let finished = Arc::new(AtomicBool::new(false));
    let flag = finished.clone();

    let task = Task::spawn(async move {
      tokio::time::sleep(Duration::from_millis(50)).await;
      flag.store(true, Ordering::SeqCst);
    });

    drop(task);
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(!finished.load(Ordering::SeqCst));
  }
}
