//! Caller-owned cancellation signal accepted by every store operation.
//!
//! A [`Cancel`] fires either when its [`CancelHandle`] is triggered or when
//! its deadline passes, whichever happens first. It is cheap to clone and can
//! be checked synchronously from the database thread.

use std::time::{Duration, Instant};

use tokio::sync::watch;

/// The observing side of a cancellation signal.
#[derive(Debug, Clone)]
pub struct Cancel {
  rx:       watch::Receiver<bool>,
  deadline: Option<Instant>,
}

/// The triggering side of a cancellation signal.
#[derive(Debug)]
pub struct CancelHandle {
  tx: watch::Sender<bool>,
}

impl Cancel {
  /// A signal that never fires unless a deadline is attached.
  pub fn never() -> Self {
    let (_tx, rx) = watch::channel(false);
    Self { rx, deadline: None }
  }

  /// A signal paired with the handle that fires it.
  pub fn pair() -> (CancelHandle, Self) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, Self { rx, deadline: None })
  }

  /// Also fire once `timeout` has elapsed from now. An earlier deadline that
  /// is already attached is kept.
  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    let at = Instant::now() + timeout;
    self.deadline = Some(self.deadline.map_or(at, |d| d.min(at)));
    self
  }

  pub fn deadline(&self) -> Option<Instant> { self.deadline }

  pub fn is_cancelled(&self) -> bool {
    *self.rx.borrow() || self.deadline.is_some_and(|d| Instant::now() >= d)
  }

  /// Resolve once the signal fires. Pends forever for [`Cancel::never`].
  pub async fn cancelled(&self) {
    let mut rx = self.rx.clone();
    let triggered = async move {
      loop {
        if *rx.borrow_and_update() {
          return;
        }
        if rx.changed().await.is_err() {
          // Handle dropped without firing.
          std::future::pending::<()>().await;
        }
      }
    };

    match self.deadline {
      Some(deadline) => {
        tokio::select! {
          () = triggered => {}
          () = tokio::time::sleep_until(deadline.into()) => {}
        }
      }
      None => triggered.await,
    }
  }
}

impl Default for Cancel {
  fn default() -> Self { Self::never() }
}

impl CancelHandle {
  pub fn cancel(&self) { self.tx.send_replace(true); }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn never_is_not_cancelled() {
    assert!(!Cancel::never().is_cancelled());
  }

  #[test]
  fn handle_fires_every_clone() {
    let (handle, cancel) = Cancel::pair();
    let other = cancel.clone();
    handle.cancel();
    assert!(cancel.is_cancelled());
    assert!(other.is_cancelled());
  }

  #[test]
  fn elapsed_deadline_fires() {
    let cancel = Cancel::never().with_timeout(Duration::ZERO);
    assert!(cancel.is_cancelled());
  }

  #[test]
  fn earlier_deadline_wins() {
    let cancel = Cancel::never()
      .with_timeout(Duration::from_secs(1))
      .with_timeout(Duration::from_secs(60));
    let left = cancel.deadline().unwrap() - Instant::now();
    assert!(left <= Duration::from_secs(1));
  }

  #[tokio::test]
  async fn cancelled_resolves_after_trigger() {
    let (handle, cancel) = Cancel::pair();
    let waiter = tokio::spawn(async move { cancel.cancelled().await });
    handle.cancel();
    tokio::time::timeout(Duration::from_secs(5), waiter)
      .await
      .expect("cancelled() did not resolve")
      .unwrap();
  }

  #[tokio::test]
  async fn cancelled_resolves_at_deadline() {
    let cancel = Cancel::never().with_timeout(Duration::from_millis(10));
    tokio::time::timeout(Duration::from_secs(5), cancel.cancelled())
      .await
      .expect("deadline did not fire");
  }
}
