//! Deadline enforcement.
//!
//! # Responsibilities
//! - Bound a handler future by the configured function timeout
//! - Signal cancellation to work the handler spawned
//! - Classify late completion as a timeout
//!
//! # Design Decisions
//! - Uses Tokio's timer; cancellation drops the future at its current
//!   suspension point
//! - A future that never yields cannot be preempted. When it finally returns
//!   after the deadline its output is discarded and the run still counts as
//!   timed out
//! - Timeout errors are distinct from other errors

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::time::{sleep, Instant};

/// The bounded future did not finish in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deadline of {0:?} exceeded")]
pub struct DeadlineExceeded(pub Duration);

/// Observes cancellation of the scope it was taken from.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (_, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation was requested. Pends forever if the scope
    /// finished without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        let fired = rx.wait_for(|cancelled| *cancelled).await.map(|_| ());
        if fired.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// A deadline timer paired with a cooperative cancellation signal.
#[derive(Debug)]
pub struct CancelScope {
    deadline: Duration,
    tx: watch::Sender<bool>,
}

impl CancelScope {
    pub fn new(deadline: Duration) -> Self {
        let (tx, _) = watch::channel(false);
        Self { deadline, tx }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Run `fut` to completion or until the deadline, whichever comes first.
    pub async fn run<F: Future>(self, fut: F) -> Result<F::Output, DeadlineExceeded> {
        let started = Instant::now();
        let output = tokio::select! {
            biased;
            _ = sleep(self.deadline) => None,
            output = fut => Some(output),
        };

        match output {
            Some(output) if started.elapsed() <= self.deadline => Ok(output),
            _ => {
                self.tx.send_replace(true);
                Err(DeadlineExceeded(self.deadline))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let scope = CancelScope::new(Duration::from_secs(1));
        let signal = scope.signal();
        assert_eq!(scope.run(async { 7 }).await, Ok(7));
        assert!(!signal.is_cancelled());
    }

    #[tokio::test]
    async fn test_pending_future_times_out() {
        let scope = CancelScope::new(Duration::from_millis(20));
        let signal = scope.signal();

        let result = scope.run(std::future::pending::<()>()).await;

        assert_eq!(result, Err(DeadlineExceeded(Duration::from_millis(20))));
        assert!(signal.is_cancelled());
        signal.cancelled().await;
    }

    #[tokio::test]
    async fn test_non_yielding_future_is_discarded() {
        let scope = CancelScope::new(Duration::from_millis(10));
        let result = scope
            .run(async {
                std::thread::sleep(Duration::from_millis(40));
                "late"
            })
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_spawned_work_observes_cancellation() {
        let scope = CancelScope::new(Duration::from_millis(20));
        let signal = scope.signal();
        let watcher = tokio::spawn(async move {
            signal.cancelled().await;
            "stopped"
        });

        let _ = scope.run(sleep(Duration::from_secs(5))).await;
        assert_eq!(watcher.await.unwrap(), "stopped");
    }
}
