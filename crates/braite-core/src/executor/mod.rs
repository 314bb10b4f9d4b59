//! Fire-and-forget task execution.
//!
//! Callers hand a unit of work to a [`TaskExecutor`] and return without
//! awaiting it. The executor owns error containment: a unit that panics is
//! logged and dropped, never propagated to whoever submitted it.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::time::Duration;

use futures_util::FutureExt;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, warn};

use braite_types::error::DispatchError;

/// A detached unit of work.
pub type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Something that runs jobs independently of the submitting request.
pub trait TaskExecutor: Send + Sync {
    /// Schedule `job`. Must not wait for it to run.
    fn submit(&self, name: &str, job: Job) -> Result<(), DispatchError>;
}

/// Executor spawning onto the ambient tokio runtime.
///
/// Jobs are tracked so the server can drain them on shutdown.
#[derive(Debug, Clone, Default)]
pub struct TokioTaskExecutor {
    tracker: TaskTracker,
}

impl TokioTaskExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jobs submitted but not yet finished.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Refuse new jobs and wait up to `grace` for running ones.
    ///
    /// Returns `true` when every job finished inside the grace period.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.tracker.close();
        let pending = self.tracker.len();
        if pending > 0 {
            debug!(pending, "waiting for background jobs");
        }
        match tokio::time::timeout(grace, self.tracker.wait()).await {
            Ok(()) => true,
            Err(_) => {
                warn!(
                    pending = self.tracker.len(),
                    grace_secs = grace.as_secs(),
                    "background jobs still running after grace period"
                );
                false
            }
        }
    }
}

impl TaskExecutor for TokioTaskExecutor {
    fn submit(&self, name: &str, job: Job) -> Result<(), DispatchError> {
        if self.tracker.is_closed() {
            return Err(DispatchError::ShuttingDown(name.to_string()));
        }
        let name = name.to_string();
        self.tracker.spawn(async move {
            if AssertUnwindSafe(job).catch_unwind().await.is_err() {
                error!(job = %name, "background job panicked");
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_submit_runs_job_without_waiting() {
        let executor = TokioTaskExecutor::new();
        let (tx, rx) = tokio::sync::oneshot::channel();

        executor
            .submit(
                "slow",
                Box::pin(async move {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    let _ = tx.send(42);
                }),
            )
            .unwrap();

        // submit returned before the job completed
        assert_eq!(executor.in_flight(), 1);
        assert_eq!(rx.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_shutdown_drains_jobs() {
        let executor = TokioTaskExecutor::new();
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let done = Arc::clone(&done);
            executor
                .submit(
                    "count",
                    Box::pin(async move {
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        done.fetch_add(1, Ordering::SeqCst);
                    }),
                )
                .unwrap();
        }

        assert!(executor.shutdown(Duration::from_secs(5)).await);
        assert_eq!(done.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_submit_after_shutdown_is_refused() {
        let executor = TokioTaskExecutor::new();
        executor.shutdown(Duration::from_millis(10)).await;

        let err = executor.submit("late", Box::pin(async {})).unwrap_err();
        assert!(matches!(err, DispatchError::ShuttingDown(name) if name == "late"));
    }

    #[tokio::test]
    async fn test_panicking_job_is_contained() {
        let executor = TokioTaskExecutor::new();
        executor
            .submit("boom", Box::pin(async { panic!("job exploded") }))
            .unwrap();

        let done = Arc::new(AtomicUsize::new(0));
        let flag = Arc::clone(&done);
        executor
            .submit(
                "after",
                Box::pin(async move {
                    flag.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();

        assert!(executor.shutdown(Duration::from_secs(5)).await);
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_shutdown_times_out_on_stuck_job() {
        let executor = TokioTaskExecutor::new();
        executor
            .submit(
                "stuck",
                Box::pin(async { tokio::time::sleep(Duration::from_secs(30)).await }),
            )
            .unwrap();

        assert!(!executor.shutdown(Duration::from_millis(20)).await);
    }
}
