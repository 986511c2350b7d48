//! Task supervisor: spawn, isolate, and drain background work.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::Notify;
use tracing::debug;

use super::outcome::TaskOutcome;
use super::TaskId;

#[derive(Debug, Default)]
struct Tracker {
    outstanding: AtomicUsize,
    idle: Notify,
}

/// Decrements the outstanding count when dropped, even if the task body
/// never finishes because the runtime is shutting down.
struct InFlight {
    tracker: Arc<Tracker>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if self.tracker.outstanding.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.tracker.idle.notify_waiters();
        }
    }
}

/// Runs fire-and-forget tasks off the caller's path.
///
/// Cloning is cheap; clones share the same outstanding-task count, so a
/// handler can hold one while `main` waits on another during shutdown.
///
/// ```ignore
/// supervisor.submit("send welcome email", async move {
///     mailer.send(&message).await?;
///     Ok(())
/// });
/// // ... on shutdown:
/// supervisor.await_all().await;
/// ```
#[derive(Debug, Clone, Default)]
pub struct TaskSupervisor {
    tracker: Arc<Tracker>,
}

impl TaskSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of submitted tasks that have not finished yet.
    pub fn outstanding(&self) -> usize {
        self.tracker.outstanding.load(Ordering::Acquire)
    }

    fn register(&self) -> InFlight {
        self.tracker.outstanding.fetch_add(1, Ordering::AcqRel);
        InFlight {
            tracker: Arc::clone(&self.tracker),
        }
    }

    /// Start `task` on its own Tokio task and return immediately.
    ///
    /// An `Err` or a panic from `task` is logged and otherwise discarded.
    ///
    /// # Panics
    /// If called outside a Tokio runtime.
    pub fn submit<F>(&self, name: impl Into<String>, task: F) -> TaskId
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let id = TaskId::new();
        let name = name.into();
        let in_flight = self.register();
        debug!(task_id = %id, task = %name, "background task submitted");

        tokio::spawn(async move {
            let outcome = match AssertUnwindSafe(task).catch_unwind().await {
                Ok(result) => TaskOutcome::from_result(result),
                Err(payload) => TaskOutcome::from_panic(payload),
            };
            outcome.log(id, &name);
            drop(in_flight);
        });

        id
    }

    /// Like [`TaskSupervisor::submit`] for synchronous work; runs on the
    /// blocking thread pool.
    ///
    /// # Panics
    /// If called outside a Tokio runtime.
    pub fn submit_blocking<F>(&self, name: impl Into<String>, task: F) -> TaskId
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        let id = TaskId::new();
        let name = name.into();
        let in_flight = self.register();
        debug!(task_id = %id, task = %name, "blocking background task submitted");

        tokio::task::spawn_blocking(move || {
            let outcome = match std::panic::catch_unwind(AssertUnwindSafe(task)) {
                Ok(result) => TaskOutcome::from_result(result),
                Err(payload) => TaskOutcome::from_panic(payload),
            };
            outcome.log(id, &name);
            drop(in_flight);
        });

        id
    }

    /// Wait until every task submitted so far has finished.
    ///
    /// Tasks submitted while waiting are waited for as well. Stopping new
    /// submissions first is the caller's job.
    pub async fn await_all(&self) {
        loop {
            let idle = self.tracker.idle.notified();
            tokio::pin!(idle);
            // Register interest before reading the counter so a concurrent
            // decrement to zero cannot be missed.
            idle.as_mut().enable();

            if self.outstanding() == 0 {
                return;
            }
            idle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    use tokio::sync::oneshot;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn submit_returns_before_task_finishes() {
        let supervisor = TaskSupervisor::new();
        let (release_tx, release_rx) = oneshot::channel::<()>();
        let done = Arc::new(AtomicBool::new(false));

        let flag = done.clone();
        supervisor.submit("gated", async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            release_rx.await?;
            flag.store(true, Ordering::SeqCst);
            anyhow::Ok(())
        });

        // The task cannot finish until released, so submit must have returned first.
        assert_eq!(supervisor.outstanding(), 1);
        assert!(!done.load(Ordering::SeqCst));

        release_tx.send(()).unwrap();
        supervisor.await_all().await;

        assert!(done.load(Ordering::SeqCst));
        assert_eq!(supervisor.outstanding(), 0);
    }

    async fn explode() -> anyhow::Result<()> {
        panic!("boom")
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn failing_and_panicking_tasks_do_not_affect_siblings() {
        let supervisor = TaskSupervisor::new();
        let completed = Arc::new(AtomicUsize::new(0));

        supervisor.submit("panics", explode());
        supervisor.submit("fails", async { Err::<(), _>(anyhow::anyhow!("downstream unavailable")) });
        supervisor.submit_blocking("panics on blocking pool", || panic!("blocking boom"));

        for _ in 0..5 {
            let completed = completed.clone();
            supervisor.submit("counts", async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                completed.fetch_add(1, Ordering::SeqCst);
                anyhow::Ok(())
            });
        }

        supervisor.await_all().await;

        assert_eq!(completed.load(Ordering::SeqCst), 5);
        assert_eq!(supervisor.outstanding(), 0);
    }

    #[tokio::test]
    async fn await_all_without_tasks_returns_immediately() {
        let supervisor = TaskSupervisor::new();
        supervisor.await_all().await;
        assert_eq!(supervisor.outstanding(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn blocking_tasks_are_tracked() {
        let supervisor = TaskSupervisor::new();
        let (started_tx, started_rx) = std::sync::mpsc::channel::<()>();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let done = Arc::new(AtomicBool::new(false));

        let flag = done.clone();
        supervisor.submit_blocking("blocking", move || {
            started_tx.send(())?;
            release_rx.recv()?;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });

        tokio::task::spawn_blocking(move || started_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(supervisor.outstanding(), 1);

        release_tx.send(()).unwrap();
        supervisor.await_all().await;
        assert!(done.load(Ordering::SeqCst));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn clones_share_the_outstanding_count() {
        let supervisor = TaskSupervisor::new();
        let handle = supervisor.clone();
        let (release_tx, release_rx) = oneshot::channel::<()>();

        handle.submit("held by clone", async move {
            release_rx.await?;
            anyhow::Ok(())
        });
        assert_eq!(supervisor.outstanding(), 1);

        let waiter = tokio::spawn({
            let supervisor = supervisor.clone();
            async move { supervisor.await_all().await }
        });
        assert!(!waiter.is_finished());

        release_tx.send(()).unwrap();
        waiter.await.unwrap();
        assert_eq!(handle.outstanding(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn many_concurrent_submissions_all_complete() {
        let supervisor = TaskSupervisor::new();
        let completed = Arc::new(AtomicUsize::new(0));

        for i in 0..200 {
            let completed = completed.clone();
            supervisor.submit(format!("task-{i}"), async move {
                tokio::task::yield_now().await;
                completed.fetch_add(1, Ordering::SeqCst);
                anyhow::Ok(())
            });
        }

        supervisor.await_all().await;
        assert_eq!(completed.load(Ordering::SeqCst), 200);
    }
}
