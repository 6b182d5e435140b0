//! Bounded worker pool for offloading slow provider calls.
//!
//! Two semaphores carry the bounds: `workers` caps how many tasks run at
//! once, `slots` (workers + queue depth) caps how many are admitted at all.
//! A submission past the admission bound fails immediately with
//! [`PoolError::Overloaded`] instead of queuing without limit. Tasks run
//! independently; completion order is unrelated to submission order.

use std::{future::Future, sync::Arc, time::Duration};

use {
    tokio::{
        sync::Semaphore,
        task::JoinHandle,
    },
    tracing::warn,
};

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// Pool and queue are both full. Callers should shed load, not wait.
    #[error("worker pool overloaded ({capacity} slots in use)")]
    Overloaded { capacity: usize },

    /// The joined task ran past the caller's deadline and was aborted so
    /// its slot frees up.
    #[error("task exceeded its {deadline:?} deadline")]
    DeadlineExceeded { deadline: Duration },

    /// The task panicked or was aborted elsewhere.
    #[error("task failed to complete")]
    TaskFailed,
}

/// Handle to a submitted task. Dropping it cancels the work: a caller that
/// went away (client disconnect) releases its slot instead of holding it
/// until the task's own timeout.
pub struct TaskHandle<T> {
    handle: Option<JoinHandle<T>>,
}

// Manual impl: the handle is debuggable regardless of the task's output
// type.
impl<T> std::fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("finished", &self.handle.as_ref().is_none_or(|h| h.is_finished()))
            .finish()
    }
}

impl<T> TaskHandle<T> {
    /// Wait for the task without a deadline. Prefer [`join_within`] on any
    /// request-handling path.
    ///
    /// [`join_within`]: TaskHandle::join_within
    pub async fn join(mut self) -> Result<T, PoolError> {
        match self.handle.take() {
            Some(handle) => handle.await.map_err(|_| PoolError::TaskFailed),
            None => Err(PoolError::TaskFailed),
        }
    }

    /// Wait for the task, aborting it when the deadline passes so its
    /// worker slot is released promptly rather than at the task's own
    /// timeout.
    pub async fn join_within(mut self, deadline: Duration) -> Result<T, PoolError> {
        let Some(mut handle) = self.handle.take() else {
            return Err(PoolError::TaskFailed);
        };
        match tokio::time::timeout(deadline, &mut handle).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) => Err(PoolError::TaskFailed),
            Err(_) => {
                handle.abort();
                Err(PoolError::DeadlineExceeded { deadline })
            },
        }
    }
}

impl<T> Drop for TaskHandle<T> {
    fn drop(&mut self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}

/// Fixed-size execution pool with a bounded admission queue.
pub struct WorkerPool {
    workers: Arc<Semaphore>,
    slots: Arc<Semaphore>,
    capacity: usize,
}

impl WorkerPool {
    /// `workers` concurrent tasks, plus up to `queue_depth` waiting ones.
    pub fn new(workers: usize, queue_depth: usize) -> Self {
        let workers = workers.max(1);
        let capacity = workers + queue_depth;
        Self {
            workers: Arc::new(Semaphore::new(workers)),
            slots: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Admit a task, or fail fast when the pool is saturated.
    ///
    /// The returned handle owns the task; dropping it cancels the work.
    pub fn submit<F, T>(&self, task: F) -> Result<TaskHandle<T>, PoolError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let slot = match Arc::clone(&self.slots).try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!(capacity = self.capacity, "worker pool overloaded");
                return Err(PoolError::Overloaded {
                    capacity: self.capacity,
                });
            },
        };

        let workers = Arc::clone(&self.workers);
        let handle = tokio::spawn(async move {
            let _slot = slot;
            let _worker = match workers.acquire_owned().await {
                Ok(permit) => permit,
                // The pool owns the semaphore and never closes it.
                Err(_) => unreachable!("worker semaphore closed"),
            };
            task.await
        });

        Ok(TaskHandle {
            handle: Some(handle),
        })
    }

    /// Slots currently free for admission.
    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }

    /// Total admission slots (workers plus queue depth).
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use {super::*, tokio::sync::oneshot};

    #[tokio::test]
    async fn runs_a_task_to_completion() {
        let pool = WorkerPool::new(2, 2);
        let handle = pool.submit(async { 21 * 2 }).unwrap();
        assert_eq!(handle.join().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn saturation_yields_overloaded_for_the_excess_submission() {
        // One worker, zero queue: the second in-flight submission is the
        // excess one.
        let pool = WorkerPool::new(1, 0);
        let (release_tx, release_rx) = oneshot::channel::<()>();

        let blocked = pool
            .submit(async move {
                let _ = release_rx.await;
                "done"
            })
            .unwrap();

        // Give the spawned task a chance to occupy the worker.
        tokio::task::yield_now().await;

        let err = pool.submit(async { "excess" }).unwrap_err();
        assert!(matches!(err, PoolError::Overloaded { capacity: 1 }));

        release_tx.send(()).ok();
        assert_eq!(blocked.join().await.unwrap(), "done");

        // Slot freed: submissions are admitted again.
        let next = pool.submit(async { "next" }).unwrap();
        assert_eq!(next.join().await.unwrap(), "next");
    }

    #[tokio::test]
    async fn queue_depth_admits_waiting_tasks() {
        let pool = WorkerPool::new(1, 1);
        let (hold_tx, hold_rx) = oneshot::channel::<()>();

        let running = pool
            .submit(async move {
                let _ = hold_rx.await;
            })
            .unwrap();
        tokio::task::yield_now().await;

        // Fits in the queue.
        let queued = pool.submit(async { "queued" }).unwrap();
        // Past workers + queue: rejected.
        assert!(pool.submit(async { "excess" }).is_err());

        hold_tx.send(()).ok();
        running.join().await.unwrap();
        assert_eq!(queued.join().await.unwrap(), "queued");
    }

    #[tokio::test]
    async fn deadline_abort_frees_the_slot() {
        let pool = WorkerPool::new(1, 0);

        let stuck = pool
            .submit(async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            })
            .unwrap();

        let err = stuck.join_within(Duration::from_millis(50)).await.unwrap_err();
        assert!(matches!(err, PoolError::DeadlineExceeded { .. }));

        // The aborted task must release its worker promptly.
        for _ in 0..100 {
            if pool.available() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let follow_up = pool.submit(async { 7 }).unwrap();
        assert_eq!(
            follow_up.join_within(Duration::from_secs(1)).await.unwrap(),
            7
        );
    }

    #[tokio::test]
    async fn completion_order_is_independent_of_submission_order() {
        let pool = WorkerPool::new(4, 0);
        let slow = pool
            .submit(async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                "slow"
            })
            .unwrap();
        let fast = pool.submit(async { "fast" }).unwrap();

        // The later submission finishes first.
        assert_eq!(fast.join().await.unwrap(), "fast");
        assert_eq!(slow.join().await.unwrap(), "slow");
    }
}
