//! Single-worker background task pool.
//!
//! A [`TaskPool`] runs submitted closures one at a time on a dedicated rayon
//! worker thread. Each submission returns a [`Task`] handle that can be
//! polled for readiness, waited on, and drained exactly once.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// A submitted closure panicked instead of returning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("task panicked: {0}")]
pub struct TaskPanic(pub String);

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

struct Slot<T> {
    result: Mutex<Option<Result<T, TaskPanic>>>,
    ready: Condvar,
}

impl<T> Slot<T> {
    fn lock(&self) -> MutexGuard<'_, Option<Result<T, TaskPanic>>> {
        self.result.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn complete(&self, result: Result<T, TaskPanic>) {
        *self.lock() = Some(result);
        self.ready.notify_all();
    }
}

/// Handle to the result of a submitted closure.
///
/// A default handle is invalid: it refers to no work.
pub struct Task<T> {
    slot: Option<Arc<Slot<T>>>,
}

impl<T> Default for Task<T> {
    fn default() -> Self {
        Self { slot: None }
    }
}

impl<T> std::fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task").field("valid", &self.valid()).field("ready", &self.ready()).finish()
    }
}

impl<T> Task<T> {
    /// Check if the handle refers to submitted work that has not been taken.
    pub fn valid(&self) -> bool {
        self.slot.is_some()
    }

    /// Check if the work has finished. False for an invalid handle.
    pub fn ready(&self) -> bool {
        self.slot.as_ref().is_some_and(|slot| slot.lock().is_some())
    }

    /// Block until the work has finished. Returns at once for an invalid
    /// handle.
    pub fn wait(&self) {
        let Some(slot) = &self.slot else { return };

        let mut result = slot.lock();
        while result.is_none() {
            result = slot.ready.wait(result).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Wait for the work and take its result, invalidating the handle.
    ///
    /// Returns `None` for an invalid handle.
    pub fn take(&mut self) -> Option<Result<T, TaskPanic>> {
        self.wait();
        let slot = self.slot.take()?;
        let result = slot.lock().take();
        result
    }
}

/// Runs closures on one background thread, in submission order.
pub struct TaskPool {
    pool: rayon::ThreadPool,
}

impl std::fmt::Debug for TaskPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskPool").field("threads", &self.pool.current_num_threads()).finish()
    }
}

impl TaskPool {
    /// Create a pool with a single worker thread.
    pub fn new() -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .thread_name(|index| format!("lvlmunge-task-{}", index))
            .build()?;

        Ok(Self { pool })
    }

    /// Submit a closure. A panic inside it is captured as [`TaskPanic`].
    pub fn submit<T, F>(&self, job: F) -> Task<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let slot = Arc::new(Slot { result: Mutex::new(None), ready: Condvar::new() });
        let worker_slot = Arc::clone(&slot);

        self.pool.spawn_fifo(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(job)).map_err(|payload| {
                let message = panic_message(payload.as_ref());
                tracing::error!(%message, "background task panicked");
                TaskPanic(message)
            });
            worker_slot.complete(result);
        });

        Task { slot: Some(slot) }
    }
}
