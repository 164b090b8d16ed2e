//! Executor seam
//!
//! Cells never own threads. Whenever a continuation or producer has to run,
//! it is handed to an [`Executor`] as a boxed [`Task`]. An executor must run
//! every task it accepts exactly once, eventually; it makes no promise about
//! which thread does so.
//!
//! Two executors live here:
//! - [`Inline`]: runs the task on the calling thread before returning
//! - [`SpawnThread`]: runs each task on a freshly spawned thread
//!
//! A pooled executor is provided by the `vow-executor` crate.

use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};
use std::thread;

/// Unit of work handed to an executor
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks, each exactly once, eventually
pub trait Executor: Send + Sync {
    /// Run `task`, now or later, on any thread
    fn execute(&self, task: Task);

    /// Short name used in log fields
    fn name(&self) -> &'static str {
        "custom"
    }
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    fn execute(&self, task: Task) {
        (**self).execute(task)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Runs every task synchronously on the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct Inline;

impl Executor for Inline {
    fn execute(&self, task: Task) {
        task()
    }

    fn name(&self) -> &'static str {
        "inline"
    }
}

/// Shared handle on the [`Inline`] executor
pub fn inline() -> Arc<dyn Executor> {
    static INLINE: OnceLock<Arc<dyn Executor>> = OnceLock::new();
    INLINE.get_or_init(|| Arc::new(Inline)).clone()
}

/// Spawns one thread per task
///
/// If the OS refuses to spawn a thread the task runs on the caller instead,
/// so an accepted task is never lost.
#[derive(Debug, Clone, Default)]
pub struct SpawnThread {
    thread_name: Option<String>,
}

impl SpawnThread {
    /// Spawn anonymous threads
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn threads carrying the given name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            thread_name: Some(name.into()),
        }
    }
}

impl Executor for SpawnThread {
    fn execute(&self, task: Task) {
        let slot = Arc::new(Mutex::new(Some(task)));
        let remote = Arc::clone(&slot);

        let mut builder = thread::Builder::new();
        if let Some(name) = &self.thread_name {
            builder = builder.name(name.clone());
        }

        let spawned = builder.spawn(move || {
            let task = remote.lock().take();
            if let Some(task) = task {
                task();
            }
        });

        if let Err(e) = spawned {
            tracing::warn!(error = %e, "thread spawn failed, running task inline");
            let task = slot.lock().take();
            if let Some(task) = task {
                task();
            }
        }
    }

    fn name(&self) -> &'static str {
        "spawn-thread"
    }
}
