//! Fixed-size worker pool
//!
//! Workers share one crossbeam channel. Each task runs under `catch_unwind`,
//! so a panicking task is counted and the worker keeps serving the queue.
//!
//! ## Shutdown
//!
//! `shutdown()` drops the pool's sender. Workers finish whatever is already
//! queued, then exit and are joined. A task submitted after shutdown runs
//! inline on the submitting thread: an executor must not drop work it has
//! accepted.
//!
//! ## Bounded queues
//!
//! `execute` never blocks. When a bounded queue is full the task runs on the
//! submitting thread instead. Settling a cell on a worker dispatches its
//! continuations back to the same pool, so a blocking send would let every
//! worker wait on a queue that only workers drain.

use crate::options::PoolOptions;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::{debug, info, warn};
use vow_core::{Executor, Task};

/// Worker pool errors
#[derive(Debug, Error)]
pub enum PoolError {
    /// The options cannot describe a working pool
    #[error("invalid pool configuration: {0}")]
    InvalidConfig(String),

    /// A worker thread could not be started
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Snapshot of pool counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolMetrics {
    /// Tasks accepted onto the queue
    pub submitted: u64,
    /// Tasks that ran to completion (including panicked ones)
    pub completed: u64,
    /// Tasks that panicked
    pub panicked: u64,
    /// Tasks run on the submitting thread because the queue was full or gone
    pub ran_inline: u64,
    /// Tasks waiting in the queue
    pub queued: usize,
    /// Live worker threads
    pub workers: usize,
}

#[derive(Debug, Default)]
struct Counters {
    submitted: AtomicU64,
    completed: AtomicU64,
    panicked: AtomicU64,
    ran_inline: AtomicU64,
}

/// A fixed set of worker threads draining a shared task queue
pub struct WorkerPool {
    sender: Mutex<Option<Sender<Task>>>,
    receiver: Receiver<Task>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    counters: Arc<Counters>,
    options: PoolOptions,
}

impl WorkerPool {
    /// Start a pool with the given options
    pub fn new(options: PoolOptions) -> Result<Self, PoolError> {
        options.validate()?;

        let (sender, receiver) = match options.queue_capacity {
            Some(capacity) => bounded(capacity),
            None => unbounded(),
        };
        let counters = Arc::new(Counters::default());

        let mut workers = Vec::with_capacity(options.workers);
        for index in 0..options.workers {
            let rx = receiver.clone();
            let counters = Arc::clone(&counters);
            let spawned = thread::Builder::new()
                .name(format!("{}-{}", options.thread_name, index))
                .spawn(move || worker_loop(rx, counters));

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    // Disconnect the queue so the workers already started exit.
                    drop(sender);
                    for handle in workers {
                        let _ = handle.join();
                    }
                    return Err(PoolError::Spawn(e));
                }
            }
        }

        info!(
            workers = options.workers,
            thread_name = %options.thread_name,
            queue_capacity = ?options.queue_capacity,
            "worker pool started"
        );

        Ok(WorkerPool {
            sender: Mutex::new(Some(sender)),
            receiver,
            workers: Mutex::new(workers),
            counters,
            options,
        })
    }

    /// Start a pool with default options
    pub fn with_defaults() -> Result<Self, PoolError> {
        Self::new(PoolOptions::default())
    }

    /// The options this pool was started with
    pub fn options(&self) -> &PoolOptions {
        &self.options
    }

    /// Check if the pool has been shut down
    pub fn is_shutdown(&self) -> bool {
        self.sender.lock().is_none()
    }

    /// Current counters
    pub fn metrics(&self) -> PoolMetrics {
        PoolMetrics {
            submitted: self.counters.submitted.load(Ordering::Relaxed),
            completed: self.counters.completed.load(Ordering::Relaxed),
            panicked: self.counters.panicked.load(Ordering::Relaxed),
            ran_inline: self.counters.ran_inline.load(Ordering::Relaxed),
            queued: self.receiver.len(),
            workers: self.workers.lock().len(),
        }
    }

    /// Stop accepting queued work, drain the queue and join the workers.
    ///
    /// Calling this from one of the pool's own workers skips joining that
    /// worker. Repeated calls are no-ops.
    pub fn shutdown(&self) {
        let sender = self.sender.lock().take();
        if sender.is_none() {
            return;
        }
        drop(sender);

        let handles: Vec<_> = self.workers.lock().drain(..).collect();
        let current = thread::current().id();
        for handle in handles {
            if handle.thread().id() == current {
                continue;
            }
            if handle.join().is_err() {
                warn!("worker thread exited abnormally");
            }
        }

        info!(
            completed = self.counters.completed.load(Ordering::Relaxed),
            "worker pool shut down"
        );
    }
}

impl Executor for WorkerPool {
    fn execute(&self, task: Task) {
        let sender = self.sender.lock().clone();
        let Some(sender) = sender else {
            warn!("worker pool is shut down, running task inline");
            self.run_inline(task);
            return;
        };

        match sender.try_send(task) {
            Ok(()) => {
                self.counters.submitted.fetch_add(1, Ordering::Relaxed);
            }
            Err(TrySendError::Full(task)) => {
                debug!(
                    capacity = ?self.options.queue_capacity,
                    "worker pool queue full, running task inline"
                );
                self.run_inline(task);
            }
            Err(TrySendError::Disconnected(task)) => {
                // Every worker is gone; keep the task alive by running it here.
                warn!("worker pool queue disconnected, running task inline");
                self.run_inline(task);
            }
        }
    }

    fn name(&self) -> &'static str {
        "worker-pool"
    }
}

impl WorkerPool {
    fn run_inline(&self, task: Task) {
        self.counters.ran_inline.fetch_add(1, Ordering::Relaxed);
        task();
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("options", &self.options)
            .field("metrics", &self.metrics())
            .finish()
    }
}

fn worker_loop(rx: Receiver<Task>, counters: Arc<Counters>) {
    while let Ok(task) = rx.recv() {
        if let Err(payload) = catch_unwind(AssertUnwindSafe(task)) {
            counters.panicked.fetch_add(1, Ordering::Relaxed);
            let panic = vow_core::PanicError::from_payload(payload);
            warn!(error = %panic, "task panicked on worker");
        }
        counters.completed.fetch_add(1, Ordering::Relaxed);
    }
    debug!("worker exiting, queue disconnected");
}
