//! Main entry point for vow.
//!
//! This module provides the `Vow` struct, which bundles the executor that
//! cells created through it run their continuations on.

use crate::error::Result;
use std::sync::Arc;
use tracing::debug;
use vow_cell::{BoxError, CompletionCell, Executor, Failure, SpawnThread};
use vow_executor::{PoolMetrics, PoolOptions, WorkerPool};

/// The vow runtime.
///
/// Create one with [`Vow::open`], [`Vow::inline`] or [`Vow::builder`], then
/// use it to create cells and submit producers. Cloning is cheap; clones
/// share the executor.
///
/// # Example
///
/// ```
/// use vow::prelude::*;
///
/// let vow = Vow::builder().workers(2).open()?;
///
/// let greeting = vow
///     .supply(|| Ok::<_, std::io::Error>("hello".to_string()))
///     .then_transform(|s| s + ", world");
///
/// assert_eq!(greeting.join()?, "hello, world");
/// vow.shutdown();
/// # Ok::<(), vow::Error>(())
/// ```
#[derive(Clone)]
pub struct Vow {
    executor: Arc<dyn Executor>,
    pool: Option<Arc<WorkerPool>>,
}

impl Vow {
    /// Start a runtime backed by a worker pool with default options.
    ///
    /// One worker per available CPU, unbounded queue.
    pub fn open() -> Result<Self> {
        Self::builder().open()
    }

    /// Create a runtime that runs everything on the calling thread.
    ///
    /// No threads are started. Continuations run on whichever thread settles
    /// the cell; producers run before [`Vow::supply`] returns. Use this for
    /// unit tests that need deterministic ordering.
    pub fn inline() -> Self {
        Self {
            executor: vow_cell::inline(),
            pool: None,
        }
    }

    /// Create a builder for runtime configuration.
    ///
    /// # Example
    ///
    /// ```
    /// let vow = vow::Vow::builder()
    ///     .workers(4)
    ///     .thread_name("ingest")
    ///     .queue_capacity(1024)
    ///     .open()?;
    /// # Ok::<(), vow::Error>(())
    /// ```
    pub fn builder() -> VowBuilder {
        VowBuilder::new()
    }

    /// The executor cells created here run their continuations on.
    pub fn executor(&self) -> &Arc<dyn Executor> {
        &self.executor
    }

    /// A new pending cell on this runtime's executor.
    pub fn pending<T: Clone + Send + 'static>(&self) -> CompletionCell<T> {
        CompletionCell::with_executor(Arc::clone(&self.executor))
    }

    /// A cell already fulfilled with `value`.
    pub fn resolved<T: Clone + Send + 'static>(&self, value: T) -> CompletionCell<T> {
        let cell = self.pending();
        cell.resolve(value);
        cell
    }

    /// A cell already rejected with `failure`.
    pub fn failed<T: Clone + Send + 'static>(&self, failure: Failure) -> CompletionCell<T> {
        let cell = self.pending();
        cell.fail(failure);
        cell
    }

    /// Run a fallible producer on the executor.
    ///
    /// An `Err` or a panic rejects the returned cell with a producer failure.
    pub fn supply<T, E, F>(&self, f: F) -> CompletionCell<T>
    where
        T: Clone + Send + 'static,
        E: Into<BoxError>,
        F: FnOnce() -> std::result::Result<T, E> + Send + 'static,
    {
        vow_cell::supply_async(Arc::clone(&self.executor), f)
    }

    /// Run `f` on the executor for its side effect.
    pub fn run<F>(&self, f: F) -> CompletionCell<()>
    where
        F: FnOnce() + Send + 'static,
    {
        vow_cell::run_async(Arc::clone(&self.executor), f)
    }

    /// Pool counters, when this runtime is backed by a worker pool.
    pub fn metrics(&self) -> Option<PoolMetrics> {
        self.pool.as_ref().map(|pool| pool.metrics())
    }

    /// Gracefully stop the worker pool, if any.
    ///
    /// Queued tasks still run. Work submitted afterwards runs inline on the
    /// submitting thread.
    pub fn shutdown(&self) {
        if let Some(pool) = &self.pool {
            pool.shutdown();
        }
    }
}

impl std::fmt::Debug for Vow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vow")
            .field("executor", &self.executor.name())
            .field("pool", &self.pool)
            .finish()
    }
}

enum ExecutorChoice {
    Inline,
    SpawnPerTask,
    Pool,
    Custom(Arc<dyn Executor>),
}

/// Builder for runtime configuration.
///
/// Defaults to a worker pool. Pool settings are ignored when another
/// executor is chosen, except `thread_name`, which also names the threads
/// of [`spawn_per_task`](Self::spawn_per_task).
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use vow::{SpawnThread, Vow};
///
/// // Production: pooled workers
/// let pooled = Vow::builder().workers(8).open()?;
///
/// // Short-lived tools: a thread per task
/// let spawning = Vow::builder().spawn_per_task().thread_name("job").open()?;
///
/// // Bring your own executor
/// let custom = Vow::builder().executor(Arc::new(SpawnThread::new())).open()?;
///
/// // Unit testing: nothing leaves the calling thread
/// let inline = Vow::inline();
/// # Ok::<(), vow::Error>(())
/// ```
pub struct VowBuilder {
    choice: ExecutorChoice,
    options: PoolOptions,
}

impl VowBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            choice: ExecutorChoice::Pool,
            options: PoolOptions::default(),
        }
    }

    /// Run everything on the calling thread.
    pub fn inline(mut self) -> Self {
        self.choice = ExecutorChoice::Inline;
        self
    }

    /// Spawn a fresh thread for every task.
    pub fn spawn_per_task(mut self) -> Self {
        self.choice = ExecutorChoice::SpawnPerTask;
        self
    }

    /// Use a worker pool with `workers` threads.
    pub fn workers(mut self, workers: usize) -> Self {
        self.choice = ExecutorChoice::Pool;
        self.options.workers = workers;
        self
    }

    /// Set the name given to spawned threads.
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.options.thread_name = name.into();
        self
    }

    /// Bound the worker pool's queue.
    ///
    /// A task submitted to a full queue runs on the submitting thread.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.options.queue_capacity = Some(capacity);
        self
    }

    /// Use a caller-supplied executor.
    pub fn executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.choice = ExecutorChoice::Custom(executor);
        self
    }

    /// Start the runtime.
    ///
    /// Fails if the pool options are invalid or a worker thread cannot be
    /// spawned.
    pub fn open(self) -> Result<Vow> {
        let vow = match self.choice {
            ExecutorChoice::Inline => Vow::inline(),
            ExecutorChoice::SpawnPerTask => Vow {
                executor: Arc::new(SpawnThread::named(self.options.thread_name)),
                pool: None,
            },
            ExecutorChoice::Pool => {
                let pool = Arc::new(WorkerPool::new(self.options)?);
                Vow {
                    executor: pool.clone(),
                    pool: Some(pool),
                }
            }
            ExecutorChoice::Custom(executor) => Vow {
                executor,
                pool: None,
            },
        };
        debug!(executor = vow.executor.name(), "vow runtime opened");
        Ok(vow)
    }
}

impl Default for VowBuilder {
    fn default() -> Self {
        Self::new()
    }
}
