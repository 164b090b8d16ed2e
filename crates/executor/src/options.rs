//! Worker pool configuration

use crate::pool::PoolError;
use std::thread;

/// Worker pool options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolOptions {
    /// Number of worker threads
    pub workers: usize,
    /// Prefix for worker thread names (`{thread_name}-{index}`)
    pub thread_name: String,
    /// Maximum queued tasks; `None` means unbounded.
    ///
    /// With a bound, a task that finds the queue full runs on the caller.
    pub queue_capacity: Option<usize>,
}

impl Default for PoolOptions {
    fn default() -> Self {
        PoolOptions {
            workers: thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            thread_name: "vow-worker".to_string(),
            queue_capacity: None,
        }
    }
}

impl PoolOptions {
    /// One worker: tasks run one at a time in submission order
    pub fn single_threaded() -> Self {
        PoolOptions {
            workers: 1,
            ..Default::default()
        }
    }

    /// Fixed number of workers, unbounded queue
    pub fn sized(workers: usize) -> Self {
        PoolOptions {
            workers,
            ..Default::default()
        }
    }

    /// Fixed number of workers with a bounded queue
    pub fn bounded(workers: usize, queue_capacity: usize) -> Self {
        PoolOptions {
            workers,
            queue_capacity: Some(queue_capacity),
            ..Default::default()
        }
    }

    /// Set the thread name prefix
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Check the options describe a usable pool
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.workers == 0 {
            return Err(PoolError::InvalidConfig(
                "worker count must be at least 1".to_string(),
            ));
        }
        if self.queue_capacity == Some(0) {
            return Err(PoolError::InvalidConfig(
                "queue capacity must be at least 1".to_string(),
            ));
        }
        if self.thread_name.is_empty() {
            return Err(PoolError::InvalidConfig(
                "thread name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
