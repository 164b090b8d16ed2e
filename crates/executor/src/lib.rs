//! Pooled executor for vow
//!
//! This crate provides [`WorkerPool`], a fixed set of worker threads pulling
//! tasks from a shared crossbeam channel, and [`PoolOptions`] to configure it.
//! The pool implements [`vow_core::Executor`], so it can be handed to any
//! completion cell as the context its continuations run on.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod options;
pub mod pool;

pub use options::PoolOptions;
pub use pool::{PoolError, PoolMetrics, WorkerPool};
