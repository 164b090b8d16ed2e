//! Public types for the vow facade.
//!
//! This module re-exports types from the member crates with one flat path.

// Cells and continuations
pub use vow_cell::{CellId, CellState, CompletionCell, Continuation};

// Aggregates and producers
pub use vow_cell::{all, any, run_async, supply_async};

// Outcomes and failures
pub use vow_core::{BoxError, CellError, Failure, FailureKind, Outcome, PanicError};

// Executors
pub use vow_core::{inline, Executor, Inline, SpawnThread, Task};
pub use vow_executor::{PoolError, PoolMetrics, PoolOptions, WorkerPool};
