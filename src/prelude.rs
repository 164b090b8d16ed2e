//! Convenient imports for vow.
//!
//! This module re-exports the most commonly used types so you can get started
//! with a single import:
//!
//! ```
//! use vow::prelude::*;
//!
//! let vow = Vow::inline();
//! let cell: CompletionCell<i32> = vow.pending();
//! cell.resolve(1);
//! ```

// Main entry point
pub use crate::runtime::{Vow, VowBuilder};

// Error handling
pub use crate::error::{Error, Result};

// Cells
pub use crate::types::{CompletionCell, Continuation, Outcome};

// Failures
pub use crate::types::{Failure, FailureKind};

// Aggregates
pub use crate::types::{all, any};

// Executors
pub use crate::types::{Executor, PoolOptions, WorkerPool};
