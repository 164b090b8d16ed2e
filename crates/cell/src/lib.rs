//! Completion cells for vow
//!
//! A [`CompletionCell`] is a write-once result slot that many threads can
//! observe. Producers settle it, consumers register continuations or block on
//! it, and combinators derive new cells from existing ones:
//!
//! - sequential: `then_transform`, `then_consume`, `then_run`, `on_failure`,
//!   `then_compose`, `handle_both`, `when_complete`
//! - binary: `combine`, `combine_void`, `run_after_both`, `race_transform`,
//!   `race_consume`, `run_after_either`
//! - aggregate: [`all`], [`any`]
//! - producers: [`supply_async`], [`run_async`]
//!
//! Continuations run on the cell's executor unless they name another one.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod aggregate;
mod binary;
mod cell;
mod continuation;
mod obtrude;
mod producer;
mod sequential;

pub use aggregate::{all, any};
pub use cell::{CellId, CellState, CompletionCell};
pub use continuation::Continuation;
pub use producer::{run_async, supply_async};

pub use vow_core::{
    inline, BoxError, CellError, Executor, Failure, FailureKind, Inline, Outcome, PanicError,
    SpawnThread, Task,
};
