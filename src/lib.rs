//! # Vow
//!
//! Completion cells and a combinator algebra over them.
//!
//! A completion cell is a write-once result slot shared between threads. A
//! producer settles it with a value or a failure; consumers register
//! continuations, block on it, or derive new cells from it with combinators.
//!
//! ## Quick Start
//!
//! ```
//! use vow::prelude::*;
//!
//! let vow = Vow::inline();
//!
//! let price = vow.pending::<u32>();
//! let quantity = vow.pending::<u32>();
//! let total = price.combine(&quantity, |p, q| p * q);
//!
//! price.resolve(12);
//! quantity.resolve(3);
//! assert_eq!(total.join()?, 36);
//! # Ok::<(), vow::Error>(())
//! ```
//!
//! ## Combinators
//!
//! - Sequential: `then_transform`, `then_consume`, `then_run`, `on_failure`,
//!   `then_compose`, `handle_both`, `when_complete`
//! - Binary: `combine`, `combine_void`, `run_after_both`, `race_transform`,
//!   `race_consume`, `run_after_either`
//! - Aggregate: [`all`], [`any`]
//!
//! ## Executors
//!
//! Continuations run on the executor of the cell they were registered on.
//! [`Vow`] picks that executor: inline, a thread per task, a [`WorkerPool`]
//! or anything implementing [`Executor`].

#![warn(missing_docs)]

mod error;
mod runtime;
mod types;

pub mod prelude;

// Re-export main entry points
pub use error::{Error, Result};
pub use runtime::{Vow, VowBuilder};

// Re-export types
pub use types::*;
