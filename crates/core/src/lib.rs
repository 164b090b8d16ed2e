//! Core types for vow
//!
//! This crate holds the pieces every other vow crate builds on:
//! - Failure: the shared, clonable error value carried by rejected cells
//! - Outcome: the terminal result of a completion cell
//! - CellError: errors surfaced by blocking retrieval and terminal mutations
//! - Executor: the seam through which continuations and producers are run

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod executor;
pub mod outcome;

pub use error::{BoxError, CellError, Failure, FailureKind, PanicError};
pub use executor::{inline, Executor, Inline, SpawnThread, Task};
pub use outcome::Outcome;
