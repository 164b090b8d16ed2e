//! Producers: settle a new cell from work submitted to an executor

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use vow_core::{BoxError, Executor, Failure, FailureKind, Outcome};

use crate::cell::CompletionCell;

/// Run `f` on `executor` and settle the returned cell with its result.
///
/// An `Err` or a panic rejects the cell with a producer failure. The cell
/// uses `executor` as its default for downstream stages.
pub fn supply_async<T, E, F>(executor: Arc<dyn Executor>, f: F) -> CompletionCell<T>
where
    T: Clone + Send + 'static,
    E: Into<BoxError>,
    F: FnOnce() -> Result<T, E> + Send + 'static,
{
    let cell = CompletionCell::with_executor(Arc::clone(&executor));
    let target = cell.clone();
    executor.execute(Box::new(move || {
        let outcome = match catch_unwind(AssertUnwindSafe(f)) {
            Ok(Ok(value)) => Outcome::Fulfilled(value),
            Ok(Err(e)) => Outcome::Rejected(Failure::producer(e)),
            Err(payload) => Outcome::Rejected(Failure::from_panic(payload, FailureKind::Producer)),
        };
        target.complete(outcome);
    }));
    cell
}

/// Run `f` on `executor` for its side effect
pub fn run_async<F>(executor: Arc<dyn Executor>, f: F) -> CompletionCell<()>
where
    F: FnOnce() + Send + 'static,
{
    supply_async(executor, move || Ok::<(), std::convert::Infallible>(f()))
}
