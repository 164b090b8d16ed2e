//! Continuations registered on completion cells
//!
//! A continuation pairs a reaction with the executor it should run on. The
//! reaction declares which outcomes it handles:
//!
//! | Reaction | Runs on fulfilled | Runs on rejected |
//! |----------|-------------------|------------------|
//! | `on_success` | yes | skipped |
//! | `on_failure` | skipped | yes |
//! | `on_outcome` | yes | yes |
//! | `on_both` | success handler | failure handler |
//!
//! A skipped continuation is dropped without being called; it never sees a
//! placeholder value.

use std::convert::Infallible;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{trace, warn};
use vow_core::{BoxError, Executor, Failure, FailureKind, Outcome, PanicError};

use crate::cell::CellId;

type SuccessFn<T> = Box<dyn FnOnce(T) + Send + 'static>;
type FailureFn = Box<dyn FnOnce(Failure) + Send + 'static>;
type OutcomeFn<T> = Box<dyn FnOnce(Outcome<T>) + Send + 'static>;

enum Reaction<T> {
    Success(SuccessFn<T>),
    Failure(FailureFn),
    Outcome(OutcomeFn<T>),
    Both {
        on_success: SuccessFn<T>,
        on_failure: FailureFn,
    },
}

/// A callback waiting for a cell to settle
pub struct Continuation<T> {
    reaction: Reaction<T>,
    executor: Option<Arc<dyn Executor>>,
}

impl<T: Send + 'static> Continuation<T> {
    /// React to a value; skipped when the cell is rejected
    pub fn on_success<F>(f: F) -> Self
    where
        F: FnOnce(T) + Send + 'static,
    {
        Self::from_reaction(Reaction::Success(Box::new(f)))
    }

    /// React to a failure; skipped when the cell is fulfilled
    pub fn on_failure<F>(f: F) -> Self
    where
        F: FnOnce(Failure) + Send + 'static,
    {
        Self::from_reaction(Reaction::Failure(Box::new(f)))
    }

    /// React to whichever outcome the cell settles with
    pub fn on_outcome<F>(f: F) -> Self
    where
        F: FnOnce(Outcome<T>) + Send + 'static,
    {
        Self::from_reaction(Reaction::Outcome(Box::new(f)))
    }

    /// One registration carrying a handler for each polarity
    pub fn on_both<S, F>(on_success: S, on_failure: F) -> Self
    where
        S: FnOnce(T) + Send + 'static,
        F: FnOnce(Failure) + Send + 'static,
    {
        Self::from_reaction(Reaction::Both {
            on_success: Box::new(on_success),
            on_failure: Box::new(on_failure),
        })
    }

    /// Run on the given executor instead of the cell's default
    pub fn via(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Run on whichever thread settles the cell (or registers, if later)
    pub fn inline(self) -> Self {
        self.via(vow_core::inline())
    }

    fn from_reaction(reaction: Reaction<T>) -> Self {
        Continuation {
            reaction,
            executor: None,
        }
    }

    pub(crate) fn has_executor(&self) -> bool {
        self.executor.is_some()
    }

    /// Dispatch this continuation for `outcome` on its executor.
    ///
    /// A panic escaping the reaction is caught and logged; it never reaches
    /// the thread that settled the cell.
    pub(crate) fn fire(self, cell: CellId, outcome: Outcome<T>) {
        let Continuation { reaction, executor } = self;

        let call: Box<dyn FnOnce() + Send> = match (reaction, outcome) {
            (Reaction::Success(f), Outcome::Fulfilled(value)) => Box::new(move || f(value)),
            (Reaction::Failure(f), Outcome::Rejected(failure)) => Box::new(move || f(failure)),
            (Reaction::Outcome(f), outcome) => Box::new(move || f(outcome)),
            (Reaction::Both { on_success, .. }, Outcome::Fulfilled(value)) => {
                Box::new(move || on_success(value))
            }
            (Reaction::Both { on_failure, .. }, Outcome::Rejected(failure)) => {
                Box::new(move || on_failure(failure))
            }
            _ => {
                trace!(cell = %cell, "continuation skipped, outcome polarity not handled");
                return;
            }
        };

        let executor = executor.unwrap_or_else(vow_core::inline);
        trace!(cell = %cell, executor = executor.name(), "dispatching continuation");
        executor.execute(Box::new(move || {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(call)) {
                let panic = PanicError::from_payload(payload);
                warn!(cell = %cell, error = %panic, "continuation panicked");
            }
        }));
    }
}

impl<T> std::fmt::Debug for Continuation<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reaction = match self.reaction {
            Reaction::Success(_) => "success",
            Reaction::Failure(_) => "failure",
            Reaction::Outcome(_) => "outcome",
            Reaction::Both { .. } => "both",
        };
        f.debug_struct("Continuation")
            .field("reaction", &reaction)
            .field("executor", &self.executor.as_ref().map(|e| e.name()))
            .finish()
    }
}

/// Run a user callback, turning an `Err` or a panic into a callback failure
pub(crate) fn guarded<R, E, F>(f: F) -> Result<R, Failure>
where
    F: FnOnce() -> Result<R, E>,
    E: Into<BoxError>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(Failure::callback(e)),
        Err(payload) => Err(Failure::from_panic(payload, FailureKind::Callback)),
    }
}

/// [`guarded`] for callbacks that cannot return an error
pub(crate) fn guarded_infallible<R, F>(f: F) -> Result<R, Failure>
where
    F: FnOnce() -> R,
{
    guarded(move || Ok::<R, Infallible>(f()))
}
