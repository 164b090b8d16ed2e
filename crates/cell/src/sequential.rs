//! Sequential combinators
//!
//! Each combinator registers one continuation on the source cell and returns
//! a new derived cell driven by it. The source is never modified.
//!
//! ## Short-circuiting
//!
//! Value stages (`then_transform`, `then_consume`, `then_run`, `then_compose`)
//! are skipped when the source is rejected; the failure is relayed to the
//! derived cell unchanged. A recovery stage (`on_failure`) is the only way
//! back from failure to success.
//!
//! ## Callback failures
//!
//! A callback that panics, or a fallible callback that returns `Err`, rejects
//! the derived cell with a [`FailureKind::Callback`](vow_core::FailureKind)
//! failure. Returning the failure it was handed relays it as is.

use vow_core::{BoxError, Failure, Outcome};

use crate::cell::CompletionCell;
use crate::continuation::{guarded, guarded_infallible, Continuation};

impl<T: Clone + Send + 'static> CompletionCell<T> {
    /// Map the value with `f`.
    ///
    /// A panic in `f` rejects the derived cell.
    pub fn then_transform<U, F>(&self, f: F) -> CompletionCell<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let derived = self.derive::<U>();
        let on_value = derived.clone();
        let on_failure = derived.clone();
        self.register(Continuation::on_both(
            move |value| {
                on_value.complete(guarded_infallible(move || f(value)).into());
            },
            move |failure| {
                on_failure.fail(failure);
            },
        ));
        derived
    }

    /// Map the value with a fallible `f`; an `Err` rejects the derived cell
    pub fn then_try_transform<U, E, F>(&self, f: F) -> CompletionCell<U>
    where
        U: Clone + Send + 'static,
        E: Into<BoxError>,
        F: FnOnce(T) -> Result<U, E> + Send + 'static,
    {
        let derived = self.derive::<U>();
        let on_value = derived.clone();
        let on_failure = derived.clone();
        self.register(Continuation::on_both(
            move |value| {
                on_value.complete(guarded(move || f(value)).into());
            },
            move |failure| {
                on_failure.fail(failure);
            },
        ));
        derived
    }

    /// Consume the value; the derived cell carries `()`
    pub fn then_consume<F>(&self, f: F) -> CompletionCell<()>
    where
        F: FnOnce(T) + Send + 'static,
    {
        self.then_transform(f)
    }

    /// Run `f` once the cell is fulfilled, ignoring the value
    pub fn then_run<F>(&self, f: F) -> CompletionCell<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.then_transform(move |_| f())
    }

    /// Recover from a failure.
    ///
    /// A fulfilled source passes straight through. On rejection `handler`
    /// receives the failure: `Ok` turns the derived cell fulfilled, `Err`
    /// rejects it with a callback failure (or relays the original if that is
    /// what the handler returned).
    pub fn on_failure<E, F>(&self, handler: F) -> CompletionCell<T>
    where
        E: Into<BoxError>,
        F: FnOnce(Failure) -> Result<T, E> + Send + 'static,
    {
        let derived = self.derive::<T>();
        let on_value = derived.clone();
        let on_failure = derived.clone();
        self.register(Continuation::on_both(
            move |value| {
                on_value.resolve(value);
            },
            move |failure| {
                on_failure.complete(guarded(move || handler(failure)).into());
            },
        ));
        derived
    }

    /// Chain a stage that itself produces a cell, flattening the nesting.
    ///
    /// The derived cell settles with whatever the inner cell settles with.
    pub fn then_compose<U, F>(&self, f: F) -> CompletionCell<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> CompletionCell<U> + Send + 'static,
    {
        let derived = self.derive::<U>();
        let on_value = derived.clone();
        let on_failure = derived.clone();
        self.register(Continuation::on_both(
            move |value| match guarded_infallible(move || f(value)) {
                Ok(inner) => {
                    inner.register(
                        Continuation::on_outcome(move |outcome| {
                            on_value.complete(outcome);
                        })
                        .inline(),
                    );
                }
                Err(failure) => {
                    on_value.fail(failure);
                }
            },
            move |failure| {
                on_failure.fail(failure);
            },
        ));
        derived
    }

    /// Handle either outcome with one callback.
    ///
    /// `f` receives `Ok(value)` or `Err(failure)` and its return value
    /// fulfils the derived cell, so a failure can be mapped into a value here.
    pub fn handle_both<U, F>(&self, f: F) -> CompletionCell<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(Result<T, Failure>) -> U + Send + 'static,
    {
        let derived = self.derive::<U>();
        let target = derived.clone();
        self.register(Continuation::on_outcome(move |outcome: Outcome<T>| {
            target.complete(guarded_infallible(move || f(outcome.into_result())).into());
        }));
        derived
    }

    /// Observe the outcome and pass it through unchanged.
    ///
    /// If `f` panics on a fulfilled source the derived cell is rejected with
    /// the panic; on a rejected source the original failure is kept.
    pub fn when_complete<F>(&self, f: F) -> CompletionCell<T>
    where
        F: FnOnce(Result<&T, &Failure>) + Send + 'static,
    {
        let derived = self.derive::<T>();
        let target = derived.clone();
        self.register(Continuation::on_outcome(move |outcome: Outcome<T>| {
            let observed = guarded_infallible(|| f(outcome.as_result()));
            match (outcome, observed) {
                (Outcome::Rejected(failure), _) | (Outcome::Fulfilled(_), Err(failure)) => {
                    target.fail(failure);
                }
                (fulfilled, Ok(())) => {
                    target.complete(fulfilled);
                }
            }
        }));
        derived
    }
}
