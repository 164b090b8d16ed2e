//! Binary combinators: combine and race
//!
//! ## Combine
//!
//! `a.combine(&b, f)` fulfils once both inputs are fulfilled, applying `f` to
//! the pair. The first failure observed on either side rejects the derived
//! cell straight away; there is no waiting for the other input.
//!
//! ## Race
//!
//! `a.race_transform(&b, f)` settles from whichever input settles first,
//! value or failure. The later input is observed and ignored.
//!
//! The winner is claimed on the settling thread, before any executor hop, and
//! the combinator registers on `a` before `b`. When both inputs have already
//! settled at the time of the call, `a` therefore wins.
//!
//! Only a fulfilled winner hops: `f` runs on the derived cell's executor. A
//! rejected winner has no callback to run, so it rejects the derived cell
//! directly on the settling thread.

use parking_lot::Mutex;
use std::sync::Arc;
use vow_core::Outcome;

use crate::cell::CompletionCell;
use crate::continuation::{guarded_infallible, Continuation};

/// Values gathered by `combine`, plus the callback waiting for them
struct Pair<A, B, F> {
    left: Option<A>,
    right: Option<B>,
    f: Option<F>,
}

impl<A, B, F> Pair<A, B, F> {
    /// Take both values and the callback once everything has arrived
    fn take_ready(&mut self) -> Option<(A, B, F)> {
        if self.left.is_none() || self.right.is_none() || self.f.is_none() {
            return None;
        }
        Some((self.left.take()?, self.right.take()?, self.f.take()?))
    }
}

impl<T: Clone + Send + 'static> CompletionCell<T> {
    /// Apply `f` to both values once both cells are fulfilled
    pub fn combine<U, R, F>(&self, other: &CompletionCell<U>, f: F) -> CompletionCell<R>
    where
        U: Clone + Send + 'static,
        R: Clone + Send + 'static,
        F: FnOnce(T, U) -> R + Send + 'static,
    {
        let derived = self.derive::<R>();
        let pair = Arc::new(Mutex::new(Pair {
            left: None,
            right: None,
            f: Some(f),
        }));

        {
            let pair = Arc::clone(&pair);
            let on_value = derived.clone();
            let on_failure = derived.clone();
            self.register(Continuation::on_both(
                move |value| {
                    let ready = {
                        let mut pair = pair.lock();
                        pair.left = Some(value);
                        pair.take_ready()
                    };
                    if let Some((a, b, f)) = ready {
                        on_value.complete(guarded_infallible(move || f(a, b)).into());
                    }
                },
                move |failure| {
                    on_failure.fail(failure);
                },
            ));
        }

        {
            let on_value = derived.clone();
            let on_failure = derived.clone();
            other.register(Continuation::on_both(
                move |value| {
                    let ready = {
                        let mut pair = pair.lock();
                        pair.right = Some(value);
                        pair.take_ready()
                    };
                    if let Some((a, b, f)) = ready {
                        on_value.complete(guarded_infallible(move || f(a, b)).into());
                    }
                },
                move |failure| {
                    on_failure.fail(failure);
                },
            ));
        }

        derived
    }

    /// Consume both values once both cells are fulfilled
    pub fn combine_void<U, F>(&self, other: &CompletionCell<U>, f: F) -> CompletionCell<()>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T, U) + Send + 'static,
    {
        self.combine(other, f)
    }

    /// Run `f` once both cells are fulfilled
    pub fn run_after_both<U, F>(&self, other: &CompletionCell<U>, f: F) -> CompletionCell<()>
    where
        U: Clone + Send + 'static,
        F: FnOnce() + Send + 'static,
    {
        self.combine(other, move |_, _| f())
    }

    /// Apply `f` to the value of whichever cell settles first.
    ///
    /// If the first cell to settle was rejected, so is the derived cell.
    pub fn race_transform<R, F>(&self, other: &CompletionCell<T>, f: F) -> CompletionCell<R>
    where
        R: Clone + Send + 'static,
        F: FnOnce(T) -> R + Send + 'static,
    {
        let derived = self.derive::<R>();
        let claim = Arc::new(Mutex::new(Some(f)));

        for input in [self, other] {
            let claim = Arc::clone(&claim);
            let target = derived.clone();
            input.register(
                Continuation::on_outcome(move |outcome: Outcome<T>| {
                    let Some(f) = claim.lock().take() else {
                        return;
                    };
                    match outcome {
                        Outcome::Fulfilled(value) => {
                            let executor = Arc::clone(target.executor());
                            executor.execute(Box::new(move || {
                                target.complete(guarded_infallible(move || f(value)).into());
                            }));
                        }
                        Outcome::Rejected(failure) => {
                            target.fail(failure);
                        }
                    }
                })
                .inline(),
            );
        }

        derived
    }

    /// Consume the value of whichever cell settles first
    pub fn race_consume<F>(&self, other: &CompletionCell<T>, f: F) -> CompletionCell<()>
    where
        F: FnOnce(T) + Send + 'static,
    {
        self.race_transform(other, f)
    }

    /// Run `f` once either cell is fulfilled first
    pub fn run_after_either<F>(&self, other: &CompletionCell<T>, f: F) -> CompletionCell<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.race_transform(other, move |_| f())
    }
}
