//! Aggregate combinators over any number of cells
//!
//! - [`all`] fulfils with every value, in input order, once all inputs are
//!   fulfilled. The first failure rejects it without waiting for the rest.
//! - [`any`] settles with the first outcome observed among the inputs.
//!
//! Both register an inline continuation on each input in input order, so
//! when several inputs are already settled the lowest index wins `any`.
//! The derived cell runs its own continuations on the first input's
//! executor.

use parking_lot::Mutex;
use std::borrow::Borrow;
use std::sync::Arc;
use tracing::debug;
use vow_core::Outcome;

use crate::cell::CompletionCell;
use crate::continuation::Continuation;

/// Values gathered so far by [`all`]
struct Gather<T> {
    slots: Vec<Option<T>>,
    remaining: usize,
}

impl<T> Gather<T> {
    fn fill(&mut self, index: usize, value: T) -> Option<Vec<T>> {
        if self.slots[index].replace(value).is_none() {
            self.remaining -= 1;
        }
        if self.remaining > 0 {
            return None;
        }
        self.slots.drain(..).collect()
    }
}

fn collect_inputs<T, I>(cells: I) -> Vec<CompletionCell<T>>
where
    I: IntoIterator,
    I::Item: Borrow<CompletionCell<T>>,
{
    cells.into_iter().map(|c| c.borrow().clone()).collect()
}

/// A cell fulfilled with every input's value, in input order.
///
/// Completion order does not matter; slot `i` always holds input `i`'s value.
/// An empty input is fulfilled with an empty `Vec` straight away.
pub fn all<T, I>(cells: I) -> CompletionCell<Vec<T>>
where
    T: Clone + Send + 'static,
    I: IntoIterator,
    I::Item: Borrow<CompletionCell<T>>,
{
    let inputs = collect_inputs(cells);
    let Some(first) = inputs.first() else {
        return CompletionCell::resolved(Vec::new());
    };

    let derived = first.derive::<Vec<T>>();
    let gather = Arc::new(Mutex::new(Gather {
        slots: (0..inputs.len()).map(|_| None).collect(),
        remaining: inputs.len(),
    }));

    for (index, input) in inputs.iter().enumerate() {
        let gather = Arc::clone(&gather);
        let on_value = derived.clone();
        let on_failure = derived.clone();
        input.register(
            Continuation::on_both(
                move |value| {
                    let ready = gather.lock().fill(index, value);
                    if let Some(values) = ready {
                        on_value.resolve(values);
                    }
                },
                move |failure| {
                    on_failure.fail(failure);
                },
            )
            .inline(),
        );
    }

    derived
}

/// A cell settled with the first outcome observed among `cells`.
///
/// An empty input never settles.
pub fn any<T, I>(cells: I) -> CompletionCell<T>
where
    T: Clone + Send + 'static,
    I: IntoIterator,
    I::Item: Borrow<CompletionCell<T>>,
{
    let inputs = collect_inputs(cells);
    let Some(first) = inputs.first() else {
        debug!("any() called with no inputs, result will stay pending");
        return CompletionCell::new();
    };

    let derived = first.derive::<T>();
    for input in &inputs {
        let target = derived.clone();
        input.register(
            Continuation::on_outcome(move |outcome: Outcome<T>| {
                target.complete(outcome);
            })
            .inline(),
        );
    }

    derived
}
