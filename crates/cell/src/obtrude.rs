//! Forced override of a settled outcome
//!
//! These operations break single assignment on purpose. They exist for tests
//! and administrative correction; producers and combinators never call them.
//!
//! - On a settled cell the outcome is replaced. Continuations that already
//!   fired are not called again; only later registrations and later blocking
//!   reads see the new outcome. A registration still queued behind a running
//!   drain keeps the outcome it registered against.
//! - On a pending cell the override acts as an ordinary completion, firing
//!   whatever is waiting.

use tracing::warn;
use vow_core::{Failure, Outcome};

use crate::cell::{CompletionCell, Phase};

impl<T: Clone + Send + 'static> CompletionCell<T> {
    /// Force the cell to be fulfilled with `value`, whatever its state
    pub fn obtrude_value(&self, value: T) {
        self.obtrude(Outcome::Fulfilled(value))
    }

    /// Force the cell to be rejected with `failure`, whatever its state
    pub fn obtrude_error(&self, failure: Failure) {
        self.obtrude(Outcome::Rejected(failure))
    }

    /// Force the cell's outcome, whatever its state
    pub fn obtrude(&self, outcome: Outcome<T>) {
        loop {
            {
                let mut phase = self.shared.phase.lock();
                if let Phase::Settled {
                    outcome: current, ..
                } = &mut *phase
                {
                    warn!(
                        cell = %self.id(),
                        was_fulfilled = current.is_fulfilled(),
                        now_fulfilled = outcome.is_fulfilled(),
                        "settled outcome overridden"
                    );
                    *current = outcome;
                    drop(phase);
                    self.shared.settled.notify_all();
                    return;
                }
            }

            // Still pending: settle normally. Losing that race means someone
            // else settled first, so go round and overwrite their outcome.
            if self.complete(outcome.clone()) {
                return;
            }
        }
    }
}
