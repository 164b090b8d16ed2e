//! Completion cell state machine
//!
//! A [`CompletionCell`] starts pending and settles at most once, either
//! fulfilled with a value or rejected with a [`Failure`]. Everything else in
//! this crate is wiring between cells.
//!
//! ## Locking
//!
//! The phase (pending with its waiting list, or settled with its outcome) is
//! one value behind one mutex. `register` and `complete` both decide under
//! that lock, so a registration racing a settlement either lands in the list
//! the settler drains or sees the settled outcome. Nothing is dropped.
//!
//! No user code runs while the lock is held. The settler swaps the waiting
//! list out, releases the lock, then fires the continuations in registration
//! order. Registrations that arrive while that drain is still running are
//! queued behind it, so per-cell order holds even across the settle boundary.
//!
//! ## Single assignment
//!
//! `resolve`, `fail` and `complete` report whether they applied; a losing
//! attempt changes nothing. Only the operations in the `obtrude` module may
//! replace a settled outcome.

use parking_lot::{Condvar, Mutex};
use smallvec::SmallVec;
use std::fmt;
use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};
use vow_core::{CellError, Executor, Failure, Outcome};

use crate::continuation::Continuation;

pub(crate) type Waiting<T> = SmallVec<[Continuation<T>; 2]>;

/// Registrations held back by a running drain, each with the outcome current
/// when it registered
pub(crate) type Queued<T> = SmallVec<[(Continuation<T>, Outcome<T>); 2]>;

static NEXT_CELL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique cell identifier, used in log fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(u64);

impl CellId {
    pub(crate) fn next() -> Self {
        CellId(NEXT_CELL_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell#{}", self.0)
    }
}

/// Observable state of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellState {
    /// Not yet settled
    Pending,
    /// Settled with a value
    Fulfilled,
    /// Settled with a failure
    Rejected,
}

pub(crate) enum Phase<T> {
    Pending(Waiting<T>),
    Settled {
        outcome: Outcome<T>,
        /// Registrations that arrived while a drain was still running
        queued: Queued<T>,
        draining: bool,
    },
}

pub(crate) struct Shared<T> {
    pub(crate) id: CellId,
    pub(crate) phase: Mutex<Phase<T>>,
    pub(crate) settled: Condvar,
    pub(crate) executor: Arc<dyn Executor>,
}

/// A single-assignment, thread-safe result slot with registered continuations.
///
/// Cloning a cell clones the handle; all clones observe and settle the same
/// cell.
///
/// # Example
///
/// ```
/// use vow_cell::CompletionCell;
///
/// let cell = CompletionCell::new();
/// let doubled = cell.then_transform(|v: i32| v * 2);
///
/// assert!(cell.resolve(21));
/// assert!(!cell.resolve(0));
/// assert_eq!(doubled.join().unwrap(), 42);
/// ```
pub struct CompletionCell<T> {
    pub(crate) shared: Arc<Shared<T>>,
}

impl<T> Clone for CompletionCell<T> {
    fn clone(&self) -> Self {
        CompletionCell {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Clone + Send + 'static> Default for CompletionCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> CompletionCell<T> {
    /// Create a pending cell whose continuations run inline
    pub fn new() -> Self {
        Self::with_executor(vow_core::inline())
    }

    /// Create a pending cell whose continuations run on `executor`.
    ///
    /// Cells derived from this one through combinators inherit the executor.
    pub fn with_executor(executor: Arc<dyn Executor>) -> Self {
        let id = CellId::next();
        trace!(cell = %id, executor = executor.name(), "cell created");
        CompletionCell {
            shared: Arc::new(Shared {
                id,
                phase: Mutex::new(Phase::Pending(SmallVec::new())),
                settled: Condvar::new(),
                executor,
            }),
        }
    }

    /// Create a cell already fulfilled with `value`
    pub fn resolved(value: T) -> Self {
        let cell = Self::new();
        cell.resolve(value);
        cell
    }

    /// Create a cell already rejected with `failure`
    pub fn failed(failure: Failure) -> Self {
        let cell = Self::new();
        cell.fail(failure);
        cell
    }

    /// This cell's identifier
    pub fn id(&self) -> CellId {
        self.shared.id
    }

    /// The executor this cell's combinators run callbacks on
    pub fn executor(&self) -> &Arc<dyn Executor> {
        &self.shared.executor
    }

    /// Current state
    pub fn state(&self) -> CellState {
        match &*self.shared.phase.lock() {
            Phase::Pending(_) => CellState::Pending,
            Phase::Settled {
                outcome: Outcome::Fulfilled(_),
                ..
            } => CellState::Fulfilled,
            Phase::Settled {
                outcome: Outcome::Rejected(_),
                ..
            } => CellState::Rejected,
        }
    }

    /// Check if the cell has settled either way
    pub fn is_done(&self) -> bool {
        self.state() != CellState::Pending
    }

    /// Check if the cell settled with a value
    pub fn is_fulfilled(&self) -> bool {
        self.state() == CellState::Fulfilled
    }

    /// Check if the cell settled with a failure
    pub fn is_rejected(&self) -> bool {
        self.state() == CellState::Rejected
    }

    /// The outcome, if settled, without blocking
    pub fn peek(&self) -> Option<Outcome<T>> {
        match &*self.shared.phase.lock() {
            Phase::Pending(_) => None,
            Phase::Settled { outcome, .. } => Some(outcome.clone()),
        }
    }

    /// Number of continuations registered but not yet dispatched
    pub fn pending_continuations(&self) -> usize {
        match &*self.shared.phase.lock() {
            Phase::Pending(waiting) => waiting.len(),
            Phase::Settled { queued, .. } => queued.len(),
        }
    }

    /// Fulfil the cell. Returns `false` if it had already settled.
    pub fn resolve(&self, value: T) -> bool {
        self.complete(Outcome::Fulfilled(value))
    }

    /// Reject the cell. Returns `false` if it had already settled.
    pub fn fail(&self, failure: Failure) -> bool {
        self.complete(Outcome::Rejected(failure))
    }

    /// [`resolve`](Self::resolve), reporting a lost race as an error
    pub fn try_resolve(&self, value: T) -> Result<(), CellError> {
        if self.resolve(value) {
            Ok(())
        } else {
            Err(CellError::AlreadyCompleted)
        }
    }

    /// [`fail`](Self::fail), reporting a lost race as an error
    pub fn try_fail(&self, failure: Failure) -> Result<(), CellError> {
        if self.fail(failure) {
            Ok(())
        } else {
            Err(CellError::AlreadyCompleted)
        }
    }

    /// Settle the cell with `outcome`.
    ///
    /// Exactly one of any number of concurrent attempts returns `true`. The
    /// winner drains the waiting list on the calling thread, dispatching each
    /// continuation to its executor.
    pub fn complete(&self, outcome: Outcome<T>) -> bool {
        let batch = {
            let mut phase = self.shared.phase.lock();
            let waiting = match &mut *phase {
                Phase::Pending(waiting) => mem::take(waiting),
                Phase::Settled { .. } => {
                    debug!(cell = %self.id(), "completion ignored, cell already settled");
                    return false;
                }
            };
            *phase = Phase::Settled {
                outcome: outcome.clone(),
                queued: SmallVec::new(),
                draining: true,
            };
            waiting
        };
        self.shared.settled.notify_all();

        debug!(
            cell = %self.id(),
            fulfilled = outcome.is_fulfilled(),
            continuations = batch.len(),
            "cell settled"
        );
        self.drain(outcome, batch);
        true
    }

    /// Register a continuation.
    ///
    /// While pending, the continuation joins the waiting list. Once settled,
    /// it is dispatched immediately with the settled outcome. A continuation
    /// without an explicit executor runs on the cell's executor.
    pub fn register(&self, continuation: Continuation<T>) {
        let continuation = if continuation.has_executor() {
            continuation
        } else {
            continuation.via(Arc::clone(&self.shared.executor))
        };

        let mut phase = self.shared.phase.lock();
        match &mut *phase {
            Phase::Pending(waiting) => {
                waiting.push(continuation);
                trace!(cell = %self.id(), waiting = waiting.len(), "continuation registered");
            }
            Phase::Settled {
                outcome,
                queued,
                draining: true,
            } => {
                queued.push((continuation, outcome.clone()));
                trace!(cell = %self.id(), "continuation queued behind running drain");
            }
            Phase::Settled { outcome, .. } => {
                let outcome = outcome.clone();
                drop(phase);
                continuation.fire(self.id(), outcome);
            }
        }
    }

    /// Block until the cell settles, then return its value or failure.
    ///
    /// With a timeout, gives up with [`CellError::Timeout`] once it elapses.
    /// Giving up does not affect the cell.
    pub fn get_blocking(&self, timeout: Option<Duration>) -> Result<T, CellError> {
        let deadline = timeout
            .and_then(|limit| Instant::now().checked_add(limit).map(|at| (limit, at)));

        let mut phase = self.shared.phase.lock();
        loop {
            if let Phase::Settled { outcome, .. } = &*phase {
                return outcome.clone().into_result().map_err(CellError::Failed);
            }
            match deadline {
                None => self.shared.settled.wait(&mut phase),
                Some((limit, at)) => {
                    if self.shared.settled.wait_until(&mut phase, at).timed_out() {
                        if let Phase::Settled { outcome, .. } = &*phase {
                            return outcome.clone().into_result().map_err(CellError::Failed);
                        }
                        return Err(CellError::Timeout(limit));
                    }
                }
            }
        }
    }

    /// Block until settled, without a timeout
    pub fn join(&self) -> Result<T, CellError> {
        self.get_blocking(None)
    }

    /// Block until settled or until `timeout` elapses
    pub fn wait_timeout(&self, timeout: Duration) -> Result<T, CellError> {
        self.get_blocking(Some(timeout))
    }

    /// A cell mirroring this one whose downstream stages run on `executor`
    pub fn via(&self, executor: Arc<dyn Executor>) -> CompletionCell<T> {
        let relay = CompletionCell::with_executor(executor);
        let target = relay.clone();
        self.register(
            Continuation::on_outcome(move |outcome| {
                target.complete(outcome);
            })
            .inline(),
        );
        relay
    }

    /// A new pending cell sharing this cell's executor
    pub(crate) fn derive<U: Clone + Send + 'static>(&self) -> CompletionCell<U> {
        CompletionCell::with_executor(Arc::clone(&self.shared.executor))
    }

    /// Fire `batch`, then keep firing whatever was queued meanwhile.
    ///
    /// Queued registrations fire with the outcome they registered against,
    /// so an override made mid-drain reaches only later registrations.
    fn drain(&self, outcome: Outcome<T>, batch: Waiting<T>) {
        for continuation in batch {
            continuation.fire(self.id(), outcome.clone());
        }

        loop {
            let queued = {
                let mut phase = self.shared.phase.lock();
                match &mut *phase {
                    Phase::Settled {
                        queued, draining, ..
                    } => {
                        if queued.is_empty() {
                            *draining = false;
                            return;
                        }
                        mem::take(queued)
                    }
                    Phase::Pending(_) => return,
                }
            };

            for (continuation, outcome) in queued {
                continuation.fire(self.id(), outcome);
            }
        }
    }
}

impl<T> fmt::Debug for CompletionCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.shared.phase.lock() {
            Phase::Pending(_) => "pending",
            Phase::Settled {
                outcome: Outcome::Fulfilled(_),
                ..
            } => "fulfilled",
            Phase::Settled { .. } => "rejected",
        };
        f.debug_struct("CompletionCell")
            .field("id", &self.shared.id)
            .field("state", &state)
            .field("executor", &self.shared.executor.name())
            .finish()
    }
}
