//! Error values carried by completion cells
//!
//! A rejected cell holds a [`Failure`]: a shared handle on the original cause
//! plus a [`FailureKind`] recording where it arose.
//!
//! ## Failure kinds
//!
//! | Kind | Raised by |
//! |------|-----------|
//! | `Producer` | The work that settles a cell failed |
//! | `Callback` | A continuation attached downstream failed |
//!
//! ## Relaying
//!
//! Failures travel forward through combinator chains unchanged. A stage only
//! creates a new `Failure` for its own error; constructing a `Failure` from a
//! cause that is already a `Failure` hands back the original, so a handler
//! that re-raises what it was given never adds a layer.

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Boxed error accepted wherever a failure cause is supplied.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Where a failure originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The producer's own work failed
    Producer,
    /// A continuation failed while handling an outcome
    Callback,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Producer => f.write_str("producer"),
            FailureKind::Callback => f.write_str("callback"),
        }
    }
}

/// The failure held by a rejected cell.
///
/// Cloning is cheap: every clone shares the same cause, so identity survives
/// any number of hops through combinators. Use [`Failure::downcast_ref`] to
/// recover the concrete error type.
#[derive(Clone)]
pub struct Failure {
    kind: FailureKind,
    cause: Arc<dyn StdError + Send + Sync + 'static>,
}

impl Failure {
    /// Failure of the work that settles a cell
    pub fn producer<E: Into<BoxError>>(cause: E) -> Self {
        Self::new(FailureKind::Producer, cause)
    }

    /// Failure raised by a continuation
    pub fn callback<E: Into<BoxError>>(cause: E) -> Self {
        Self::new(FailureKind::Callback, cause)
    }

    /// Create a failure of the given kind.
    ///
    /// If `cause` already is a `Failure` it is returned as is, keeping its
    /// original kind.
    pub fn new<E: Into<BoxError>>(kind: FailureKind, cause: E) -> Self {
        let boxed: BoxError = cause.into();
        match boxed.downcast::<Failure>() {
            Ok(relayed) => *relayed,
            Err(cause) => Failure {
                kind,
                cause: Arc::from(cause),
            },
        }
    }

    /// Convert a caught panic payload into a failure
    pub fn from_panic(payload: Box<dyn Any + Send>, kind: FailureKind) -> Self {
        Self::new(kind, PanicError::from_payload(payload))
    }

    /// Where this failure originated
    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Check if the producer's work failed
    pub fn is_producer(&self) -> bool {
        self.kind == FailureKind::Producer
    }

    /// Check if a continuation failed
    pub fn is_callback(&self) -> bool {
        self.kind == FailureKind::Callback
    }

    /// Check if the cause is a caught panic
    pub fn is_panic(&self) -> bool {
        self.cause.is::<PanicError>()
    }

    /// The original cause
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.cause
    }

    /// Borrow the cause as a concrete error type
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.cause.downcast_ref::<E>()
    }

    /// The cause's message
    pub fn message(&self) -> String {
        self.cause.to_string()
    }

    /// Check whether two failures share the same cause instance
    pub fn same_cause(&self, other: &Failure) -> bool {
        Arc::as_ptr(&self.cause) as *const () == Arc::as_ptr(&other.cause) as *const ()
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Failure")
            .field("kind", &self.kind)
            .field("cause", &self.cause)
            .finish()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FailureKind::Producer => write!(f, "{}", self.cause),
            FailureKind::Callback => write!(f, "callback failed: {}", self.cause),
        }
    }
}

impl StdError for Failure {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.cause)
    }
}

/// A panic caught while running user code
#[derive(Debug, Clone, Error)]
#[error("panicked: {message}")]
pub struct PanicError {
    message: String,
}

impl PanicError {
    /// Extract the panic message from a payload
    pub fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "<non-string panic payload>".to_string()
        };
        Self { message }
    }

    /// The panic message
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors reported by cell operations
#[derive(Debug, Clone, Error)]
pub enum CellError {
    /// The cell was rejected; carries the original failure
    #[error(transparent)]
    Failed(#[from] Failure),

    /// `get_blocking` gave up before the cell settled
    #[error("timed out after {0:?} waiting for completion")]
    Timeout(Duration),

    /// A terminal mutation hit a cell that had already settled
    #[error("cell already completed")]
    AlreadyCompleted,
}

impl CellError {
    /// Check if this is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, CellError::Timeout(_))
    }

    /// Check if a terminal mutation lost the race
    pub fn is_already_completed(&self) -> bool {
        matches!(self, CellError::AlreadyCompleted)
    }

    /// The failure, if the cell was rejected
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            CellError::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Take the failure, if the cell was rejected
    pub fn into_failure(self) -> Option<Failure> {
        match self {
            CellError::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}
