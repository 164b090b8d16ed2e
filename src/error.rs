//! Unified error types for vow.
//!
//! This module provides a single error type that wraps the errors of the
//! member crates and presents a consistent interface to users.

use std::time::Duration;
use thiserror::Error;
use vow_cell::{CellError, Failure};
use vow_executor::PoolError;

/// All vow errors.
///
/// This is the canonical error type of the facade. A rejected cell surfaces
/// as [`Error::Failed`] carrying the original [`Failure`].
#[derive(Debug, Error)]
pub enum Error {
    /// The cell was rejected
    #[error(transparent)]
    Failed(Failure),

    /// A blocking read gave up before the cell settled
    #[error("timed out after {0:?} waiting for cell")]
    Timeout(Duration),

    /// A terminal operation lost to an earlier one
    #[error("cell already completed")]
    AlreadyCompleted,

    /// Configuration rejected before any thread was started
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error, typically a failed thread spawn
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for vow operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if a blocking read timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }

    /// Check if the cell was rejected.
    pub fn is_failure(&self) -> bool {
        matches!(self, Error::Failed(_))
    }

    /// Check if a terminal operation found the cell already settled.
    pub fn is_already_completed(&self) -> bool {
        matches!(self, Error::AlreadyCompleted)
    }

    /// The failure carried by a rejected cell, if that is what this is.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Error::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

impl From<Failure> for Error {
    fn from(failure: Failure) -> Self {
        Error::Failed(failure)
    }
}

// Convert from cell errors
impl From<CellError> for Error {
    fn from(e: CellError) -> Self {
        match e {
            CellError::Failed(failure) => Error::Failed(failure),
            CellError::Timeout(limit) => Error::Timeout(limit),
            CellError::AlreadyCompleted => Error::AlreadyCompleted,
        }
    }
}

// Convert from pool errors
impl From<PoolError> for Error {
    fn from(e: PoolError) -> Self {
        match e {
            PoolError::InvalidConfig(msg) => Error::InvalidConfig(msg),
            PoolError::Spawn(io_err) => Error::Io(io_err),
        }
    }
}
