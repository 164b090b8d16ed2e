//! Terminal outcome of a completion cell

use crate::error::Failure;

/// The final state of a settled cell: a value or a failure.
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    /// Settled with a value
    Fulfilled(T),
    /// Settled with a failure
    Rejected(Failure),
}

impl<T> Outcome<T> {
    /// Check if this outcome carries a value
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Outcome::Fulfilled(_))
    }

    /// Check if this outcome carries a failure
    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }

    /// Borrow the value, if fulfilled
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Fulfilled(value) => Some(value),
            Outcome::Rejected(_) => None,
        }
    }

    /// Borrow the failure, if rejected
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Outcome::Fulfilled(_) => None,
            Outcome::Rejected(failure) => Some(failure),
        }
    }

    /// Borrow as a `Result`
    pub fn as_result(&self) -> Result<&T, &Failure> {
        match self {
            Outcome::Fulfilled(value) => Ok(value),
            Outcome::Rejected(failure) => Err(failure),
        }
    }

    /// Convert into a `Result`
    pub fn into_result(self) -> Result<T, Failure> {
        match self {
            Outcome::Fulfilled(value) => Ok(value),
            Outcome::Rejected(failure) => Err(failure),
        }
    }

    /// Transform the value, keeping a failure untouched
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Fulfilled(value) => Outcome::Fulfilled(f(value)),
            Outcome::Rejected(failure) => Outcome::Rejected(failure),
        }
    }
}

impl<T> From<Result<T, Failure>> for Outcome<T> {
    fn from(result: Result<T, Failure>) -> Self {
        match result {
            Ok(value) => Outcome::Fulfilled(value),
            Err(failure) => Outcome::Rejected(failure),
        }
    }
}

impl<T> From<Outcome<T>> for Result<T, Failure> {
    fn from(outcome: Outcome<T>) -> Self {
        outcome.into_result()
    }
}
