//! Completion Cell Semantics Test Suite
//!
//! Tests organized by behavior area:
//! - fire: settle, settle twice, settle concurrently with listeners
//! - events: sequential chains, recovery, composition, observers
//! - combined: combine and race over two cells
//! - aggregate: all / any over many cells
//! - override: forced replacement of a settled outcome
//! - concurrency: thread safety under a worker pool

mod aggregate;
mod combined;
mod concurrency;
mod r#override;

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::thread;

pub use vow::prelude::*;

/// Install a test-writer subscriber once; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Error raised by test producers when a cell is rejected on purpose
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected(pub String);

impl Rejected {
    pub fn new(message: &str) -> Self {
        Rejected(message.to_string())
    }

    pub fn failure(message: &str) -> Failure {
        Failure::producer(Rejected::new(message))
    }
}

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Rejected {}

/// One observation made by a continuation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Completed(String),
    Exception(String),
}

pub fn completed(text: &str) -> Completion {
    Completion::Completed(text.to_string())
}

pub fn exception(text: &str) -> Completion {
    Completion::Exception(text.to_string())
}

/// Ordered record of what continuations observed
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    entries: Arc<Mutex<Vec<Completion>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print(&self, text: impl Into<String>) {
        self.entries.lock().push(Completion::Completed(text.into()));
    }

    pub fn log(&self, failure: &Failure) {
        self.entries
            .lock()
            .push(Completion::Exception(failure.message()));
    }

    /// Record `input` and return it with a suffix
    pub fn transform(&self, input: String) -> String {
        self.print(input.clone());
        format!("{input} TRANSFORMED")
    }

    pub fn entries(&self) -> Vec<Completion> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

/// Run `f` on a fresh thread and wait for it, propagating its panics
pub fn start_thread<F>(f: F)
where
    F: FnOnce() + Send + 'static,
{
    if let Err(payload) = thread::spawn(f).join() {
        std::panic::resume_unwind(payload);
    }
}

pub fn string_cell() -> CompletionCell<String> {
    CompletionCell::new()
}
