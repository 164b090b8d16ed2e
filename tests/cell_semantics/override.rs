//! Forced Override Tests
//!
//! Overriding replaces the outcome for later readers only. Continuations
//! that already ran are not run again.

use crate::*;

fn listen(cell: &CompletionCell<String>, recorder: &Recorder) {
    let r = recorder.clone();
    cell.on_failure(move |failure| {
        r.log(&failure);
        Err(failure)
    });
    let r = recorder.clone();
    cell.then_consume(move |v| r.print(v));
}

/// A forced failure after a value changes what readers see, not what ran
#[test]
fn fulfil_then_force_reject() {
    init_tracing();
    let recorder = Recorder::new();
    let cell = string_cell();
    listen(&cell, &recorder);

    let producer = cell.clone();
    start_thread(move || {
        assert!(producer.resolve("Future explicitly fulfilled".to_string()));
        producer.obtrude_error(Rejected::failure("Promise rejected"));
    });

    assert_eq!(recorder.entries(), vec![completed("Future explicitly fulfilled")]);
    let failure = cell.join().unwrap_err().into_failure().unwrap();
    assert!(failure.downcast_ref::<Rejected>().is_some());
}

/// A forced second value replaces the first for later readers
#[test]
fn fulfil_twice_forced() {
    init_tracing();
    let recorder = Recorder::new();
    let cell = string_cell();
    listen(&cell, &recorder);

    let producer = cell.clone();
    start_thread(move || {
        assert!(producer.resolve("Future explicitly fulfilled".to_string()));
        producer.obtrude_value("Future explicitly fulfilled 2".to_string());
        assert!(producer.is_done());
        assert!(!producer.is_rejected());
    });

    assert_eq!(recorder.entries(), vec![completed("Future explicitly fulfilled")]);
    assert_eq!(cell.join().unwrap(), "Future explicitly fulfilled 2");
}

/// A forced value after a rejection flips the state to fulfilled
#[test]
fn reject_then_force_fulfil() {
    init_tracing();
    let recorder = Recorder::new();
    let cell = string_cell();
    listen(&cell, &recorder);

    let producer = cell.clone();
    start_thread(move || {
        assert!(producer.fail(Rejected::failure("Promise rejected")));
        assert!(producer.is_rejected());
        producer.obtrude_value("Future explicitly fulfilled".to_string());
        assert!(producer.is_done());
        assert!(!producer.is_rejected());
    });

    assert_eq!(recorder.entries(), vec![exception("Promise rejected")]);
    assert_eq!(cell.join().unwrap(), "Future explicitly fulfilled");
}

/// Stages registered after the override see the new outcome
#[test]
fn stages_after_override_see_new_outcome() {
    let cell = string_cell();
    cell.resolve("original".to_string());
    cell.obtrude_value("replacement".to_string());

    let derived = cell.then_transform(|v| v.len());
    assert_eq!(derived.join().unwrap(), "replacement".len());
}
