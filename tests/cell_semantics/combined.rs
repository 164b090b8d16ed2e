//! Two-Cell Combinator Tests
//!
//! Tests for combine and race:
//! - combine, combine_void, run_after_both
//! - race_transform, race_consume, run_after_either
//! - failure on either side

use crate::*;

fn settle_in_order(first: &CompletionCell<String>, second: &CompletionCell<String>) {
    let (a, b) = (first.clone(), second.clone());
    start_thread(move || {
        a.resolve("Future 1 explicitly fulfilled".to_string());
        a.join().unwrap();
        b.resolve("Future 2 explicitly fulfilled".to_string());
    });
}

// =============================================================================
// Combine
// =============================================================================

/// The combined value is built from both inputs
#[test]
fn combine_two_cells() {
    init_tracing();
    let recorder = Recorder::new();
    let (first, second) = (string_cell(), string_cell());

    let r = recorder.clone();
    first
        .combine(&second, |v1, v2| format!("{v1} + {v2}"))
        .then_consume(move |v| r.print(v));
    settle_in_order(&first, &second);

    assert_eq!(
        recorder.entries(),
        vec![completed(
            "Future 1 explicitly fulfilled + Future 2 explicitly fulfilled"
        )]
    );
}

/// A terminal consumer sees both values
#[test]
fn combine_two_cells_with_terminal_operation() {
    init_tracing();
    let recorder = Recorder::new();
    let (first, second) = (string_cell(), string_cell());

    let r = recorder.clone();
    first.combine_void(&second, move |v1, v2| {
        r.print(v1);
        r.print(v2);
    });
    settle_in_order(&first, &second);

    assert_eq!(
        recorder.entries(),
        vec![
            completed("Future 1 explicitly fulfilled"),
            completed("Future 2 explicitly fulfilled")
        ]
    );
}

/// A unit action runs once both are fulfilled
#[test]
fn combine_two_cells_with_unit_action() {
    let recorder = Recorder::new();
    let (first, second) = (string_cell(), string_cell());

    let r = recorder.clone();
    first.run_after_both(&second, move || r.print("Both Futures explicitly fulfilled"));
    first.resolve("Future 1 explicitly fulfilled".to_string());
    assert_eq!(recorder.len(), 0);
    second.resolve("Future 2 explicitly fulfilled".to_string());

    assert_eq!(
        recorder.entries(),
        vec![completed("Both Futures explicitly fulfilled")]
    );
}

/// Either side failing rejects the combination with that failure
#[test]
fn combine_rejected_by_either_side() {
    let (first, second) = (string_cell(), string_cell());
    let combined = first.combine(&second, |v1, v2| format!("{v1} + {v2}"));

    first.resolve("Future 1 explicitly fulfilled".to_string());
    second.fail(Rejected::failure("Promise rejected"));

    let failure = combined.join().unwrap_err().into_failure().unwrap();
    assert_eq!(
        failure.downcast_ref::<Rejected>(),
        Some(&Rejected::new("Promise rejected"))
    );
}

// =============================================================================
// Race
// =============================================================================

/// The first fulfilled input is transformed
#[test]
fn race_two_cells() {
    init_tracing();
    let recorder = Recorder::new();
    let (first, second) = (string_cell(), string_cell());

    let (r1, r2) = (recorder.clone(), recorder.clone());
    first
        .race_transform(&second, move |v| r1.transform(v))
        .then_consume(move |v| r2.print(v));
    settle_in_order(&first, &second);

    assert_eq!(
        recorder.entries(),
        vec![
            completed("Future 1 explicitly fulfilled"),
            completed("Future 1 explicitly fulfilled TRANSFORMED")
        ]
    );
}

/// A terminal consumer sees only the winner
#[test]
fn race_two_cells_with_terminal_operation() {
    let recorder = Recorder::new();
    let (first, second) = (string_cell(), string_cell());

    let r = recorder.clone();
    first.race_consume(&second, move |v| r.print(v));
    settle_in_order(&first, &second);

    assert_eq!(
        recorder.entries(),
        vec![completed("Future 1 explicitly fulfilled")]
    );
}

/// A unit action runs exactly once
#[test]
fn race_two_cells_with_unit_action() {
    let recorder = Recorder::new();
    let (first, second) = (string_cell(), string_cell());

    let r = recorder.clone();
    first.run_after_either(&second, move || {
        r.print("One of the two Futures explicitly fulfilled")
    });
    settle_in_order(&first, &second);

    assert_eq!(
        recorder.entries(),
        vec![completed("One of the two Futures explicitly fulfilled")]
    );
}

/// The later input can win when the receiver settles last
#[test]
fn race_won_by_argument() {
    let (first, second) = (string_cell(), string_cell());
    let raced = first.race_transform(&second, |v| v);
    settle_in_order(&second, &first);
    assert_eq!(raced.join().unwrap(), "Future 1 explicitly fulfilled");
}
