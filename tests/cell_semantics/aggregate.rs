//! Aggregate Combinator Tests
//!
//! Tests for all / any over sequences of cells, including empty input and
//! inputs settled on different threads.

use crate::*;
use std::time::Duration;

/// A completion signal fires once all inputs are fulfilled
#[test]
fn all_as_completion_signal() {
    init_tracing();
    let recorder = Recorder::new();
    let (first, second) = (string_cell(), string_cell());

    let r = recorder.clone();
    let combined = all([&first, &second]).then_run(move || r.print("Completed"));

    let (a, b) = (first.clone(), second.clone());
    start_thread(move || {
        a.resolve("Future 1 explicitly fulfilled".to_string());
        b.resolve("Future 2 explicitly fulfilled".to_string());
    });

    combined.join().unwrap();
    assert_eq!(recorder.entries(), vec![completed("Completed")]);
}

/// The gathered values arrive in input order
#[test]
fn all_values_in_input_order() {
    init_tracing();
    let recorder = Recorder::new();
    let (first, second) = (string_cell(), string_cell());

    let r = recorder.clone();
    let combined = all([first.clone(), second.clone()]).then_consume(move |values| {
        for v in values {
            r.print(v);
        }
    });

    second.resolve("Future 2 explicitly fulfilled".to_string());
    first.resolve("Future 1 explicitly fulfilled".to_string());

    combined.join().unwrap();
    assert_eq!(
        recorder.entries(),
        vec![
            completed("Future 1 explicitly fulfilled"),
            completed("Future 2 explicitly fulfilled")
        ]
    );
}

/// One rejected input rejects the aggregate straight away
#[test]
fn all_rejected_by_one_input() {
    let cells: Vec<CompletionCell<u32>> = (0..4).map(|_| CompletionCell::new()).collect();
    let gathered = all(&cells);
    cells[0].resolve(1);
    cells[3].fail(Rejected::failure("fourth failed"));

    assert!(gathered.is_rejected());
    assert_eq!(
        gathered.join().unwrap_err().failure().unwrap().message(),
        "fourth failed"
    );
}

/// No inputs means an immediately fulfilled empty list
#[test]
fn all_of_nothing() {
    let gathered = all(Vec::<CompletionCell<String>>::new());
    assert_eq!(gathered.join().unwrap(), Vec::<String>::new());
}

/// The first settled input decides any
#[test]
fn any_first_fulfilled_wins() {
    init_tracing();
    let recorder = Recorder::new();
    let (first, second) = (string_cell(), string_cell());

    let r = recorder.clone();
    let combined = any([&first, &second]).then_consume(move |v| r.print(v));

    let (a, b) = (first.clone(), second.clone());
    start_thread(move || {
        a.resolve("Future 1 explicitly fulfilled".to_string());
        a.join().unwrap();
        b.resolve("Future 2 explicitly fulfilled".to_string());
    });

    combined.join().unwrap();
    assert_eq!(
        recorder.entries(),
        vec![completed("Future 1 explicitly fulfilled")]
    );
}

/// No inputs means a cell that never settles
#[test]
fn any_of_nothing_stays_pending() {
    init_tracing();
    let winner = any(Vec::<CompletionCell<String>>::new());
    let err = winner
        .get_blocking(Some(Duration::from_millis(20)))
        .unwrap_err();
    assert!(err.is_timeout());
}

/// Inputs settled on many threads are all gathered
#[test]
fn all_across_threads() {
    let vow = Vow::builder().workers(4).open().unwrap();
    let cells: Vec<CompletionCell<usize>> = (0..32)
        .map(|i| {
            vow.supply(move || {
                std::thread::sleep(Duration::from_millis((i % 5) as u64));
                Ok::<_, Rejected>(i * i)
            })
        })
        .collect();

    let squares = all(&cells).join().unwrap();
    assert_eq!(squares, (0..32).map(|i| i * i).collect::<Vec<_>>());
    vow.shutdown();
}
