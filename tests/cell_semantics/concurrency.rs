//! Concurrency Tests
//!
//! Tests for thread safety of settlement and registration:
//! - Concurrent settle attempts have exactly one winner
//! - Registrations racing settlement are never lost
//! - Continuations on a worker pool run exactly once
//! - Blocking readers on many threads all wake

use crate::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

// =============================================================================
// Settlement Races
// =============================================================================

/// Many threads try to settle; exactly one succeeds
#[test]
fn concurrent_settle_single_winner() {
    init_tracing();
    let num_threads = 8;

    for _ in 0..50 {
        let cell: CompletionCell<usize> = CompletionCell::new();
        let barrier = Arc::new(Barrier::new(num_threads));
        let handles: Vec<_> = (0..num_threads)
            .map(|i| {
                let cell = cell.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    if i % 2 == 0 {
                        cell.resolve(i)
                    } else {
                        cell.fail(Rejected::failure("odd thread"))
                    }
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert!(cell.is_done());
    }
}

/// Continuations registered while another thread settles all run once
#[test]
fn registration_racing_settlement_is_not_lost() {
    init_tracing();
    for _ in 0..50 {
        let cell: CompletionCell<u32> = CompletionCell::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(2));

        let registrar = {
            let cell = cell.clone();
            let hits = Arc::clone(&hits);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..100 {
                    let hits = Arc::clone(&hits);
                    cell.register(Continuation::on_success(move |_| {
                        hits.fetch_add(1, Ordering::SeqCst);
                    }));
                }
            })
        };

        barrier.wait();
        cell.resolve(1);
        registrar.join().unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 100);
    }
}

// =============================================================================
// Worker Pool
// =============================================================================

/// Each stage of many chains runs exactly once on the pool
#[test]
fn chains_on_worker_pool() {
    init_tracing();
    let vow = Vow::builder().workers(4).thread_name("chain").open().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    let ends: Vec<_> = (0..64u64)
        .map(|i| {
            let c = Arc::clone(&calls);
            vow.supply(move || Ok::<_, Rejected>(i))
                .then_transform(move |v| {
                    c.fetch_add(1, Ordering::SeqCst);
                    v * 2
                })
        })
        .collect();

    let total: u64 = all(&ends).join().unwrap().into_iter().sum();
    assert_eq!(total, (0..64u64).map(|i| i * 2).sum::<u64>());
    assert_eq!(calls.load(Ordering::SeqCst), 64);

    vow.shutdown();
    let metrics = vow.metrics().unwrap();
    assert_eq!(metrics.panicked, 0);
    assert_eq!(metrics.submitted, metrics.completed);
}

/// Continuations hop to the executor given by via
#[test]
fn via_moves_continuations_to_pool() {
    let options = PoolOptions::sized(1).with_thread_name("hop");
    let pool: Arc<dyn Executor> = Arc::new(WorkerPool::new(options).unwrap());
    let cell = string_cell();
    let thread_name = cell
        .via(pool)
        .then_transform(|_| thread::current().name().map(str::to_owned));

    cell.resolve("go".to_string());
    assert_eq!(thread_name.join().unwrap().as_deref(), Some("hop-0"));
}

/// Blocking readers on many threads are all released by one settlement
#[test]
fn blocking_readers_all_wake() {
    let cell = string_cell();
    let readers: Vec<_> = (0..8)
        .map(|_| {
            let cell = cell.clone();
            thread::spawn(move || cell.get_blocking(Some(Duration::from_secs(10))))
        })
        .collect();

    thread::sleep(Duration::from_millis(20));
    cell.resolve("wake".to_string());

    for reader in readers {
        assert_eq!(reader.join().unwrap().unwrap(), "wake");
    }
}
