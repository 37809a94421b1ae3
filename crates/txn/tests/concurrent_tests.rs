//! Concurrency and interleaving tests for the lifecycle subsystem
//!
//! The counter invariant `total_started == total_committed + total_aborted
//! + current_open` must hold under every interleaving of concurrent
//! sessions, and `current_open` must never exceed the number of sessions
//! between start and terminal transition.

use petrel_core::{LogicalClock, SessionId};
use petrel_txn::{AbortCause, SessionRegistry, StatusReporter, TransactionCounters};
use proptest::prelude::*;
use std::sync::{Arc, Barrier};
use std::thread;

fn fixture() -> (Arc<SessionRegistry>, Arc<TransactionCounters>, Arc<LogicalClock>) {
    let counters = Arc::new(TransactionCounters::new());
    (
        Arc::new(SessionRegistry::new(Arc::clone(&counters))),
        counters,
        Arc::new(LogicalClock::new()),
    )
}

#[test]
fn concurrent_commit_and_abort_sessions_keep_invariant() {
    const SESSIONS: usize = 16;
    const ROUNDS: usize = 50;

    let (registry, counters, clock) = fixture();
    let barrier = Arc::new(Barrier::new(SESSIONS + 1));

    let workers: Vec<_> = (0..SESSIONS)
        .map(|i| {
            let registry = Arc::clone(&registry);
            let counters = Arc::clone(&counters);
            let clock = Arc::clone(&clock);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let session = SessionId::new();
                barrier.wait();
                for round in 0..ROUNDS {
                    let state = registry.get_or_create(session);
                    let mut state = state.lock();
                    state.start(&counters, &clock).unwrap();
                    if (i + round) % 2 == 0 {
                        state.commit(&counters).unwrap();
                    } else {
                        state.abort(AbortCause::Client, &counters).unwrap();
                    }
                }
            })
        })
        .collect();

    // Sampling reader runs alongside the workers; every snapshot it takes
    // must be internally consistent.
    let reporter = StatusReporter::new(Arc::clone(&counters));
    let sampler = {
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            for _ in 0..5_000 {
                let snap = reporter.snapshot();
                assert!(snap.is_balanced(), "unbalanced snapshot: {:?}", snap);
                assert!(
                    snap.current_open <= SESSIONS as u64,
                    "current_open {} exceeds live sessions",
                    snap.current_open
                );
            }
        })
    };

    for w in workers {
        w.join().unwrap();
    }
    sampler.join().unwrap();

    let snap = counters.snapshot();
    assert_eq!(snap.total_started, (SESSIONS * ROUNDS) as u64);
    assert_eq!(snap.current_open, 0);
    assert_eq!(
        snap.total_committed + snap.total_aborted,
        (SESSIONS * ROUNDS) as u64
    );
}

#[test]
fn concurrent_teardown_aborts_each_open_transaction_once() {
    const SESSIONS: usize = 12;

    let (registry, counters, clock) = fixture();
    let sessions: Vec<SessionId> = (0..SESSIONS).map(|_| SessionId::new()).collect();

    for &session in &sessions {
        registry
            .get_or_create(session)
            .lock()
            .start(&counters, &clock)
            .unwrap();
    }
    assert_eq!(counters.snapshot().current_open, SESSIONS as u64);

    // Tear all sessions down from separate threads at once.
    let barrier = Arc::new(Barrier::new(SESSIONS));
    let handles: Vec<_> = sessions
        .into_iter()
        .map(|session| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                registry.remove(session)
            })
        })
        .collect();

    for h in handles {
        assert!(h.join().unwrap());
    }

    let snap = counters.snapshot();
    assert_eq!(snap.current_open, 0);
    assert_eq!(snap.total_aborted, SESSIONS as u64);
    assert!(snap.is_balanced());
    assert!(registry.is_empty());
}

#[test]
fn reader_never_blocks_writer_progress() {
    // Hammer snapshots from several readers while one writer cycles
    // transactions; the writer must finish in bounded time because the
    // write path only ever takes short critical sections.
    let (registry, counters, clock) = fixture();
    let stop = Arc::new(std::sync::atomic::AtomicBool::new(false));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let reporter = StatusReporter::new(Arc::clone(&counters));
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                while !stop.load(std::sync::atomic::Ordering::SeqCst) {
                    assert!(reporter.snapshot().is_balanced());
                }
            })
        })
        .collect();

    let session = SessionId::new();
    for _ in 0..1_000 {
        let state = registry.get_or_create(session);
        let mut state = state.lock();
        state.start(&counters, &clock).unwrap();
        state.commit(&counters).unwrap();
    }

    stop.store(true, std::sync::atomic::Ordering::SeqCst);
    for r in readers {
        r.join().unwrap();
    }

    let snap = counters.snapshot();
    assert_eq!(snap.total_started, 1_000);
    assert_eq!(snap.total_committed, 1_000);
}

// ============================================================================
// Property: exactly-once accounting over arbitrary operation interleavings
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Op {
    Start,
    Commit,
    Abort,
    Remove,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Start),
        Just(Op::Commit),
        Just(Op::Abort),
        Just(Op::Remove),
    ]
}

proptest! {
    /// Replay an arbitrary single-threaded interleaving of lifecycle
    /// operations across a handful of sessions against a trivial model
    /// and check the counters match it exactly.
    #[test]
    fn counters_match_model_for_any_interleaving(
        ops in proptest::collection::vec((0usize..4, op_strategy()), 0..200)
    ) {
        let (registry, counters, clock) = fixture();
        let sessions: Vec<SessionId> = (0..4).map(|_| SessionId::new()).collect();

        // Model state: which sessions have an open transaction, plus
        // expected totals.
        let mut open = [false; 4];
        let mut started = 0u64;
        let mut committed = 0u64;
        let mut aborted = 0u64;

        for (idx, op) in ops {
            let session = sessions[idx];
            match op {
                Op::Start => {
                    let state = registry.get_or_create(session);
                    let result = state.lock().start(&counters, &clock);
                    if open[idx] {
                        prop_assert!(result.is_err());
                    } else {
                        prop_assert!(result.is_ok());
                        open[idx] = true;
                        started += 1;
                    }
                }
                Op::Commit => {
                    let state = registry.get_or_create(session);
                    let result = state.lock().commit(&counters);
                    if open[idx] {
                        prop_assert!(result.is_ok());
                        open[idx] = false;
                        committed += 1;
                    } else {
                        prop_assert!(result.is_err());
                    }
                }
                Op::Abort => {
                    let state = registry.get_or_create(session);
                    let result = state.lock().abort(AbortCause::Client, &counters);
                    if open[idx] {
                        prop_assert!(result.is_ok());
                        open[idx] = false;
                        aborted += 1;
                    } else {
                        prop_assert!(result.is_err());
                    }
                }
                Op::Remove => {
                    registry.remove(session);
                    if open[idx] {
                        open[idx] = false;
                        aborted += 1;
                    }
                }
            }

            let snap = counters.snapshot();
            prop_assert!(snap.is_balanced());
            prop_assert_eq!(snap.total_started, started);
            prop_assert_eq!(snap.total_committed, committed);
            prop_assert_eq!(snap.total_aborted, aborted);
            prop_assert_eq!(
                snap.current_open,
                open.iter().filter(|o| **o).count() as u64
            );
        }
    }
}
