//! End-to-end scenarios for concurrent use of a store.

use statestore::{Phase, ReduceError, Reducer, Reduction, Store, StoreError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::time::timeout;

#[derive(Clone, PartialEq, Debug)]
struct Counter {
    count: u64,
}

#[derive(Clone, Debug)]
enum CounterAction {
    Increment,
    Bad,
    Spread(Vec<CounterAction>),
}

fn counter_reducer() -> Reducer<Counter, CounterAction> {
    Reducer::new(|state: &Counter, action| match action {
        CounterAction::Increment => Ok(Reduction::new(Counter {
            count: state.count + 1,
        })),
        CounterAction::Bad => Err(ReduceError::rejected("bad")),
        CounterAction::Spread(actions) => Ok(Reduction::unchanged(state).then_all(actions)),
    })
}

const WAIT: Duration = Duration::from_secs(10);

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn three_concurrent_increments() {
    let store = Store::new(Counter { count: 0 }, counter_reducer()).unwrap();
    let mut updates = store.subscribe();

    let callers: Vec<_> = (0..3)
        .map(|_| {
            let store = store.clone();
            thread::spawn(move || store.dispatch(CounterAction::Increment))
        })
        .collect();
    for caller in callers {
        caller.join().unwrap().unwrap();
    }

    let mut seen = Vec::new();
    for _ in 0..3 {
        seen.push(timeout(WAIT, updates.recv()).await.unwrap().unwrap());
    }

    assert_eq!(
        seen,
        vec![
            Counter { count: 1 },
            Counter { count: 2 },
            Counter { count: 3 }
        ]
    );
    assert_eq!(store.read(), Counter { count: 3 });
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_callers_lose_no_updates() {
    const CALLERS: u64 = 16;
    const PER_CALLER: u64 = 50;
    let total = CALLERS * PER_CALLER;

    let store = Store::new(Counter { count: 0 }, counter_reducer()).unwrap();
    let mut updates = store.subscribe();

    let callers: Vec<_> = (0..CALLERS)
        .map(|_| {
            let dispatcher = store.dispatcher();
            thread::spawn(move || {
                for _ in 0..PER_CALLER {
                    dispatcher.dispatch(CounterAction::Increment).unwrap();
                }
            })
        })
        .collect();
    for caller in callers {
        caller.join().unwrap();
    }

    for expected in 1..=total {
        let state = timeout(WAIT, updates.recv()).await.unwrap().unwrap();
        assert_eq!(state.count, expected);
    }
    assert_eq!(store.read().count, total);
    assert_eq!(store.stats().accepted, total);
    assert_eq!(store.stats().committed, total);
}

#[tokio::test]
async fn bad_action_reaches_error_observer_only() {
    let store = Store::new(Counter { count: 0 }, counter_reducer()).unwrap();
    let mut updates = store.subscribe();
    let mut errors = store.subscribe_errors();

    store.dispatch(CounterAction::Bad).unwrap();
    drop(store);

    let failure = errors.recv().await.unwrap();
    assert_eq!(failure.error, ReduceError::rejected("bad"));
    assert_eq!(errors.recv().await, None);
    assert_eq!(updates.recv().await, None);
}

#[tokio::test]
async fn follow_ups_commit_after_their_parent_in_order() {
    let store = Store::new(Counter { count: 0 }, counter_reducer()).unwrap();
    let mut updates = store.subscribe();

    store
        .dispatch(CounterAction::Spread(vec![
            CounterAction::Increment,
            CounterAction::Bad,
            CounterAction::Increment,
        ]))
        .unwrap();
    store.dispatch(CounterAction::Increment).unwrap();
    drop(store);

    let mut seen = Vec::new();
    while let Some(state) = updates.recv().await {
        seen.push(state.count);
    }
    assert_eq!(seen, vec![1, 2, 3]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancelled_subscriber_sees_nothing_committed_later() {
    let store = Store::new(Counter { count: 0 }, counter_reducer()).unwrap();
    let mut cancelled = store.subscribe();
    let mut active = store.subscribe();

    store.dispatch(CounterAction::Increment).unwrap();
    assert_eq!(
        timeout(WAIT, active.recv()).await.unwrap(),
        Some(Counter { count: 1 })
    );

    let handle = cancelled.cancel_handle();
    thread::spawn(move || handle.cancel()).join().unwrap();

    store.dispatch(CounterAction::Increment).unwrap();
    assert_eq!(
        timeout(WAIT, active.recv()).await.unwrap(),
        Some(Counter { count: 2 })
    );

    assert!(cancelled.is_cancelled());
    assert_eq!(cancelled.recv().await, None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reads_never_observe_partial_state() {
    #[derive(Clone, PartialEq, Debug)]
    struct Pair {
        left: u64,
        right: u64,
    }

    let reducer = Reducer::infallible(|pair: &Pair, _: ()| {
        Reduction::new(Pair {
            left: pair.left + 1,
            right: pair.right + 1,
        })
    });
    let store = Arc::new(Store::new(Pair { left: 0, right: 0 }, reducer).unwrap());

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..2_000 {
                    let pair = store.read();
                    assert_eq!(pair.left, pair.right);
                }
            })
        })
        .collect();

    for _ in 0..500 {
        store.dispatch(()).unwrap();
    }
    for reader in readers {
        reader.join().unwrap();
    }

    let done = timeout(WAIT, store.wait_for(|p| p.left == 500))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(done, Pair { left: 500, right: 500 });
}

#[tokio::test]
async fn dispatch_after_teardown_is_reported() {
    let store = Store::new(Counter { count: 0 }, counter_reducer()).unwrap();
    let dispatcher = store.dispatcher();
    drop(store);

    assert!(dispatcher.is_closed());
    assert_eq!(
        dispatcher.dispatch(CounterAction::Increment),
        Err(StoreError::Closed)
    );
}

#[test]
fn phase_becomes_closed_when_worker_exits() {
    let runtime_store = {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let store = Store::builder()
            .initial(Counter { count: 0 })
            .reducer(counter_reducer())
            .runtime(runtime.handle().clone())
            .build()
            .unwrap();
        assert_eq!(store.phase(), Phase::Idle);
        // Dropping the runtime at the end of this block drops the worker.
        store
    };

    assert_eq!(runtime_store.phase(), Phase::Closed);
    assert_eq!(
        runtime_store.dispatch(CounterAction::Increment),
        Err(StoreError::Closed)
    );
    assert_eq!(runtime_store.read(), Counter { count: 0 });
}
