//! Concurrent counter with a follow-up chain and an effect runner.
//!
//! Run with `RUST_LOG=statestore=debug cargo run --example counter` to see
//! the store's commit log.

use statestore::{ReduceError, Reducer, Reduction, Store};
use std::thread;
use stillwater::effect::BoxedEffect;
use stillwater::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Clone, PartialEq, Debug, Default)]
struct Counter {
    count: i64,
    last_fetch: Option<i64>,
}

#[derive(Debug)]
enum CounterAction {
    Increment,
    Reset,
    /// Increment twice through follow-ups.
    Double,
    Fetched(i64),
    Overflow,
}

fn reducer() -> Reducer<Counter, CounterAction> {
    Reducer::new(|state: &Counter, action| match action {
        CounterAction::Increment => Ok(Reduction::new(Counter {
            count: state.count + 1,
            ..state.clone()
        })),
        CounterAction::Reset => Ok(Reduction::new(Counter::default())),
        CounterAction::Double => Ok(Reduction::unchanged(state)
            .then(CounterAction::Increment)
            .then(CounterAction::Increment)),
        CounterAction::Fetched(n) => Ok(Reduction::new(Counter {
            last_fetch: Some(n),
            ..state.clone()
        })),
        CounterAction::Overflow => Err(ReduceError::rejected("overflow requested")),
    })
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let store = Store::builder()
        .initial(Counter::default())
        .reducer(reducer())
        .name("counter")
        .build()
        .expect("store should build inside the runtime");

    let mut updates = store.subscribe();
    let mut errors = store.subscribe_errors();

    tokio::spawn(async move {
        while let Some(state) = updates.recv().await {
            println!("committed: {state:?}");
        }
    });
    tokio::spawn(async move {
        while let Some(failure) = errors.recv().await {
            println!("failed: {failure}");
        }
    });

    let callers: Vec<_> = (0..4)
        .map(|_| {
            let dispatcher = store.dispatcher();
            thread::spawn(move || {
                for _ in 0..5 {
                    dispatcher
                        .dispatch(CounterAction::Increment)
                        .expect("store is open");
                }
            })
        })
        .collect();
    for caller in callers {
        caller.join().expect("caller thread panicked");
    }

    store
        .dispatch(CounterAction::Double)
        .expect("store is open");
    store
        .dispatch(CounterAction::Overflow)
        .expect("store is open");

    let fetch: BoxedEffect<i64, String, ()> = pure(42).boxed();
    store
        .dispatcher()
        .perform_or(fetch.map(CounterAction::Fetched), &(), |_| CounterAction::Reset)
        .await
        .expect("store is open");

    let done = store
        .wait_for(|s| s.count == 22 && s.last_fetch.is_some())
        .await
        .expect("store is still open");
    println!("final: {done:?}");
    let stats = serde_json::to_string_pretty(&store.stats()).unwrap_or_default();
    println!("stats: {stats}");
}
