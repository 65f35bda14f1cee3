//! Property-based tests for the store.
//!
//! These tests use proptest to check that whatever sequence of actions is
//! dispatched, subscribers observe exactly what a sequential application of
//! the reducer would commit.

use proptest::prelude::*;
use statestore::{ReduceError, Reducer, Reduction, Store};
use std::collections::VecDeque;

#[derive(Clone, PartialEq, Debug)]
struct Tally {
    total: i64,
    steps: u32,
}

#[derive(Clone, Debug)]
enum Op {
    Add(i64),
    Noop,
    Bad,
    Chain(Vec<i64>),
}

fn tally_reducer() -> Reducer<Tally, Op> {
    Reducer::new(|state: &Tally, op| match op {
        Op::Add(0) => Ok(Reduction::unchanged(state)),
        Op::Add(n) => Ok(Reduction::new(Tally {
            total: state.total + n,
            steps: state.steps + 1,
        })),
        Op::Noop => Ok(Reduction::unchanged(state)),
        Op::Bad => Err(ReduceError::rejected("bad op")),
        Op::Chain(values) => {
            Ok(Reduction::unchanged(state).then_all(values.into_iter().map(Op::Add)))
        }
    })
}

/// Apply `ops` one at a time, follow-ups breadth-first, recording every
/// state that differs from its predecessor.
fn sequential_commits(ops: &[Op]) -> (Vec<Tally>, usize) {
    let reducer = tally_reducer();
    let mut state = Tally { total: 0, steps: 0 };
    let mut commits = Vec::new();
    let mut failures = 0;

    for op in ops {
        let mut pending = VecDeque::from([op.clone()]);
        while let Some(op) = pending.pop_front() {
            match reducer.reduce(&state, op) {
                Ok(reduction) => {
                    if reduction.state != state {
                        state = reduction.state;
                        commits.push(state.clone());
                    }
                    pending.extend(reduction.follow_ups);
                }
                Err(_) => failures += 1,
            }
        }
    }
    (commits, failures)
}

prop_compose! {
    fn arbitrary_op()(
        variant in 0..4u8,
        n in -5i64..5,
        chain in prop::collection::vec(-5i64..5, 0..4)
    ) -> Op {
        match variant {
            0 => Op::Add(n),
            1 => Op::Noop,
            2 => Op::Bad,
            _ => Op::Chain(chain),
        }
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

/// Dispatch `ops`, drop the store and collect everything observed.
fn observed_commits(ops: Vec<Op>) -> (Vec<Tally>, usize) {
    runtime().block_on(async move {
        let store = Store::new(Tally { total: 0, steps: 0 }, tally_reducer()).unwrap();
        let mut updates = store.subscribe();
        let mut errors = store.subscribe_errors();

        for op in ops {
            store.dispatch(op).unwrap();
        }
        drop(store);

        let mut commits = Vec::new();
        while let Some(state) = updates.recv().await {
            commits.push(state);
        }
        let mut failures = 0;
        while errors.recv().await.is_some() {
            failures += 1;
        }
        (commits, failures)
    })
}

proptest! {
    #[test]
    fn commits_match_sequential_application(ops in prop::collection::vec(arbitrary_op(), 0..30)) {
        let (expected, expected_failures) = sequential_commits(&ops);
        let (observed, failures) = observed_commits(ops);

        prop_assert_eq!(observed, expected);
        prop_assert_eq!(failures, expected_failures);
    }

    #[test]
    fn consecutive_notifications_always_differ(ops in prop::collection::vec(arbitrary_op(), 0..30)) {
        let (observed, _) = observed_commits(ops);

        for pair in observed.windows(2) {
            prop_assert_ne!(&pair[0], &pair[1]);
        }
    }

    #[test]
    fn noop_only_sequences_notify_nobody(count in 0usize..20) {
        let ops = vec![Op::Noop; count];
        let (observed, failures) = observed_commits(ops);

        prop_assert!(observed.is_empty());
        prop_assert_eq!(failures, 0);
    }

    #[test]
    fn each_commit_counts_one_step(ops in prop::collection::vec(arbitrary_op(), 0..30)) {
        let (observed, _) = observed_commits(ops);

        for (i, state) in observed.iter().enumerate() {
            prop_assert_eq!(state.steps as usize, i + 1);
        }
    }
}
