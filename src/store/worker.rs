//! The serialized worker: the only code that mutates a store's state.

use super::dispatcher::Outbox;
use super::error::TransitionFailure;
use super::Shared;
use crate::core::{Action, ReduceError, Reducer, Reduction, State};
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

pub(crate) struct Worker<S: State, A: Action> {
    pub(crate) shared: Arc<Shared<S>>,
    pub(crate) reducer: Reducer<S, A>,
    pub(crate) current: watch::Sender<S>,
    pub(crate) inbox: Outbox<A>,
    pub(crate) max_follow_ups: usize,
    pub(crate) next_sequence: u64,
}

impl<S: State, A: Action> Worker<S, A> {
    /// Process actions until every `Store` handle is gone and the inbox is
    /// drained.
    pub(crate) async fn run(mut self) {
        debug!("worker started");
        while let Some(action) = self.inbox.recv().await {
            self.process(action);
        }
        debug!("worker stopped");
    }

    /// Apply one inbox action and the whole chain of follow-ups it causes.
    ///
    /// Follow-ups run breadth-first in emission order, before the next inbox
    /// action is taken.
    pub(crate) fn process(&mut self, action: A) {
        let mut pending = VecDeque::from([action]);
        let mut budget = self.max_follow_ups;
        let mut first = true;

        while let Some(action) = pending.pop_front() {
            if !first {
                self.shared.counters.record_follow_ups(1);
            }
            first = false;

            let follow_ups = self.apply(action);
            if follow_ups.len() > budget {
                let dropped = follow_ups.len() + pending.len();
                self.overflow(dropped);
                return;
            }
            budget -= follow_ups.len();
            pending.extend(follow_ups);
        }
    }

    /// One Idle -> Applying -> Idle cycle. Returns the follow-ups to queue.
    fn apply(&mut self, action: A) -> Vec<A> {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.shared.applying.store(true, Ordering::Release);

        let described = format!("{action:?}");
        let result = {
            let current = self.current.borrow();
            self.reducer.reduce(&current, action)
        };

        let follow_ups = match result {
            Ok(Reduction { state, follow_ups }) => {
                self.commit(sequence, state);
                follow_ups
            }
            Err(error) => {
                warn!(sequence, action = %described, %error, "transition failed");
                self.fail(sequence, described, error);
                Vec::new()
            }
        };

        self.shared.applying.store(false, Ordering::Release);
        follow_ups
    }

    fn commit(&self, sequence: u64, state: S) {
        if *self.current.borrow() == state {
            debug!(sequence, "no-op transition suppressed");
            self.shared.counters.record_suppressed();
            return;
        }

        debug!(sequence, ?state, "commit");
        let current = &self.current;
        let counters = &self.shared.counters;
        self.shared.states.publish_after(&state, || {
            current.send_replace(state.clone());
            counters.record_commit(Utc::now());
        });
    }

    fn fail(&self, sequence: u64, action: String, error: ReduceError) {
        self.shared.counters.record_failed();
        self.shared.errors.publish(&TransitionFailure {
            sequence,
            action,
            error,
            failed_at: Utc::now(),
        });
    }

    fn overflow(&self, dropped: usize) {
        let limit = self.max_follow_ups;
        warn!(limit, dropped, "follow-up limit exceeded");
        self.shared.counters.record_dropped_follow_ups(dropped);

        let sequence = self.next_sequence.saturating_sub(1);
        self.fail(
            sequence,
            "<follow-up chain>".to_string(),
            ReduceError::FollowUpLimit { limit },
        );
    }
}

impl<S: State, A: Action> Drop for Worker<S, A> {
    // Also runs when the runtime drops the task without finishing `run`.
    fn drop(&mut self) {
        self.shared.states.close();
        self.shared.errors.close();
    }
}
