//! Store handle.

use super::dispatcher::{self, Dispatcher, Inbox};
use super::error::{StoreError, TransitionFailure};
use super::observer::{Registry, Subscription};
use super::stats::{Counters, StoreStats};
use super::worker::Worker;
use super::Shared;
use crate::builder::{BuildError, StoreBuilder};
use crate::config::StoreConfig;
use crate::core::{Action, Reducer, State};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{info_span, Instrument};
use uuid::Uuid;

/// What the store is doing right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No transition in flight.
    Idle,
    /// A transition is being computed. `read` still returns the last
    /// committed state.
    Applying,
    /// The worker has exited.
    Closed,
}

/// Serialized, observable state container.
///
/// Cloning a `Store` yields another handle to the same container. The
/// worker finishes queued actions and exits once every handle is dropped.
///
/// # Example
///
/// ```rust
/// use statestore::core::{Reducer, Reduction};
/// use statestore::Store;
///
/// #[derive(Clone, PartialEq, Debug)]
/// struct Counter { count: u64 }
///
/// #[derive(Debug)]
/// enum CounterAction { Increment }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let reducer = Reducer::infallible(|state: &Counter, action| match action {
///     CounterAction::Increment => Reduction::new(Counter { count: state.count + 1 }),
/// });
/// let store = Store::new(Counter { count: 0 }, reducer).unwrap();
///
/// store.dispatch(CounterAction::Increment).unwrap();
/// let state = store.wait_for(|s| s.count == 1).await.unwrap();
/// assert_eq!(state, Counter { count: 1 });
/// assert_eq!(store.read(), Counter { count: 1 });
/// # }
/// ```
pub struct Store<S: State, A: Action> {
    shared: Arc<Shared<S>>,
    inbox: Inbox<A>,
}

impl<S: State, A: Action> Store<S, A> {
    /// Create a store with default configuration on the current tokio
    /// runtime.
    pub fn new(initial: S, reducer: Reducer<S, A>) -> Result<Self, BuildError> {
        StoreBuilder::new().initial(initial).reducer(reducer).build()
    }

    /// Start a builder for a configured store.
    pub fn builder() -> StoreBuilder<S, A> {
        StoreBuilder::new()
    }

    pub(crate) fn spawn(
        initial: S,
        reducer: Reducer<S, A>,
        config: StoreConfig,
        runtime: &Handle,
    ) -> Self {
        let id = Uuid::new_v4();
        let (current_tx, current_rx) = watch::channel(initial);
        let (inbox, outbox) = dispatcher::inbox(config.capacity);

        let shared = Arc::new(Shared {
            id,
            name: config.name,
            current: current_rx,
            states: Registry::new(),
            errors: Registry::new(),
            counters: Arc::new(Counters::default()),
            applying: AtomicBool::new(false),
        });

        let span = info_span!("store", name = %shared.name, %id);
        let worker = Worker {
            shared: Arc::clone(&shared),
            reducer,
            current: current_tx,
            inbox: outbox,
            max_follow_ups: config.max_follow_ups,
            next_sequence: 0,
        };
        runtime.spawn(worker.run().instrument(span));

        Self { shared, inbox }
    }

    /// The most recently committed state.
    pub fn read(&self) -> S {
        self.shared.current.borrow().clone()
    }

    /// Enqueue `action` and return immediately.
    ///
    /// Actions from one caller are applied in the order they were
    /// dispatched. Fails only if the store is closed or a bounded inbox is
    /// full.
    pub fn dispatch(&self, action: A) -> Result<(), StoreError> {
        dispatcher::send(&self.inbox, &self.shared.counters, action)
    }

    /// A dispatch-only capability that does not keep the store alive.
    pub fn dispatcher(&self) -> Dispatcher<A> {
        Dispatcher::new(&self.inbox, Arc::clone(&self.shared.counters))
    }

    /// Observe every state committed after this call.
    pub fn subscribe(&self) -> Subscription<S> {
        self.shared.states.subscribe()
    }

    /// Observe every transition failure after this call.
    pub fn subscribe_errors(&self) -> Subscription<TransitionFailure> {
        self.shared.errors.subscribe()
    }

    /// Resolve with the first state satisfying `predicate`, starting from
    /// the state current at this call and then every later commit in order.
    ///
    /// Commits are tracked from the moment this is called, not from the
    /// first poll, so intermediate states are never skipped. Returns
    /// [`StoreError::Closed`] if the worker exits before the predicate holds.
    pub fn wait_for<F>(&self, mut predicate: F) -> impl Future<Output = Result<S, StoreError>>
    where
        F: FnMut(&S) -> bool,
    {
        let current = &self.shared.current;
        let (mut updates, state) = self
            .shared
            .states
            .subscribe_with(|| current.borrow().clone());

        async move {
            if predicate(&state) {
                return Ok(state);
            }
            while let Some(state) = updates.recv().await {
                if predicate(&state) {
                    return Ok(state);
                }
            }
            Err(StoreError::Closed)
        }
    }

    /// Snapshot of the store's counters.
    pub fn stats(&self) -> StoreStats {
        self.shared.counters.snapshot()
    }

    /// Whether the worker is idle, applying a transition, or gone.
    pub fn phase(&self) -> Phase {
        if self.shared.current.has_changed().is_err() {
            Phase::Closed
        } else if self.shared.applying.load(Ordering::Acquire) {
            Phase::Applying
        } else {
            Phase::Idle
        }
    }

    /// Unique id, also recorded on the store's log span.
    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    /// Configured name, used in log spans.
    pub fn name(&self) -> &str {
        &self.shared.name
    }
}

impl<S: State, A: Action> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            inbox: self.inbox.clone(),
        }
    }
}

impl<S: State, A: Action> std::fmt::Debug for Store<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.shared.name)
            .field("id", &self.shared.id)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}
