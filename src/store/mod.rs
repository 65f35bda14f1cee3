//! The state container: a serialized worker around a pure reducer.
//!
//! This module is the "imperative shell" around the pure core. A [`Store`]
//! owns the current state, applies one action at a time on a dedicated
//! tokio task, and publishes each committed state to subscribers.
//!
//! # Guarantees
//!
//! 1. At most one transition is computed at any instant per store.
//! 2. [`Store::read`] only ever returns a fully committed state.
//! 3. Subscribers are notified after the state is committed, in commit
//!    order, with no gaps.
//! 4. Transitions producing an equal state notify nobody.
//! 5. Follow-up actions run after the transition that emitted them, in
//!    emission order, and see its committed state.

mod container;
mod dispatcher;
mod error;
mod observer;
mod stats;
mod worker;

pub use container::{Phase, Store};
pub use dispatcher::Dispatcher;
pub use error::{StoreError, TransitionFailure};
pub use observer::{CancelHandle, Subscription};
pub use stats::StoreStats;

use crate::core::State;
use observer::Registry;
use stats::Counters;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

/// State shared between store handles and the worker.
pub(crate) struct Shared<S: State> {
    id: Uuid,
    name: String,
    current: watch::Receiver<S>,
    states: Arc<Registry<S>>,
    errors: Arc<Registry<TransitionFailure>>,
    counters: Arc<Counters>,
    applying: AtomicBool,
}
