//! Statestore: a serialized, observable state container
//!
//! Statestore follows the "pure core, imperative shell" philosophy. The core
//! is a pure transition function (a [`Reducer`]) mapping the current state
//! and an action to the next state plus follow-up actions. The shell is a
//! [`Store`] that applies actions one at a time on a single worker task and
//! publishes every committed state to subscribers.
//!
//! # Core Concepts
//!
//! - **State**: any `Clone + PartialEq + Debug` value; equality suppresses
//!   no-op notifications
//! - **Reducer**: pure `(state, action) -> (state, follow-ups)` function
//! - **Store**: thread-safe `read`, fire-and-forget `dispatch`, and
//!   cancellable `subscribe`
//! - **Dispatcher**: dispatch-only capability for effect runners
//!
//! # Example
//!
//! ```rust
//! use statestore::{Reducer, Reduction, Store};
//!
//! #[derive(Clone, PartialEq, Debug)]
//! struct Counter {
//!     count: u64,
//! }
//!
//! #[derive(Debug)]
//! enum CounterAction {
//!     Increment,
//!     IncrementTwice,
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let reducer = Reducer::infallible(|state: &Counter, action| match action {
//!     CounterAction::Increment => Reduction::new(Counter { count: state.count + 1 }),
//!     CounterAction::IncrementTwice => Reduction::unchanged(state)
//!         .then(CounterAction::Increment)
//!         .then(CounterAction::Increment),
//! });
//!
//! let store = Store::new(Counter { count: 0 }, reducer).unwrap();
//! let mut updates = store.subscribe();
//!
//! store.dispatch(CounterAction::IncrementTwice).unwrap();
//!
//! assert_eq!(updates.recv().await, Some(Counter { count: 1 }));
//! assert_eq!(updates.recv().await, Some(Counter { count: 2 }));
//! assert_eq!(store.read(), Counter { count: 2 });
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod effects;
pub mod store;

// Re-export commonly used types
pub use builder::{BuildError, StoreBuilder};
pub use config::StoreConfig;
pub use crate::core::{Action, ReduceError, Reducer, Reduction, State};
pub use effects::EffectError;
pub use store::{
    CancelHandle, Dispatcher, Phase, Store, StoreError, StoreStats, Subscription,
    TransitionFailure,
};
