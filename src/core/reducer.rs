//! Pure transition functions.
//!
//! A [`Reducer`] maps `(state, action)` to a [`Reduction`]: the next state
//! plus any follow-up actions to apply afterwards. Reducers never touch the
//! live store; side effects are expressed as follow-up actions.

use super::state::{Action, State};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors a transition can report instead of producing a state.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ReduceError {
    /// The reducer refused the action for the given state.
    #[error("Transition rejected: {reason}")]
    Rejected { reason: String },

    /// A single dispatch caused more follow-up actions than allowed.
    #[error("Follow-up limit of {limit} actions exceeded; remaining follow-ups dropped")]
    FollowUpLimit { limit: usize },
}

impl ReduceError {
    /// Build a [`ReduceError::Rejected`] from any displayable reason.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }
}

/// Output of a single transition.
///
/// Follow-ups are applied in the order they were added, each after the
/// state of this reduction has been committed.
#[derive(Clone, Debug, PartialEq)]
pub struct Reduction<S, A> {
    pub state: S,
    pub follow_ups: Vec<A>,
}

impl<S, A> Reduction<S, A> {
    /// Move to `state` with no follow-ups.
    pub fn new(state: S) -> Self {
        Self {
            state,
            follow_ups: Vec::new(),
        }
    }

    /// Queue one follow-up action after this transition.
    pub fn then(mut self, action: A) -> Self {
        self.follow_ups.push(action);
        self
    }

    /// Queue several follow-up actions, keeping their order.
    pub fn then_all(mut self, actions: impl IntoIterator<Item = A>) -> Self {
        self.follow_ups.extend(actions);
        self
    }
}

impl<S: Clone, A> Reduction<S, A> {
    /// Keep the current state. Committing an equal state notifies nobody.
    pub fn unchanged(state: &S) -> Self {
        Self::new(state.clone())
    }
}

type ReduceFn<S, A> = dyn Fn(&S, A) -> Result<Reduction<S, A>, ReduceError> + Send + Sync;

/// Pure transition function bound to a store for its whole lifetime.
///
/// # Example
///
/// ```rust
/// use statestore::core::{Reducer, Reduction};
///
/// #[derive(Clone, PartialEq, Debug)]
/// struct Counter { count: u64 }
///
/// #[derive(Debug)]
/// enum CounterAction { Increment }
///
/// let reducer = Reducer::infallible(|state: &Counter, action: CounterAction| match action {
///     CounterAction::Increment => Reduction::new(Counter { count: state.count + 1 }),
/// });
///
/// let next = reducer.reduce(&Counter { count: 0 }, CounterAction::Increment).unwrap();
/// assert_eq!(next.state, Counter { count: 1 });
/// assert!(next.follow_ups.is_empty());
/// ```
pub struct Reducer<S: State, A: Action> {
    reduce: Box<ReduceFn<S, A>>,
}

impl<S: State, A: Action> Reducer<S, A> {
    /// Create a reducer from a fallible pure function.
    ///
    /// Returning `Err` leaves the store's state unchanged; the error is
    /// delivered to error subscribers instead.
    pub fn new<F>(reduce: F) -> Self
    where
        F: Fn(&S, A) -> Result<Reduction<S, A>, ReduceError> + Send + Sync + 'static,
    {
        Reducer {
            reduce: Box::new(reduce),
        }
    }

    /// Create a reducer from a pure function that cannot fail.
    pub fn infallible<F>(reduce: F) -> Self
    where
        F: Fn(&S, A) -> Reduction<S, A> + Send + Sync + 'static,
    {
        Self::new(move |state, action| Ok(reduce(state, action)))
    }

    /// Apply the transition function.
    pub fn reduce(&self, state: &S, action: A) -> Result<Reduction<S, A>, ReduceError> {
        (self.reduce)(state, action)
    }
}

impl<S: State, A: Action> std::fmt::Debug for Reducer<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reducer").finish_non_exhaustive()
    }
}
