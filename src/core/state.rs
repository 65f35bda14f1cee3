//! State and Action traits for store values.
//!
//! Both are marker traits with blanket implementations: any type with the
//! right bounds is usable as a store state or action without boilerplate.

use std::fmt::Debug;

/// Trait for values held by a store.
///
/// States are immutable snapshots. The store owns the live value and hands
/// out clones, so readers can never observe a half-written state.
///
/// # Required Traits
///
/// - `Clone`: readers and subscribers receive copies
/// - `PartialEq`: no-op transitions are detected by value equality
/// - `Debug`: states are logged on commit
/// - `Send` + `Sync`: the live value is shared across threads
///
/// # Example
///
/// ```rust
/// use statestore::core::State;
///
/// #[derive(Clone, PartialEq, Debug, Default)]
/// struct Counter {
///     count: u64,
/// }
///
/// fn assert_state<S: State>() {}
/// assert_state::<Counter>();
/// ```
pub trait State: Clone + PartialEq + Debug + Send + Sync + 'static {}

impl<T> State for T where T: Clone + PartialEq + Debug + Send + Sync + 'static {}

/// Trait for messages dispatched to a store.
///
/// Actions have no identity beyond their payload: two equal actions are two
/// independent events. `Debug` is required so failed transitions can name
/// the action that caused them.
pub trait Action: Debug + Send + 'static {}

impl<T> Action for T where T: Debug + Send + 'static {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug)]
    struct Counter {
        count: u64,
    }

    #[derive(Debug)]
    enum CounterAction {
        Increment,
    }

    fn is_state<S: State>(_: &S) -> bool {
        true
    }

    fn is_action<A: Action>(_: &A) -> bool {
        true
    }

    #[test]
    fn plain_structs_are_states() {
        assert!(is_state(&Counter { count: 0 }));
        assert!(is_state(&vec![1u8, 2, 3]));
        assert!(is_state(&String::from("ready")));
    }

    #[test]
    fn plain_enums_are_actions() {
        assert!(is_action(&CounterAction::Increment));
        assert!(is_action(&42u32));
    }

    #[test]
    fn state_is_comparable() {
        let state1 = Counter { count: 1 };
        let state2 = Counter { count: 1 };
        let state3 = Counter { count: 2 };

        assert_eq!(state1, state2);
        assert_ne!(state1, state3);
    }
}
