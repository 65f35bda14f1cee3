//! Core store types and logic.
//!
//! This module contains the pure functional core of the store:
//! - State and action bounds via the `State` and `Action` traits
//! - Transition functions via `Reducer`
//! - Transition output via `Reduction`
//!
//! All logic in this module is pure (no side effects), following
//! the "pure core, imperative shell" philosophy.

mod reducer;
mod state;

pub use reducer::{ReduceError, Reducer, Reduction};
pub use state::{Action, State};
