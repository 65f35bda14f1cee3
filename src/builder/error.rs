//! Build errors for store construction.

use thiserror::Error;

/// Errors that can occur when building a store.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("Reducer not specified. Call .reducer(reducer) before .build()")]
    MissingReducer,

    #[error("No tokio runtime available. Build inside a runtime or call .runtime(handle)")]
    NoRuntime,

    #[error("Inbox capacity must be between 1 and StoreConfig::MAX_CAPACITY; use None for an unbounded inbox")]
    InvalidCapacity,

    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),
}
