//! Store error types.

use crate::core::ReduceError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned to callers of `dispatch`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store has been torn down; the action was discarded.
    #[error("Store is closed")]
    Closed,

    /// The bounded inbox is full; the action was rejected.
    #[error("Store inbox is full (capacity {capacity})")]
    QueueFull { capacity: usize },
}

/// A transition that failed, delivered to error subscribers.
///
/// The store's state is unchanged by the failed action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionFailure {
    /// Position of the failed action in the store's processing order.
    pub sequence: u64,
    /// `Debug` rendering of the action.
    pub action: String,
    pub error: ReduceError,
    pub failed_at: DateTime<Utc>,
}

impl std::fmt::Display for TransitionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "action #{} ({}) failed: {}", self.sequence, self.action, self.error)
    }
}
