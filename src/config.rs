//! Store configuration.
//!
//! Every field has a default, so partial configs deserialize cleanly:
//!
//! ```rust
//! use statestore::config::StoreConfig;
//!
//! let config = StoreConfig::from_json(r#"{ "name": "session", "capacity": 64 }"#).unwrap();
//! assert_eq!(config.name, "session");
//! assert_eq!(config.capacity, Some(64));
//! assert_eq!(config.max_follow_ups, StoreConfig::DEFAULT_MAX_FOLLOW_UPS);
//! ```

use crate::builder::BuildError;
use serde::{Deserialize, Serialize};

/// Tunables for a single store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Name used in log spans.
    pub name: String,

    /// Inbox bound. `None` is unbounded; `Some(n)` rejects dispatches with
    /// `StoreError::QueueFull` once `n` actions are waiting.
    pub capacity: Option<usize>,

    /// Maximum follow-up actions a single dispatched action may cause,
    /// counted across the whole chain it triggers.
    pub max_follow_ups: usize,
}

impl StoreConfig {
    pub const DEFAULT_NAME: &'static str = "store";
    pub const DEFAULT_MAX_FOLLOW_UPS: usize = 1024;
    /// Largest bounded inbox the channel can hold.
    pub const MAX_CAPACITY: usize = tokio::sync::Semaphore::MAX_PERMITS;

    /// Parse a config from JSON, then validate it.
    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| BuildError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check field ranges.
    pub fn validate(&self) -> Result<(), BuildError> {
        if let Some(capacity) = self.capacity {
            if capacity == 0 || capacity > Self::MAX_CAPACITY {
                return Err(BuildError::InvalidCapacity);
            }
        }
        if self.max_follow_ups == 0 {
            return Err(BuildError::InvalidConfig(
                "max_follow_ups must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: Self::DEFAULT_NAME.to_string(),
            capacity: None,
            max_follow_ups: Self::DEFAULT_MAX_FOLLOW_UPS,
        }
    }
}
