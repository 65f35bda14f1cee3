//! Builder for constructing stores.

use crate::builder::error::BuildError;
use crate::config::StoreConfig;
use crate::core::{Action, ReduceError, Reducer, Reduction, State};
use crate::store::Store;
use tokio::runtime::Handle;

/// Builder for constructing stores with a fluent API.
pub struct StoreBuilder<S: State, A: Action> {
    initial: Option<S>,
    reducer: Option<Reducer<S, A>>,
    config: StoreConfig,
    runtime: Option<Handle>,
}

impl<S: State, A: Action> StoreBuilder<S, A> {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            initial: None,
            reducer: None,
            config: StoreConfig::default(),
            runtime: None,
        }
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Bind the transition function (required).
    pub fn reducer(mut self, reducer: Reducer<S, A>) -> Self {
        self.reducer = Some(reducer);
        self
    }

    /// Build a reducer from a fallible closure and bind it.
    pub fn reduce_with<F>(self, reduce: F) -> Self
    where
        F: Fn(&S, A) -> Result<Reduction<S, A>, ReduceError> + Send + Sync + 'static,
    {
        self.reducer(Reducer::new(reduce))
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Name used in log spans.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Bound the inbox; dispatches beyond it are rejected.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = Some(capacity);
        self
    }

    /// Cap the follow-up chain a single dispatch may cause.
    pub fn max_follow_ups(mut self, limit: usize) -> Self {
        self.config.max_follow_ups = limit;
        self
    }

    /// Spawn the worker on this runtime instead of the current one.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Build the store and start its worker.
    /// Returns an error if required fields are missing or the config is
    /// invalid.
    pub fn build(self) -> Result<Store<S, A>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;
        let reducer = self.reducer.ok_or(BuildError::MissingReducer)?;
        self.config.validate()?;

        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| BuildError::NoRuntime)?,
        };

        Ok(Store::spawn(initial, reducer, self.config, &runtime))
    }
}

impl<S: State, A: Action> Default for StoreBuilder<S, A> {
    fn default() -> Self {
        Self::new()
    }
}
