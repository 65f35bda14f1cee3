//! Effect execution outside the serialized core, using Stillwater 0.11.0.
//!
//! Reducers stay pure: they never perform I/O. When a transition needs
//! something done (a network call, a timer), an external collaborator runs
//! it as a Stillwater effect and reports the outcome back through a
//! [`Dispatcher`] as a result-bearing action.
//!
//! # Key Concepts
//!
//! - **Effects**: built with `pure()`, `fail()`, `from_fn()` and run against
//!   an environment
//! - **Dispatcher**: the narrow capability that feeds results back in
//! - **Errors**: either returned to the caller or mapped into an action
//!
//! # Example
//!
//! ```rust
//! use statestore::core::{Reducer, Reduction};
//! use statestore::Store;
//! use stillwater::effect::BoxedEffect;
//! use stillwater::prelude::*;
//!
//! #[derive(Debug)]
//! enum Fetch {
//!     Loaded(u32),
//!     Failed(String),
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let reducer = Reducer::infallible(|_: &Option<u32>, action: Fetch| match action {
//!     Fetch::Loaded(n) => Reduction::new(Some(n)),
//!     Fetch::Failed(_) => Reduction::new(None),
//! });
//! let store = Store::new(None, reducer).unwrap();
//!
//! let effect: BoxedEffect<u32, String, ()> = pure(42).boxed();
//! store
//!     .dispatcher()
//!     .perform_or(effect.map(Fetch::Loaded), &(), Fetch::Failed)
//!     .await
//!     .unwrap();
//!
//! assert_eq!(store.wait_for(Option::is_some).await.unwrap(), Some(42));
//! # }
//! ```

use crate::core::Action;
use crate::store::{Dispatcher, StoreError};
use stillwater::effect::Effect;
use stillwater::prelude::*;
use thiserror::Error;
use tracing::debug;

/// Why [`Dispatcher::perform`] did not deliver an action.
#[derive(Debug, Error)]
pub enum EffectError<E> {
    /// The effect itself failed.
    #[error("Effect failed: {0}")]
    Effect(E),

    /// The effect succeeded but the store refused its result.
    #[error(transparent)]
    Store(StoreError),
}

impl<A: Action> Dispatcher<A> {
    /// Run `effect` against `env` and dispatch the action it produces.
    ///
    /// The effect runs on the caller's task, never on the store's worker.
    pub async fn perform<Eff>(
        &self,
        effect: Eff,
        env: &Eff::Env,
    ) -> Result<(), EffectError<Eff::Error>>
    where
        Eff: Effect<Output = A>,
    {
        let action = effect.run(env).await.map_err(EffectError::Effect)?;
        self.dispatch(action).map_err(EffectError::Store)
    }

    /// Run `effect` and dispatch its result, or the action `on_error` maps a
    /// failure to.
    pub async fn perform_or<Eff, F>(
        &self,
        effect: Eff,
        env: &Eff::Env,
        on_error: F,
    ) -> Result<(), StoreError>
    where
        Eff: Effect<Output = A>,
        F: FnOnce(Eff::Error) -> A,
    {
        let action = match effect.run(env).await {
            Ok(action) => action,
            Err(error) => {
                let action = on_error(error);
                debug!(?action, "effect failed; dispatching error action");
                action
            }
        };
        self.dispatch(action)
    }
}
