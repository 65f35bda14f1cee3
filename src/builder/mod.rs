//! Builder API for ergonomic store construction.
//!
//! This module provides a fluent builder for creating stores with custom
//! configuration while keeping construction errors explicit.

pub mod error;
pub mod store;

pub use error::BuildError;
pub use store::StoreBuilder;
