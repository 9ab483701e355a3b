//! Session-scoped local task cache.
//!
//! Holds the in-memory working copy of the signed-in user's tasks,
//! mutated optimistically after each successful store write and rebuilt
//! on every session or filter change. Exposes a derived, debounced,
//! client-side filtered view for search.

pub mod debounce;
pub mod list;

pub use debounce::Debouncer;
pub use list::{CacheState, TaskListCache};

use thiserror::Error;

use crate::repo::TaskError;

/// Errors a cache operation can surface.
#[derive(Debug, Error)]
pub enum CacheError {
    /// A mutation or refresh was attempted with no signed-in user.
    #[error("no authenticated user")]
    NotAuthenticated,

    /// A repository failure; the in-memory collection is unchanged.
    #[error(transparent)]
    Task(#[from] TaskError),
}
