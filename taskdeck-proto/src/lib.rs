//! Shared model, query, and input-hygiene types for Taskdeck.
//!
//! This crate defines everything both sides of the task API agree on:
//! the [`task::Task`] record and its wire DTOs, the [`query::StoreQuery`]
//! AST the client composes and the store evaluates, the markup-stripping
//! [`sanitize::sanitize`] function, and the payload [`validate`] rules
//! that must hold before any write reaches the store.

pub mod query;
pub mod sanitize;
pub mod task;
pub mod validate;
