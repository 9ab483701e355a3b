//! Taskdeck — task-management client core library.
//!
//! Translates UI-level filter/search/sort state into document-store
//! queries, keeps an in-memory task list consistent with optimistic
//! local mutations and remote confirmations, and enforces validation
//! and sanitization before any write reaches the store.

pub mod cache;
pub mod config;
pub mod query;
pub mod repo;
pub mod session;
pub mod store;
