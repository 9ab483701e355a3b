//! `TaskDeck` API server library.
//!
//! Exposes the task API server for use in tests and embedding. The
//! server re-validates and re-sanitizes every write and stamps the
//! authoritative timestamps, so a hostile or buggy client cannot bypass
//! the payload invariants.

pub mod api;
pub mod config;
pub mod store;
