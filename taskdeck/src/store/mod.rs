//! Document-store abstraction for the task collection.
//!
//! Defines the [`DocumentStore`] trait the repository talks to. Concrete
//! implementations:
//! - [`memory::MemoryStore`] — in-process store for tests and offline use
//! - [`http::HttpStore`] — client for the `/api/v1/tasks` HTTP API

pub mod http;
pub mod memory;

pub use http::HttpStore;
pub use memory::MemoryStore;

use taskdeck_proto::query::StoreQuery;
use taskdeck_proto::task::{Task, TaskDocument, TaskId, TaskUpdate};

/// Errors raised by a document store.
///
/// The repository propagates these unmodified; nothing below it retries.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached or the transfer failed.
    #[error("store request failed: {0}")]
    Network(String),

    /// The store's access rules denied the operation.
    #[error("permission denied by the store")]
    PermissionDenied,

    /// No document matched the given identifier.
    #[error("document not found: {0}")]
    NotFound(String),

    /// The store rejected the request for any other reason.
    #[error("store rejected the request ({status}): {message}")]
    Rejected {
        /// HTTP-style status code.
        status: u16,
        /// Failure description from the store.
        message: String,
    },
}

/// Async CRUD-plus-query contract of the remote task collection.
///
/// Implementations never validate or sanitize — that happens in the
/// repository before a payload gets here. Writes receive payloads whose
/// absent optional fields are genuinely absent, not null placeholders.
pub trait DocumentStore: Send + Sync {
    /// Executes a composed query and returns matching tasks in query order.
    fn get_many(
        &self,
        query: &StoreQuery,
    ) -> impl std::future::Future<Output = Result<Vec<Task>, StoreError>> + Send;

    /// Adds a new document, returning the full task including the
    /// store-assigned id.
    fn add(
        &self,
        doc: TaskDocument,
    ) -> impl std::future::Future<Output = Result<Task, StoreError>> + Send;

    /// Replaces the mutable fields of an existing task.
    fn update(
        &self,
        update: TaskUpdate,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Hard-deletes a task by id.
    fn delete(
        &self,
        id: &TaskId,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
