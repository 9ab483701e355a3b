//! Task repository: the validated, sanitized CRUD contract.
//!
//! Every write runs the full pipeline — validate, sanitize, omit absent
//! optionals, stamp lifecycle timestamps — before touching the store.
//! Validation failures surface before any store call is made; store
//! failures propagate unmodified and are never retried here.

use chrono::Utc;
use taskdeck_proto::task::{Task, TaskDocument, TaskUpdate};
use taskdeck_proto::validate::{TaskForm, ValidationError, validate, validate_id};

use crate::query::{TaskFilters, build_query};
use crate::store::{DocumentStore, StoreError};

/// Errors a repository operation can surface.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// The payload was rejected before any store call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The store failed; propagated unmodified.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The create/read/update/delete contract against a document store.
pub struct TaskRepository<S> {
    store: S,
}

impl<S: DocumentStore> TaskRepository<S> {
    /// Wraps a document store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Fetches one user's tasks matching the given filters, in store
    /// (query) order.
    ///
    /// # Errors
    ///
    /// Propagates any [`StoreError`] from the store.
    pub async fn fetch(&self, user_id: &str, filters: &TaskFilters) -> Result<Vec<Task>, StoreError> {
        let query = build_query(user_id, filters);
        tracing::debug!(user_id, predicates = query.predicates.len(), "fetching tasks");
        self.store.get_many(&query).await
    }

    /// Creates a task owned by `user_id`, returning the stored record
    /// including the store-assigned id and stamped timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Validation`] — with no store call issued —
    /// for a blank title or out-of-enum status, or [`TaskError::Store`]
    /// if the write fails.
    pub async fn create(&self, user_id: &str, form: &TaskForm) -> Result<Task, TaskError> {
        let valid = validate(form)?.sanitized();
        let now = Utc::now();
        let doc = TaskDocument {
            user_id: user_id.to_string(),
            title: valid.title,
            description: valid.description,
            status: valid.status,
            due_date: valid.due_date,
            created_date: now,
            updated_date: now,
        };
        tracing::debug!(user_id, "creating task");
        Ok(self.store.add(doc).await?)
    }

    /// Replaces the mutable fields of the task with the given id and
    /// refreshes its `updatedDate`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Validation`] — id checked first, then
    /// title/status — with no store call issued, or [`TaskError::Store`]
    /// if the write fails.
    pub async fn update(&self, id: &str, form: &TaskForm) -> Result<(), TaskError> {
        let update = prepare_update(id, form)?;
        self.apply_update(update).await?;
        Ok(())
    }

    /// Sends an already-prepared update to the store.
    pub(crate) async fn apply_update(&self, update: TaskUpdate) -> Result<(), StoreError> {
        tracing::debug!(id = %update.id, "updating task");
        self.store.update(update).await
    }

    /// Hard-deletes the task with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Validation`] with [`ValidationError::InvalidId`]
    /// for a blank id — with no store call issued — or [`TaskError::Store`]
    /// if the delete fails.
    pub async fn delete(&self, id: &str) -> Result<(), TaskError> {
        let id = validate_id(id)?;
        tracing::debug!(id = %id, "deleting task");
        Ok(self.store.delete(&id).await?)
    }
}

/// Validates and sanitizes an update payload, stamping a fresh
/// `updatedDate`. Shared with the cache's optimistic merge so both sides
/// apply identical fields.
pub(crate) fn prepare_update(id: &str, form: &TaskForm) -> Result<TaskUpdate, ValidationError> {
    let id = validate_id(id)?;
    let valid = validate(form)?.sanitized();
    Ok(TaskUpdate {
        id,
        title: valid.title,
        description: valid.description,
        status: valid.status,
        due_date: valid.due_date,
        updated_date: Utc::now(),
    })
}
