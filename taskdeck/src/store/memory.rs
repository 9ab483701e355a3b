//! In-process document store.
//!
//! Evaluates [`StoreQuery`] with the reference semantics from
//! `taskdeck-proto` over a plain map. Used by unit tests and offline
//! demos; supports injected latency and one-shot failures so cache
//! ordering and error paths can be exercised deterministically.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use taskdeck_proto::query::StoreQuery;
use taskdeck_proto::task::{Task, TaskDocument, TaskId, TaskUpdate};

use super::{DocumentStore, StoreError};

/// In-memory task collection with store-assigned ids.
#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<HashMap<TaskId, Task>>,
    latency: RwLock<Duration>,
    fail_next: Mutex<Option<StoreError>>,
    operations: AtomicU64,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    /// Whether the store holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    /// Number of store operations issued so far, including failed ones.
    #[must_use]
    pub fn operations(&self) -> u64 {
        self.operations.load(Ordering::SeqCst)
    }

    /// Makes the next operation fail with the given error.
    pub fn inject_error(&self, error: StoreError) {
        *self.fail_next.lock() = Some(error);
    }

    /// Delays every operation by `latency` (drives the paused-clock
    /// stale-fetch tests).
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.write() = latency;
    }

    /// Returns a task by id, if present.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<Task> {
        self.docs.read().get(id).cloned()
    }

    async fn begin_op(&self) -> Result<(), StoreError> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        let latency = *self.latency.read();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if let Some(error) = self.fail_next.lock().take() {
            return Err(error);
        }
        Ok(())
    }
}

impl DocumentStore for MemoryStore {
    async fn get_many(&self, query: &StoreQuery) -> Result<Vec<Task>, StoreError> {
        self.begin_op().await?;
        let mut tasks: Vec<Task> = self
            .docs
            .read()
            .values()
            .filter(|t| query.matches(t))
            .cloned()
            .collect();
        query.sort(&mut tasks);
        Ok(tasks)
    }

    async fn add(&self, doc: TaskDocument) -> Result<Task, StoreError> {
        self.begin_op().await?;
        let task = doc.into_task(TaskId::mint());
        self.docs.write().insert(task.id.clone(), task.clone());
        Ok(task)
    }

    async fn update(&self, update: TaskUpdate) -> Result<(), StoreError> {
        self.begin_op().await?;
        let mut docs = self.docs.write();
        let task = docs
            .get_mut(&update.id)
            .ok_or_else(|| StoreError::NotFound(update.id.to_string()))?;
        task.title = update.title;
        task.status = update.status;
        task.updated_date = update.updated_date;
        // Absent optional fields were omitted from the write: the stored
        // value is left untouched, matching document-merge semantics.
        if let Some(description) = update.description {
            task.description = Some(description);
        }
        if let Some(due_date) = update.due_date {
            task.due_date = Some(due_date);
        }
        Ok(())
    }

    async fn delete(&self, id: &TaskId) -> Result<(), StoreError> {
        self.begin_op().await?;
        self.docs
            .write()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}
