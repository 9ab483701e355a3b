//! In-memory task document store backing the API server.
//!
//! Thread-safe via [`RwLock`]. Queries are evaluated with the shared
//! predicate/ordering semantics from `taskdeck-proto`, so the server
//! filters and sorts exactly the way clients expect a document store to.

use std::collections::HashMap;

use taskdeck_proto::query::StoreQuery;
use taskdeck_proto::task::{Task, TaskDocument, TaskId, TaskUpdate};
use tokio::sync::RwLock;

/// In-memory collection of task documents keyed by id.
#[derive(Default)]
pub struct TaskStore {
    docs: RwLock<HashMap<TaskId, Task>>,
}

impl TaskStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    /// Whether the store holds no documents.
    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }

    /// Evaluates a query, returning matching tasks in query order.
    pub async fn query(&self, query: &StoreQuery) -> Vec<Task> {
        let docs = self.docs.read().await;
        let mut tasks: Vec<Task> = docs.values().filter(|t| query.matches(t)).cloned().collect();
        drop(docs);
        query.sort(&mut tasks);
        tasks
    }

    /// Inserts a new document under a freshly minted id.
    pub async fn insert(&self, document: TaskDocument) -> Task {
        let task = document.into_task(TaskId::mint());
        let mut docs = self.docs.write().await;
        docs.insert(task.id.clone(), task.clone());
        task
    }

    /// Merges an update into the matching document.
    ///
    /// Absent optional fields were omitted from the write, so the stored
    /// values are left untouched. Returns `false` when no document has
    /// the given id.
    pub async fn update(&self, update: TaskUpdate) -> bool {
        let mut docs = self.docs.write().await;
        let Some(task) = docs.get_mut(&update.id) else {
            return false;
        };
        task.title = update.title;
        task.status = update.status;
        task.updated_date = update.updated_date;
        if let Some(description) = update.description {
            task.description = Some(description);
        }
        if let Some(due_date) = update.due_date {
            task.due_date = Some(due_date);
        }
        true
    }

    /// Removes a document, returning `false` when it did not exist.
    pub async fn delete(&self, id: &TaskId) -> bool {
        let mut docs = self.docs.write().await;
        docs.remove(id).is_some()
    }
}
