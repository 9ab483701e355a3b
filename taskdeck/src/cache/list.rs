//! The session-scoped task list and its optimistic mutation rules.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use taskdeck_proto::task::Task;
use taskdeck_proto::validate::{TaskForm, validate_id};
use tokio::sync::watch;

use super::{CacheError, Debouncer};
use crate::query::TaskFilters;
use crate::repo::{TaskError, TaskRepository, prepare_update};
use crate::session::{AuthSession, UserIdentity};
use crate::store::DocumentStore;

/// Lifecycle of the cached collection for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// No session, or no fetch attempted yet.
    Empty,
    /// A fetch is in flight.
    Loading,
    /// The collection reflects the last applied fetch.
    Loaded,
}

struct Inner {
    state: CacheState,
    tasks: Vec<Task>,
    user_id: Option<String>,
    filters: TaskFilters,
}

/// In-memory ordered task collection for the current user.
///
/// Mutations are optimistic in the no-rollback sense: the local change
/// is applied only after the store confirms the write, so a failure
/// leaves the collection untouched. Fetch responses carry a monotonic
/// sequence number and are discarded when a newer response has already
/// been applied or the session user has changed since the fetch was
/// issued — a slow fetch resolving after sign-out never repopulates the
/// cache.
pub struct TaskListCache<S> {
    repo: TaskRepository<S>,
    inner: RwLock<Inner>,
    fetch_seq: AtomicU64,
    applied_seq: AtomicU64,
    search: Debouncer,
}

impl<S: DocumentStore> TaskListCache<S> {
    /// Creates an empty cache over the given repository with the given
    /// search settle delay.
    #[must_use]
    pub fn new(repo: TaskRepository<S>, search_delay: Duration) -> Self {
        Self {
            repo,
            inner: RwLock::new(Inner {
                state: CacheState::Empty,
                tasks: Vec::new(),
                user_id: None,
                filters: TaskFilters::default(),
            }),
            fetch_seq: AtomicU64::new(0),
            applied_seq: AtomicU64::new(0),
            search: Debouncer::new(search_delay),
        }
    }

    /// The repository this cache mutates through.
    pub const fn repo(&self) -> &TaskRepository<S> {
        &self.repo
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> CacheState {
        self.inner.read().state
    }

    /// Snapshot of the base collection, in store order.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.inner.read().tasks.clone()
    }

    /// Current filters.
    #[must_use]
    pub fn filters(&self) -> TaskFilters {
        self.inner.read().filters.clone()
    }

    /// Records a session change. Returns `true` when a new user took
    /// over and the collection needs a fetch.
    ///
    /// Sign-out clears the collection synchronously — no store call.
    /// A new user empties the collection; [`attach`](Self::attach) (or
    /// a caller handling the returned flag) follows up with
    /// [`refresh`](Self::refresh). An unchanged user is a no-op.
    pub fn set_session(&self, user: Option<&UserIdentity>) -> bool {
        let mut inner = self.inner.write();
        match user {
            None => {
                tracing::debug!("session cleared, emptying task cache");
                inner.user_id = None;
                inner.tasks.clear();
                inner.state = CacheState::Empty;
                inner.filters = TaskFilters::default();
                self.search.reset();
                false
            }
            Some(identity) if inner.user_id.as_deref() != Some(identity.uid.as_str()) => {
                inner.user_id = Some(identity.uid.clone());
                inner.tasks.clear();
                inner.state = CacheState::Empty;
                true
            }
            Some(_) => false,
        }
    }

    /// Follows a session subscription until the sender side closes:
    /// every change is recorded via [`set_session`](Self::set_session),
    /// and a change to a new authenticated user drives the fetch. The
    /// session current at attach time is applied first. Returns the
    /// follower task's handle.
    pub fn attach(
        self: &Arc<Self>,
        mut rx: watch::Receiver<AuthSession>,
    ) -> tokio::task::JoinHandle<()>
    where
        S: 'static,
    {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                let session = rx.borrow_and_update().clone();
                if cache.set_session(session.user.as_ref()) {
                    if let Err(e) = cache.refresh().await {
                        tracing::warn!(error = %e, "fetch after session change failed");
                    }
                }
                if rx.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    /// Fetches the current user's tasks and replaces the collection.
    ///
    /// Stale responses — superseded by a newer applied fetch, or issued
    /// for a user who has since signed out — are discarded.
    ///
    /// # Errors
    ///
    /// [`CacheError::NotAuthenticated`] with no session; otherwise any
    /// repository error, with the collection left unchanged.
    pub async fn refresh(&self) -> Result<(), CacheError> {
        let (user_id, filters, prev_state, seq) = {
            let mut inner = self.inner.write();
            let Some(user_id) = inner.user_id.clone() else {
                return Err(CacheError::NotAuthenticated);
            };
            let prev = inner.state;
            inner.state = CacheState::Loading;
            // Claimed under the lock: sequence order must match issue order.
            let seq = self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;
            (user_id, inner.filters.clone(), prev, seq)
        };

        match self.repo.fetch(&user_id, &filters).await {
            Ok(tasks) => {
                let mut inner = self.inner.write();
                let session_matches = inner.user_id.as_deref() == Some(user_id.as_str());
                if session_matches && seq > self.applied_seq.load(Ordering::SeqCst) {
                    self.applied_seq.store(seq, Ordering::SeqCst);
                    inner.tasks = tasks;
                    inner.state = CacheState::Loaded;
                } else {
                    tracing::debug!(seq, "discarding stale fetch response");
                }
                Ok(())
            }
            Err(e) => {
                let mut inner = self.inner.write();
                if inner.user_id.as_deref() == Some(user_id.as_str())
                    && inner.state == CacheState::Loading
                {
                    inner.state = prev_state;
                }
                Err(TaskError::Store(e).into())
            }
        }
    }

    /// Replaces the filters and refetches.
    ///
    /// # Errors
    ///
    /// Same as [`refresh`](Self::refresh).
    pub async fn set_filters(&self, filters: TaskFilters) -> Result<(), CacheError> {
        self.inner.write().filters = filters;
        self.refresh().await
    }

    /// Submits a search keystroke.
    ///
    /// Returns `false` when the term was superseded by a newer
    /// keystroke before settling. A settled term recomputes the derived
    /// view only; it does not touch the base collection. Callers who
    /// also want the store to narrow the next fetch put the term into
    /// the filters via [`set_filters`](Self::set_filters), which uses
    /// prefix matching rather than this view's substring matching.
    pub async fn search(&self, term: &str) -> bool {
        self.search.submit(term).await
    }

    /// Creates a task and prepends it to the collection.
    ///
    /// # Errors
    ///
    /// [`CacheError::NotAuthenticated`] with no session; otherwise any
    /// repository error, with the collection left unchanged.
    pub async fn create(&self, form: &TaskForm) -> Result<Task, CacheError> {
        let user_id = self
            .inner
            .read()
            .user_id
            .clone()
            .ok_or(CacheError::NotAuthenticated)?;
        let task = self.repo.create(&user_id, form).await.map_err(CacheError::Task)?;
        let mut inner = self.inner.write();
        if inner.user_id.as_deref() == Some(user_id.as_str()) {
            inner.tasks.insert(0, task.clone());
        }
        Ok(task)
    }

    /// Updates a task and merges the submitted fields into the matching
    /// in-memory record.
    ///
    /// # Errors
    ///
    /// Any repository error, with the collection left unchanged.
    pub async fn update(&self, id: &str, form: &TaskForm) -> Result<(), CacheError> {
        let update = prepare_update(id, form).map_err(TaskError::Validation)?;
        self.repo
            .apply_update(update.clone())
            .await
            .map_err(|e| CacheError::Task(TaskError::Store(e)))?;

        let mut inner = self.inner.write();
        if let Some(task) = inner.tasks.iter_mut().find(|t| t.id == update.id) {
            task.title = update.title;
            task.status = update.status;
            task.updated_date = update.updated_date;
            // Same merge rule as the store: absent optionals keep their
            // previous value.
            if let Some(description) = update.description {
                task.description = Some(description);
            }
            if let Some(due_date) = update.due_date {
                task.due_date = Some(due_date);
            }
        }
        Ok(())
    }

    /// Deletes a task and removes the matching in-memory record.
    ///
    /// # Errors
    ///
    /// Any repository error, with the collection left unchanged.
    pub async fn delete(&self, id: &str) -> Result<(), CacheError> {
        let task_id = validate_id(id).map_err(TaskError::Validation)?;
        self.repo.delete(id).await.map_err(CacheError::Task)?;
        self.inner.write().tasks.retain(|t| t.id != task_id);
        Ok(())
    }

    /// The derived search view: the base collection narrowed by the
    /// status filter and the *settled* search term, matched
    /// case-insensitively as a substring of title or description.
    #[must_use]
    pub fn filtered(&self) -> Vec<Task> {
        let inner = self.inner.read();
        let term = self.search.settled().to_lowercase();
        inner
            .tasks
            .iter()
            .filter(|task| {
                if let Some(status) = inner.filters.status {
                    if task.status != status {
                        return false;
                    }
                }
                if term.is_empty() {
                    return true;
                }
                task.title.to_lowercase().contains(&term)
                    || task
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&term))
            })
            .cloned()
            .collect()
    }
}
