//! HTTP implementation of the document store.
//!
//! Talks to the `/api/v1/tasks` API: list as `GET` with query
//! parameters, create as `POST`, update as `PUT`, delete as `DELETE`
//! with an id body. Non-2xx responses carry a JSON `{ "message": … }`
//! body which is mapped onto [`StoreError`].

use std::time::Duration;

use reqwest::StatusCode;
use taskdeck_proto::query::{Field, Predicate, SortDirection, SortKey, StoreQuery};
use taskdeck_proto::task::{
    DeleteTaskRequest, ErrorResponse, Task, TaskDocument, TaskId, TaskSortBy, TaskUpdate,
};
use url::Url;

use super::{DocumentStore, StoreError};

/// Path of the task collection endpoint, relative to the API base URL.
const TASKS_PATH: &str = "api/v1/tasks";

/// Document store backed by the HTTP task API.
pub struct HttpStore {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpStore {
    /// Creates a store for the API rooted at `base` with the given
    /// request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Network`] if the base URL cannot host the
    /// task endpoint path or the HTTP client cannot be constructed.
    pub fn new(base: &Url, timeout: Duration) -> Result<Self, StoreError> {
        let endpoint = base
            .join(TASKS_PATH)
            .map_err(|e| StoreError::Network(format!("invalid API base URL: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;
        Ok(Self { client, endpoint })
    }

    /// Translates a composed query into the list endpoint's parameters.
    ///
    /// The query shape is the one [`crate::query::build_query`] produces:
    /// the owner and status equality predicates become `userId`/`status`,
    /// the search disjunction's lower bound is the lowered term itself,
    /// and a non-default sort key becomes `sortBy`.
    fn list_params(query: &StoreQuery) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        for predicate in &query.predicates {
            match predicate {
                Predicate::Eq { field: Field::UserId, value } => {
                    params.push(("userId", value.clone()));
                }
                Predicate::Eq { field: Field::Status, value } => {
                    params.push(("status", value.clone()));
                }
                Predicate::AnyOf(branches) => {
                    if let Some(Predicate::Range { lower, .. }) = branches.first() {
                        params.push(("searchTerm", lower.clone()));
                    }
                }
                Predicate::Eq { .. } | Predicate::Range { .. } => {}
            }
        }
        if let Some(sort) = query.order_by.first().and_then(|k| sort_param(*k)) {
            params.push(("sortBy", sort.as_str().to_string()));
        }
        params
    }

    /// Maps a non-2xx response onto a [`StoreError`].
    async fn error_from(resp: reqwest::Response) -> StoreError {
        let status = resp.status();
        let message = resp
            .json::<ErrorResponse>()
            .await
            .map_or_else(|_| status.to_string(), |body| body.message);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::PermissionDenied,
            StatusCode::NOT_FOUND => StoreError::NotFound(message),
            _ => StoreError::Rejected {
                status: status.as_u16(),
                message,
            },
        }
    }
}

/// The `sortBy` wire value for a sort key, or `None` for the default
/// ordering (which the server applies when the parameter is absent).
fn sort_param(key: SortKey) -> Option<TaskSortBy> {
    match (key.field, key.direction) {
        (Field::Title, SortDirection::Ascending) => Some(TaskSortBy::TitleAsc),
        (Field::Title, SortDirection::Descending) => Some(TaskSortBy::TitleDesc),
        (Field::DueDate, SortDirection::Ascending) => Some(TaskSortBy::DueDateAsc),
        (Field::DueDate, SortDirection::Descending) => Some(TaskSortBy::DueDateDesc),
        (Field::UpdatedDate, SortDirection::Ascending) => Some(TaskSortBy::UpdatedDateAsc),
        _ => None,
    }
}

impl DocumentStore for HttpStore {
    async fn get_many(&self, query: &StoreQuery) -> Result<Vec<Task>, StoreError> {
        let params = Self::list_params(query);
        tracing::debug!(params = params.len(), "listing tasks");
        let resp = self
            .client
            .get(self.endpoint.clone())
            .query(&params)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(Self::error_from(resp).await);
        }
        resp.json::<Vec<Task>>()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))
    }

    async fn add(&self, doc: TaskDocument) -> Result<Task, StoreError> {
        tracing::debug!(user_id = %doc.user_id, "creating task");
        let resp = self
            .client
            .post(self.endpoint.clone())
            .json(&doc)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(Self::error_from(resp).await);
        }
        resp.json::<Task>()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))
    }

    async fn update(&self, update: TaskUpdate) -> Result<(), StoreError> {
        tracing::debug!(id = %update.id, "updating task");
        let resp = self
            .client
            .put(self.endpoint.clone())
            .json(&update)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(Self::error_from(resp).await);
        }
        Ok(())
    }

    async fn delete(&self, id: &TaskId) -> Result<(), StoreError> {
        tracing::debug!(id = %id, "deleting task");
        let resp = self
            .client
            .delete(self.endpoint.clone())
            .json(&DeleteTaskRequest { id: id.clone() })
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(Self::error_from(resp).await);
        }
        Ok(())
    }
}
