//! HTTP surface of the task API.
//!
//! Routes mirror the document-store operations one-to-one:
//!
//! - `GET /api/v1/tasks?userId=&status=&searchTerm=&sortBy=`
//! - `POST /api/v1/tasks` with a task-without-id body, returns 201 + the
//!   created task
//! - `PUT /api/v1/tasks` with a partial task including `id`, returns 200
//! - `DELETE /api/v1/tasks` with `{id}`, returns 200
//!
//! Every write is re-validated and re-sanitized here and the timestamps
//! are stamped server-side; whatever the client claimed is discarded.
//! Unrecognized `status` or `sortBy` filter values are ignored rather
//! than rejected, so an old client talking to a newer server degrades to
//! an unfiltered listing instead of failing.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use taskdeck_proto::query::{
    Field, PREFIX_SENTINEL, Predicate, SortDirection, SortKey, StoreQuery,
};
use taskdeck_proto::task::{
    DeleteTaskRequest, ErrorResponse, Task, TaskDocument, TaskId, TaskSortBy, TaskStatus,
    TaskUpdate,
};
use taskdeck_proto::validate::{TaskForm, ValidationError, validate, validate_id};

use crate::store::TaskStore;

/// Why an API request was rejected.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The write payload failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A listing was requested without an owner.
    #[error("userId query parameter is required")]
    MissingUserId,

    /// The referenced task does not exist.
    #[error("no task with id {0}")]
    NotFound(TaskId),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::Validation(_) | Self::MissingUserId => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        };
        let body = ErrorResponse {
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Builds the API router over a shared store.
pub fn router(store: Arc<TaskStore>) -> Router {
    Router::new()
        .route(
            "/api/v1/tasks",
            get(list_tasks)
                .post(create_task)
                .put(update_task)
                .delete(delete_task),
        )
        .with_state(store)
}

/// Starts the API server on the given address.
///
/// Returns the bound address (useful with port 0) and the join handle of
/// the serving task.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn serve(
    addr: &str,
    store: Arc<TaskStore>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let app = router(store);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "task api server error");
        }
    });

    Ok((bound_addr, handle))
}

/// Query parameters accepted by the listing endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
    user_id: Option<String>,
    status: Option<String>,
    search_term: Option<String>,
    sort_by: Option<String>,
}

async fn list_tasks(
    State(store): State<Arc<TaskStore>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let user_id = params.user_id.as_deref().ok_or(ApiError::MissingUserId)?;
    let query = compose_query(user_id, &params);
    let tasks = store.query(&query).await;
    tracing::debug!(user_id, count = tasks.len(), "listed tasks");
    Ok(Json(tasks))
}

/// A create payload as it arrives on the wire.
///
/// `status` stays a raw string so that an out-of-range value is reported
/// as a validation failure instead of a deserialization error. Client
/// timestamp claims are not part of this struct and are dropped.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTaskPayload {
    user_id: String,
    title: String,
    description: Option<String>,
    status: String,
    due_date: Option<DateTime<Utc>>,
}

async fn create_task(
    State(store): State<Arc<TaskStore>>,
    Json(payload): Json<CreateTaskPayload>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let form = TaskForm {
        title: payload.title,
        description: payload.description,
        status: payload.status,
        due_date: payload.due_date,
    };
    let valid = validate(&form)?.sanitized();

    let now = Utc::now();
    let task = store
        .insert(TaskDocument {
            user_id: payload.user_id,
            title: valid.title,
            description: valid.description,
            status: valid.status,
            due_date: valid.due_date,
            created_date: now,
            updated_date: now,
        })
        .await;
    tracing::debug!(id = %task.id, "created task");
    Ok((StatusCode::CREATED, Json(task)))
}

/// An update payload as it arrives on the wire.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateTaskPayload {
    id: String,
    title: String,
    description: Option<String>,
    status: String,
    due_date: Option<DateTime<Utc>>,
}

async fn update_task(
    State(store): State<Arc<TaskStore>>,
    Json(payload): Json<UpdateTaskPayload>,
) -> Result<StatusCode, ApiError> {
    // Id first, then the rest of the payload, matching the client's
    // validation order so both ends report the same first failure.
    let id = validate_id(&payload.id)?;
    let form = TaskForm {
        title: payload.title,
        description: payload.description,
        status: payload.status,
        due_date: payload.due_date,
    };
    let valid = validate(&form)?.sanitized();

    let update = TaskUpdate {
        id: id.clone(),
        title: valid.title,
        description: valid.description,
        status: valid.status,
        due_date: valid.due_date,
        updated_date: Utc::now(),
    };
    if !store.update(update).await {
        return Err(ApiError::NotFound(id));
    }
    tracing::debug!(id = %id, "updated task");
    Ok(StatusCode::OK)
}

async fn delete_task(
    State(store): State<Arc<TaskStore>>,
    Json(payload): Json<DeleteTaskRequest>,
) -> Result<StatusCode, ApiError> {
    let id = validate_id(payload.id.as_str())?;
    if !store.delete(&id).await {
        return Err(ApiError::NotFound(id));
    }
    tracing::debug!(id = %id, "deleted task");
    Ok(StatusCode::OK)
}

/// Composes the store query for a listing request.
///
/// Unrecognized `status` and `sortBy` values fall through to no status
/// filter and the default ordering.
fn compose_query(user_id: &str, params: &ListParams) -> StoreQuery {
    let mut predicates = vec![Predicate::Eq {
        field: Field::UserId,
        value: user_id.to_string(),
    }];

    if let Some(status) = params.status.as_deref().and_then(TaskStatus::parse_wire) {
        predicates.push(Predicate::Eq {
            field: Field::Status,
            value: status.as_str().to_string(),
        });
    }

    if let Some(term) = params.search_term.as_deref() {
        let term = term.trim().to_lowercase();
        if !term.is_empty() {
            let upper = format!("{term}{PREFIX_SENTINEL}");
            predicates.push(Predicate::AnyOf(vec![
                Predicate::Range {
                    field: Field::Title,
                    lower: term.clone(),
                    upper: upper.clone(),
                },
                Predicate::Range {
                    field: Field::Description,
                    lower: term,
                    upper,
                },
            ]));
        }
    }

    let order_by = match params.sort_by.as_deref().and_then(TaskSortBy::parse_wire) {
        Some(TaskSortBy::TitleAsc) => SortKey {
            field: Field::Title,
            direction: SortDirection::Ascending,
        },
        Some(TaskSortBy::TitleDesc) => SortKey {
            field: Field::Title,
            direction: SortDirection::Descending,
        },
        Some(TaskSortBy::DueDateAsc) => SortKey {
            field: Field::DueDate,
            direction: SortDirection::Ascending,
        },
        Some(TaskSortBy::DueDateDesc) => SortKey {
            field: Field::DueDate,
            direction: SortDirection::Descending,
        },
        Some(TaskSortBy::UpdatedDateAsc) => SortKey {
            field: Field::UpdatedDate,
            direction: SortDirection::Ascending,
        },
        Some(TaskSortBy::UpdatedDateDesc) | None => SortKey {
            field: Field::UpdatedDate,
            direction: SortDirection::Descending,
        },
    };

    StoreQuery {
        predicates,
        order_by: vec![order_by],
    }
}
