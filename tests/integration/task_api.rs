//! End-to-end tests for the HTTP task API.
//!
//! Starts a real `taskdeck-server` on an OS-assigned port and drives it
//! through the client's `HttpStore` and `TaskRepository`, covering CRUD,
//! owner scoping, filtering, search, sorting, and error surfaces.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::similar_names)]

use std::sync::Arc;
use std::time::Duration;

use taskdeck::query::TaskFilters;
use taskdeck::repo::{TaskError, TaskRepository};
use taskdeck::store::{HttpStore, StoreError};
use taskdeck_proto::task::{TaskSortBy, TaskStatus};
use taskdeck_proto::validate::{TaskForm, ValidationError};
use taskdeck_server::api;
use taskdeck_server::store::TaskStore;
use url::Url;

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Starts an in-process API server and returns a repository wired to it.
async fn start_repo() -> TaskRepository<HttpStore> {
    let store = Arc::new(TaskStore::new());
    let (addr, _handle) = api::serve("127.0.0.1:0", store)
        .await
        .expect("failed to start test server");
    let base = Url::parse(&format!("http://{addr}/")).unwrap();
    let http = HttpStore::new(&base, Duration::from_secs(5)).unwrap();
    TaskRepository::new(http)
}

fn form(title: &str, status: &str) -> TaskForm {
    TaskForm {
        title: title.to_string(),
        status: status.to_string(),
        ..TaskForm::default()
    }
}

// ---------------------------------------------------------------------------
// CRUD round trips
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_then_fetch_returns_task() {
    let repo = start_repo().await;
    let created = repo.create("u1", &form("Buy milk", "TO_DO")).await.unwrap();
    assert_eq!(created.title, "Buy milk");
    assert_eq!(created.user_id, "u1");
    assert_eq!(created.status, TaskStatus::ToDo);

    let tasks = repo.fetch("u1", &TaskFilters::default()).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, created.id);
}

#[tokio::test]
async fn server_sanitizes_markup_in_title_and_description() {
    let repo = start_repo().await;
    let mut f = form("<b>Bold</b> move", "TO_DO");
    f.description = Some("<script>alert(1)</script>plain".to_string());
    let created = repo.create("u1", &f).await.unwrap();
    assert_eq!(created.title, "Bold move");
    assert_eq!(created.description.as_deref(), Some("plain"));
}

#[tokio::test]
async fn update_changes_fields_and_bumps_timestamp() {
    let repo = start_repo().await;
    let created = repo.create("u1", &form("Draft", "TO_DO")).await.unwrap();

    repo.update(created.id.as_str(), &form("Final", "DONE"))
        .await
        .unwrap();

    let tasks = repo.fetch("u1", &TaskFilters::default()).await.unwrap();
    assert_eq!(tasks[0].title, "Final");
    assert_eq!(tasks[0].status, TaskStatus::Done);
    assert!(tasks[0].updated_date >= created.updated_date);
    assert_eq!(tasks[0].created_date, created.created_date);
}

#[tokio::test]
async fn update_keeps_absent_description() {
    let repo = start_repo().await;
    let mut f = form("Has notes", "TO_DO");
    f.description = Some("remember this".to_string());
    let created = repo.create("u1", &f).await.unwrap();

    // Update without a description: the stored one must survive.
    repo.update(created.id.as_str(), &form("Has notes", "IN_PROGRESS"))
        .await
        .unwrap();

    let tasks = repo.fetch("u1", &TaskFilters::default()).await.unwrap();
    assert_eq!(tasks[0].description.as_deref(), Some("remember this"));
}

#[tokio::test]
async fn delete_removes_task() {
    let repo = start_repo().await;
    let created = repo.create("u1", &form("Ephemeral", "TO_DO")).await.unwrap();
    repo.delete(created.id.as_str()).await.unwrap();

    let tasks = repo.fetch("u1", &TaskFilters::default()).await.unwrap();
    assert!(tasks.is_empty());
}

// ---------------------------------------------------------------------------
// Owner scoping, filters, search, sort
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_is_scoped_to_requesting_user() {
    let repo = start_repo().await;
    repo.create("u1", &form("Mine", "TO_DO")).await.unwrap();
    repo.create("u2", &form("Theirs", "TO_DO")).await.unwrap();

    let tasks = repo.fetch("u1", &TaskFilters::default()).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Mine");
}

#[tokio::test]
async fn status_filter_narrows_results() {
    let repo = start_repo().await;
    repo.create("u1", &form("Open", "TO_DO")).await.unwrap();
    repo.create("u1", &form("Finished", "DONE")).await.unwrap();

    let filters = TaskFilters {
        status: Some(TaskStatus::Done),
        ..TaskFilters::default()
    };
    let tasks = repo.fetch("u1", &filters).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Finished");
}

#[tokio::test]
async fn search_matches_title_prefix_case_insensitively() {
    let repo = start_repo().await;
    repo.create("u1", &form("Groceries", "TO_DO")).await.unwrap();
    repo.create("u1", &form("Workout", "TO_DO")).await.unwrap();

    let filters = TaskFilters {
        search_term: Some("GRO".to_string()),
        ..TaskFilters::default()
    };
    let tasks = repo.fetch("u1", &filters).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Groceries");
}

#[tokio::test]
async fn search_matches_description_prefix() {
    let repo = start_repo().await;
    let mut f = form("Chore", "TO_DO");
    f.description = Some("water the plants".to_string());
    repo.create("u1", &f).await.unwrap();
    repo.create("u1", &form("Other", "TO_DO")).await.unwrap();

    let filters = TaskFilters {
        search_term: Some("water".to_string()),
        ..TaskFilters::default()
    };
    let tasks = repo.fetch("u1", &filters).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Chore");
}

#[tokio::test]
async fn default_order_is_newest_updated_first() {
    let repo = start_repo().await;
    let first = repo.create("u1", &form("First", "TO_DO")).await.unwrap();
    let _second = repo.create("u1", &form("Second", "TO_DO")).await.unwrap();
    repo.update(first.id.as_str(), &form("First again", "TO_DO"))
        .await
        .unwrap();

    let tasks = repo.fetch("u1", &TaskFilters::default()).await.unwrap();
    assert_eq!(tasks[0].title, "First again");
}

#[tokio::test]
async fn title_sort_orders_alphabetically() {
    let repo = start_repo().await;
    repo.create("u1", &form("banana", "TO_DO")).await.unwrap();
    repo.create("u1", &form("apple", "TO_DO")).await.unwrap();
    repo.create("u1", &form("cherry", "TO_DO")).await.unwrap();

    let filters = TaskFilters {
        sort_by: Some(TaskSortBy::TitleAsc),
        ..TaskFilters::default()
    };
    let titles: Vec<String> = repo
        .fetch("u1", &filters)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, ["apple", "banana", "cherry"]);
}

#[tokio::test]
async fn due_date_sort_puts_undated_tasks_last() {
    let repo = start_repo().await;
    let mut dated = form("Dated", "TO_DO");
    dated.due_date = Some(chrono::Utc::now());
    repo.create("u1", &dated).await.unwrap();
    repo.create("u1", &form("Undated", "TO_DO")).await.unwrap();

    let filters = TaskFilters {
        sort_by: Some(TaskSortBy::DueDateAsc),
        ..TaskFilters::default()
    };
    let titles: Vec<String> = repo
        .fetch("u1", &filters)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, ["Dated", "Undated"]);
}

// ---------------------------------------------------------------------------
// Error surfaces
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_payload_is_rejected_client_side() {
    let repo = start_repo().await;
    let err = repo.create("u1", &form("", "TO_DO")).await.unwrap_err();
    assert!(matches!(
        err,
        TaskError::Validation(ValidationError::InvalidTitle)
    ));
}

#[tokio::test]
async fn update_of_unknown_task_is_not_found() {
    let repo = start_repo().await;
    let err = repo
        .update("no-such-task", &form("x", "TO_DO"))
        .await
        .unwrap_err();
    assert!(matches!(err, TaskError::Store(StoreError::NotFound(_))));
}

#[tokio::test]
async fn delete_of_unknown_task_is_not_found() {
    let repo = start_repo().await;
    let err = repo.delete("no-such-task").await.unwrap_err();
    assert!(matches!(err, TaskError::Store(StoreError::NotFound(_))));
}

#[tokio::test]
async fn server_rejects_unvalidated_write_from_raw_client() {
    // Bypass the repository's client-side validation to prove the server
    // re-validates on its own.
    let store = Arc::new(TaskStore::new());
    let (addr, _handle) = api::serve("127.0.0.1:0", store)
        .await
        .expect("failed to start test server");

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{addr}/api/v1/tasks"))
        .json(&serde_json::json!({
            "userId": "u1",
            "title": "Sneaky",
            "status": "doing it"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("status"));
}

#[tokio::test]
async fn listing_without_user_id_is_rejected() {
    let store = Arc::new(TaskStore::new());
    let (addr, _handle) = api::serve("127.0.0.1:0", store)
        .await
        .expect("failed to start test server");

    let resp = reqwest::get(format!("http://{addr}/api/v1/tasks"))
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn unknown_filter_values_are_ignored_not_rejected() {
    let store = Arc::new(TaskStore::new());
    let (addr, _handle) = api::serve("127.0.0.1:0", store)
        .await
        .expect("failed to start test server");

    let resp = reqwest::get(format!(
        "http://{addr}/api/v1/tasks?userId=u1&status=bogus&sortBy=SHOE_SIZE"
    ))
    .await
    .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn connection_failure_surfaces_as_network_error() {
    // Nothing listens on this port.
    let base = Url::parse("http://127.0.0.1:1/").unwrap();
    let http = HttpStore::new(&base, Duration::from_secs(1)).unwrap();
    let repo = TaskRepository::new(http);
    let err = repo
        .fetch("u1", &TaskFilters::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Network(_)));
}
