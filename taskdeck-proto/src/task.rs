//! Task records and the JSON wire shapes of the task API.
//!
//! The store represents "no value" as field absence, never as an explicit
//! null, so every optional field carries `skip_serializing_if` — a write
//! payload must not contain a `null` placeholder the store would reject.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque store-assigned task identifier.
///
/// Carried as a string on the wire. The store mints new identifiers via
/// [`TaskId::mint`]; clients only ever hand back identifiers they received.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Wraps an existing identifier string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mints a fresh time-ordered identifier (UUID v7). Store-side only.
    #[must_use]
    pub fn mint() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Returns the string representation of this identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a task. Closed set — free-text statuses are unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Task has not been started.
    #[serde(rename = "TO_DO")]
    ToDo,
    /// Task is actively being worked on.
    #[serde(rename = "IN_PROGRESS")]
    InProgress,
    /// Task has been completed.
    #[serde(rename = "DONE")]
    Done,
}

impl TaskStatus {
    /// All statuses, in display order.
    pub const ALL: [Self; 3] = [Self::ToDo, Self::InProgress, Self::Done];

    /// The wire string for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ToDo => "TO_DO",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
        }
    }

    /// Parses a wire string, returning `None` for anything outside the enum.
    #[must_use]
    pub fn parse_wire(s: &str) -> Option<Self> {
        match s {
            "TO_DO" => Some(Self::ToDo),
            "IN_PROGRESS" => Some(Self::InProgress),
            "DONE" => Some(Self::Done),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_wire(s).ok_or(())
    }
}

/// Sort orders the list endpoint accepts via its `sortBy` parameter.
///
/// An unrecognized or absent value falls back to the default ordering
/// (`updatedDate` descending).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskSortBy {
    /// Title, A to Z.
    #[serde(rename = "TITLE_ASC")]
    TitleAsc,
    /// Title, Z to A.
    #[serde(rename = "TITLE_DESC")]
    TitleDesc,
    /// Due date, earliest first.
    #[serde(rename = "DUE_DATE_ASC")]
    DueDateAsc,
    /// Due date, latest first.
    #[serde(rename = "DUE_DATE_DESC")]
    DueDateDesc,
    /// Last updated, oldest first.
    #[serde(rename = "UPDATED_DATE_ASC")]
    UpdatedDateAsc,
    /// Last updated, newest first. The default.
    #[serde(rename = "UPDATED_DATE_DESC")]
    UpdatedDateDesc,
}

impl TaskSortBy {
    /// The wire string for this sort order.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TitleAsc => "TITLE_ASC",
            Self::TitleDesc => "TITLE_DESC",
            Self::DueDateAsc => "DUE_DATE_ASC",
            Self::DueDateDesc => "DUE_DATE_DESC",
            Self::UpdatedDateAsc => "UPDATED_DATE_ASC",
            Self::UpdatedDateDesc => "UPDATED_DATE_DESC",
        }
    }

    /// Parses a wire string, returning `None` for anything outside the enum.
    #[must_use]
    pub fn parse_wire(s: &str) -> Option<Self> {
        match s {
            "TITLE_ASC" => Some(Self::TitleAsc),
            "TITLE_DESC" => Some(Self::TitleDesc),
            "DUE_DATE_ASC" => Some(Self::DueDateAsc),
            "DUE_DATE_DESC" => Some(Self::DueDateDesc),
            "UPDATED_DATE_ASC" => Some(Self::UpdatedDateAsc),
            "UPDATED_DATE_DESC" => Some(Self::UpdatedDateDesc),
            _ => None,
        }
    }
}

/// A persisted task, as returned by the store.
///
/// `id` and `user_id` are immutable after creation; `created_date` is
/// stamped once and `updated_date` is refreshed on every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Store-assigned identifier.
    pub id: TaskId,
    /// Owner. Set from the session at creation, never user-editable.
    pub user_id: String,
    /// Task title. Non-empty after trimming for any persisted task.
    pub title: String,
    /// Optional free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Current status.
    pub status: TaskStatus,
    /// Optional due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    /// When the task was created.
    pub created_date: DateTime<Utc>,
    /// When the task was last mutated.
    pub updated_date: DateTime<Utc>,
}

/// The write shape of a task: everything except the store-assigned id.
///
/// Sent as the `POST /api/v1/tasks` body and handed to document stores'
/// `add` operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDocument {
    /// Owner of the new task.
    pub user_id: String,
    /// Task title, already validated and sanitized.
    pub title: String,
    /// Optional description; omitted from the payload when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Initial status.
    pub status: TaskStatus,
    /// Optional due date; omitted from the payload when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    /// Creation timestamp stamped by the repository.
    pub created_date: DateTime<Utc>,
    /// Mutation timestamp stamped by the repository.
    pub updated_date: DateTime<Utc>,
}

impl TaskDocument {
    /// Combines this document with a store-assigned id into a full [`Task`].
    #[must_use]
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            status: self.status,
            due_date: self.due_date,
            created_date: self.created_date,
            updated_date: self.updated_date,
        }
    }
}

/// The mutable-field replacement sent as the `PUT /api/v1/tasks` body.
///
/// Deliberately has no `user_id` or `created_date`: ownership and identity
/// are never part of an update's mutable field set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    /// Which task to update.
    pub id: TaskId,
    /// Replacement title, already validated and sanitized.
    pub title: String,
    /// Replacement description; omitted when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Replacement status.
    pub status: TaskStatus,
    /// Replacement due date; omitted when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    /// New mutation timestamp stamped by the repository.
    pub updated_date: DateTime<Utc>,
}

/// The `DELETE /api/v1/tasks` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTaskRequest {
    /// Which task to delete.
    pub id: TaskId,
}

/// JSON error body carried by non-2xx API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable failure description.
    pub message: String,
}
