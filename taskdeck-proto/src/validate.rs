//! Payload validation for task writes.
//!
//! Every create or update is validated here before any store call is
//! made: either the whole payload passes or the operation is rejected —
//! there are no partial writes. Checks run in a fixed order and the
//! first failure wins.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::sanitize::sanitize;
use crate::task::{TaskId, TaskStatus};

/// Why a task payload was rejected before reaching the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Title missing or blank after trimming.
    #[error("task title must be a non-empty string")]
    InvalidTitle,
    /// Status outside the closed `TO_DO` / `IN_PROGRESS` / `DONE` set.
    #[error("task status must be one of TO_DO, IN_PROGRESS, DONE")]
    InvalidStatus,
    /// Task id missing or blank after trimming.
    #[error("task id must be a non-empty string")]
    InvalidId,
}

/// A task payload as it arrives from the form layer.
///
/// `status` is a raw string here on purpose: the UI cannot be trusted to
/// produce only closed-enum values, so parsing it is part of validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    /// Proposed title.
    pub title: String,
    /// Proposed description, if any.
    pub description: Option<String>,
    /// Proposed status as a wire string.
    pub status: String,
    /// Proposed due date, if any.
    pub due_date: Option<DateTime<Utc>>,
}

/// A payload that passed validation; status is now a typed enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTask {
    /// Title as submitted (not yet sanitized).
    pub title: String,
    /// Description as submitted (not yet sanitized).
    pub description: Option<String>,
    /// Parsed status.
    pub status: TaskStatus,
    /// Due date as submitted.
    pub due_date: Option<DateTime<Utc>>,
}

impl ValidTask {
    /// Strips markup from the free-text fields.
    ///
    /// The title is always sanitized; a description is sanitized whenever
    /// present.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.title = sanitize(&self.title);
        self.description = self.description.map(|d| sanitize(&d));
        self
    }
}

/// Validates a task payload: title first, then status.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidTitle`] for a blank title, or
/// [`ValidationError::InvalidStatus`] for a status outside the enum.
pub fn validate(form: &TaskForm) -> Result<ValidTask, ValidationError> {
    if form.title.trim().is_empty() {
        return Err(ValidationError::InvalidTitle);
    }
    let status = TaskStatus::parse_wire(&form.status).ok_or(ValidationError::InvalidStatus)?;
    Ok(ValidTask {
        title: form.title.clone(),
        description: form.description.clone(),
        status,
        due_date: form.due_date,
    })
}

/// Validates a task id for update/delete, returning the trimmed id.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidId`] for a blank id.
pub fn validate_id(id: &str) -> Result<TaskId, ValidationError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidId);
    }
    Ok(TaskId::new(trimmed))
}
