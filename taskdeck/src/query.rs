//! Composes document-store queries from UI-level filter state.
//!
//! Every query carries an equality predicate on the owner — a client
//! must never be able to compose a query that returns another user's
//! tasks — plus optional status and prefix-search predicates and a
//! deterministic ordering.

use taskdeck_proto::query::{
    Field, PREFIX_SENTINEL, Predicate, SortDirection, SortKey, StoreQuery,
};
use taskdeck_proto::task::{TaskSortBy, TaskStatus};

/// The filter/search/sort state a task list view holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilters {
    /// Only tasks in this status, when set.
    pub status: Option<TaskStatus>,
    /// Free-text search term; blank terms are treated as absent.
    pub search_term: Option<String>,
    /// Requested ordering; `None` means the default (`updatedDate` desc).
    pub sort_by: Option<TaskSortBy>,
}

/// Builds the store query for one user's task list.
///
/// The search term, when non-blank after trimming, becomes a disjunctive
/// pair of case-insensitive prefix ranges over `title` and `description`,
/// bounded by `[lower(term), lower(term) + '\u{f8ff}')`.
#[must_use]
pub fn build_query(user_id: &str, filters: &TaskFilters) -> StoreQuery {
    let mut predicates = vec![Predicate::Eq {
        field: Field::UserId,
        value: user_id.to_string(),
    }];

    if let Some(status) = filters.status {
        predicates.push(Predicate::Eq {
            field: Field::Status,
            value: status.as_str().to_string(),
        });
    }

    if let Some(term) = filters.search_term.as_deref() {
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

    StoreQuery {
        predicates,
        order_by: vec![sort_key(filters.sort_by)],
    }
}

/// Maps a requested sort order to a sort key; `None` yields the default
/// `updatedDate` descending (ties break on `id` ascending in the store).
#[must_use]
pub fn sort_key(sort_by: Option<TaskSortBy>) -> SortKey {
    match sort_by {
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
    }
}
