//! Store query AST and its reference evaluation.
//!
//! The client composes a [`StoreQuery`] from UI filter state; document
//! stores either execute it natively or translate it to their own wire
//! format. The evaluation here ([`StoreQuery::matches`] and
//! [`StoreQuery::sort`]) is used by the in-memory store implementations
//! and doubles as the semantic reference for what a query means.

use crate::task::{Task, TaskId};

/// Highest representable string-ordering character.
///
/// Appending it to a lowered search term produces the exclusive upper
/// bound of a prefix range: every string starting with the term sorts
/// below `term + PREFIX_SENTINEL`.
pub const PREFIX_SENTINEL: char = '\u{f8ff}';

/// A queryable task field, named as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Owner identifier.
    UserId,
    /// Task title.
    Title,
    /// Task description.
    Description,
    /// Task status.
    Status,
    /// Due date.
    DueDate,
    /// Last-mutation timestamp.
    UpdatedDate,
}

impl Field {
    /// The wire name of this field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserId => "userId",
            Self::Title => "title",
            Self::Description => "description",
            Self::Status => "status",
            Self::DueDate => "dueDate",
            Self::UpdatedDate => "updatedDate",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// One component of a query's ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    /// Field to order by.
    pub field: Field,
    /// Direction to order in.
    pub direction: SortDirection,
}

/// A single filter condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Exact equality against a field's wire value.
    Eq {
        /// Field to compare.
        field: Field,
        /// Value it must equal.
        value: String,
    },
    /// Case-insensitive half-open range `[lower, upper)` over a text field.
    Range {
        /// Field to compare.
        field: Field,
        /// Inclusive lower bound, already lowercased.
        lower: String,
        /// Exclusive upper bound, already lowercased.
        upper: String,
    },
    /// Disjunction: matches when any inner predicate matches.
    AnyOf(Vec<Predicate>),
}

impl Predicate {
    /// Whether a task satisfies this predicate.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::Eq { field, value } => field_text(task, *field).is_some_and(|v| v == *value),
            Self::Range {
                field,
                lower,
                upper,
            } => field_text(task, *field).is_some_and(|v| {
                let v = v.to_lowercase();
                v.as_str() >= lower.as_str() && v.as_str() < upper.as_str()
            }),
            Self::AnyOf(inner) => inner.iter().any(|p| p.matches(task)),
        }
    }
}

/// A composed document-store query: conjoined predicates plus an ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreQuery {
    /// Filter conditions; all must hold.
    pub predicates: Vec<Predicate>,
    /// Sort keys, applied in sequence, with a final implicit `id`
    /// ascending tie-break for deterministic results.
    pub order_by: Vec<SortKey>,
}

impl StoreQuery {
    /// Whether a task satisfies every predicate of this query.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.predicates.iter().all(|p| p.matches(task))
    }

    /// Sorts tasks by the query's sort keys.
    ///
    /// Tasks that lack a sorted-by optional field order after dated ones
    /// ascending (and before them descending). Ties across all keys fall
    /// back to `id` ascending so repeated identical queries are stable.
    pub fn sort(&self, tasks: &mut [Task]) {
        tasks.sort_by(|a, b| {
            for key in &self.order_by {
                let ord = compare_field(a, b, key.field);
                let ord = match key.direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                };
                if ord != std::cmp::Ordering::Equal {
                    return ord;
                }
            }
            id_str(&a.id).cmp(id_str(&b.id))
        });
    }
}

/// Wire-comparable text value of a field, if it has one.
///
/// Date-valued fields return `None`; they participate in ordering only.
fn field_text(task: &Task, field: Field) -> Option<&str> {
    match field {
        Field::UserId => Some(task.user_id.as_str()),
        Field::Title => Some(task.title.as_str()),
        Field::Description => task.description.as_deref(),
        Field::Status => Some(task.status.as_str()),
        Field::DueDate | Field::UpdatedDate => None,
    }
}

fn compare_field(a: &Task, b: &Task, field: Field) -> std::cmp::Ordering {
    match field {
        Field::Title => a.title.cmp(&b.title),
        Field::UpdatedDate => a.updated_date.cmp(&b.updated_date),
        Field::DueDate => match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        },
        Field::UserId | Field::Description | Field::Status => std::cmp::Ordering::Equal,
    }
}

fn id_str(id: &TaskId) -> &str {
    id.as_str()
}
