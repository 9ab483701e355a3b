//! Property-based tests for the shared query, sanitization, and
//! validation semantics.
//!
//! Uses proptest to verify:
//! 1. `sanitize` is idempotent and its output never reopens markup.
//! 2. Markup-free input passes through `sanitize` unchanged.
//! 3. Prefix-range matching agrees with a direct lowercase prefix check.
//! 4. Query sorting is a permutation of its input and deterministic.
//! 5. Status and sort-order wire strings round-trip through parsing.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use taskdeck_proto::query::{Field, Predicate, SortDirection, SortKey, StoreQuery};
use taskdeck_proto::sanitize::sanitize;
use taskdeck_proto::task::{Task, TaskId, TaskSortBy, TaskStatus};
use taskdeck_proto::validate::{TaskForm, validate};

// --- Strategies ---

/// Arbitrary text that may or may not contain markup.
fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 <>/!?=\"'&;.-]{0,64}"
}

/// Text guaranteed to contain no markup openers.
fn arb_plain_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,'-]{0,64}"
}

fn arb_status() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![
        Just(TaskStatus::ToDo),
        Just(TaskStatus::InProgress),
        Just(TaskStatus::Done),
    ]
}

fn arb_task() -> impl Strategy<Value = (String, String, Option<String>, TaskStatus, i64)> {
    (
        "[a-z0-9]{1,12}",
        arb_plain_text(),
        prop::option::of(arb_plain_text()),
        arb_status(),
        0i64..2_000_000_000,
    )
}

fn make_task(
    (id, title, description, status, updated): (String, String, Option<String>, TaskStatus, i64),
) -> Task {
    // Seconds in 0..2_000_000_000 always map to a valid timestamp.
    let updated_date = Utc.timestamp_opt(updated, 0).unwrap();
    Task {
        id: TaskId::new(id),
        user_id: "u1".to_string(),
        title,
        description,
        status,
        due_date: None,
        created_date: updated_date,
        updated_date,
    }
}

// --- Sanitizer properties ---

proptest! {
    #[test]
    fn sanitize_is_idempotent(input in arb_text()) {
        let once = sanitize(&input);
        let twice = sanitize(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn sanitize_output_opens_no_markup(input in arb_text()) {
        let cleaned = sanitize(&input);
        // A '<' immediately followed by a tag-opening character would be
        // re-interpreted as markup by a renderer.
        let bytes = cleaned.as_bytes();
        for (i, &b) in bytes.iter().enumerate() {
            if b == b'<' {
                let next = bytes.get(i + 1).copied();
                let opens = next.is_some_and(|n| {
                    n.is_ascii_alphabetic() || n == b'/' || n == b'!' || n == b'?'
                });
                prop_assert!(!opens, "sanitized output re-opens markup: {cleaned:?}");
            }
        }
    }

    #[test]
    fn markup_free_text_is_untouched(input in arb_plain_text()) {
        prop_assert_eq!(sanitize(&input), input);
    }
}

// --- Validation properties ---

proptest! {
    #[test]
    fn nonblank_title_and_known_status_always_validate(
        title in "[a-zA-Z0-9][a-zA-Z0-9 ]{0,32}",
        status in arb_status(),
    ) {
        let form = TaskForm {
            title,
            status: status.as_str().to_string(),
            ..TaskForm::default()
        };
        prop_assert!(validate(&form).is_ok());
    }

    #[test]
    fn unknown_status_never_validates(status in "[a-z ]{1,16}") {
        let form = TaskForm {
            title: "ok".to_string(),
            status,
            ..TaskForm::default()
        };
        prop_assert!(validate(&form).is_err());
    }
}

// --- Query matching and ordering properties ---

proptest! {
    #[test]
    fn prefix_range_agrees_with_lowercase_prefix(
        task in arb_task(),
        term in "[a-z]{1,6}",
    ) {
        let task = make_task(task);
        let predicate = Predicate::Range {
            field: Field::Title,
            lower: term.clone(),
            upper: format!("{term}\u{f8ff}"),
        };
        let expected = task.title.to_lowercase().starts_with(&term);
        prop_assert_eq!(predicate.matches(&task), expected);
    }

    #[test]
    fn sort_is_a_deterministic_permutation(
        tasks in prop::collection::vec(arb_task(), 0..12),
    ) {
        let tasks: Vec<Task> = tasks.into_iter().map(make_task).collect();
        let query = StoreQuery {
            predicates: Vec::new(),
            order_by: vec![SortKey {
                field: Field::UpdatedDate,
                direction: SortDirection::Descending,
            }],
        };

        let mut sorted = tasks.clone();
        query.sort(&mut sorted);
        let mut again = sorted.clone();
        query.sort(&mut again);
        prop_assert_eq!(&sorted, &again);

        let mut expected_ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        let mut got_ids: Vec<&str> = sorted.iter().map(|t| t.id.as_str()).collect();
        expected_ids.sort_unstable();
        got_ids.sort_unstable();
        prop_assert_eq!(expected_ids, got_ids);
    }

    #[test]
    fn sorted_updated_dates_are_monotone(
        tasks in prop::collection::vec(arb_task(), 0..12),
    ) {
        let mut tasks: Vec<Task> = tasks.into_iter().map(make_task).collect();
        let query = StoreQuery {
            predicates: Vec::new(),
            order_by: vec![SortKey {
                field: Field::UpdatedDate,
                direction: SortDirection::Descending,
            }],
        };
        query.sort(&mut tasks);
        for pair in tasks.windows(2) {
            prop_assert!(pair[0].updated_date >= pair[1].updated_date);
        }
    }
}

// --- Wire string round trips ---

proptest! {
    #[test]
    fn status_wire_strings_round_trip(status in arb_status()) {
        prop_assert_eq!(TaskStatus::parse_wire(status.as_str()), Some(status));
    }

    #[test]
    fn sort_by_wire_strings_round_trip(
        sort_by in prop_oneof![
            Just(TaskSortBy::TitleAsc),
            Just(TaskSortBy::TitleDesc),
            Just(TaskSortBy::DueDateAsc),
            Just(TaskSortBy::DueDateDesc),
            Just(TaskSortBy::UpdatedDateAsc),
            Just(TaskSortBy::UpdatedDateDesc),
        ],
    ) {
        prop_assert_eq!(TaskSortBy::parse_wire(sort_by.as_str()), Some(sort_by));
    }
}
