//! Integration tests for auth session state and its wiring to the cache.
//!
//! Uses the in-process identity provider to drive sign-up, sign-in, and
//! sign-out through `SessionState`, and verifies the task cache follows
//! the session.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::similar_names)]

use std::sync::Arc;
use std::time::Duration;

use taskdeck::cache::{CacheState, TaskListCache};
use taskdeck::repo::TaskRepository;
use taskdeck::session::{AuthError, IdentityProvider, MemoryIdentityProvider, SessionState};
use taskdeck::store::MemoryStore;
use taskdeck_proto::validate::TaskForm;

const SEARCH_DELAY: Duration = Duration::from_millis(500);

fn form(title: &str) -> TaskForm {
    TaskForm {
        title: title.to_string(),
        status: "TO_DO".to_string(),
        ..TaskForm::default()
    }
}

// ---------------------------------------------------------------------------
// Session state lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn session_starts_loading_and_settles_on_first_callback() {
    let provider = MemoryIdentityProvider::new();
    let session = SessionState::new(provider.current_user());
    assert!(session.snapshot().loading);

    let _forwarder = session.attach(provider.subscribe());
    provider.sign_up("a@example.com", "pw").await.unwrap();

    let mut rx = session.subscribe();
    rx.changed().await.unwrap();
    let snapshot = rx.borrow().clone();
    assert!(!snapshot.loading);
    assert_eq!(
        snapshot.user.map(|u| u.email),
        Some("a@example.com".to_string())
    );
}

#[tokio::test]
async fn sign_out_clears_session_user() {
    let provider = MemoryIdentityProvider::new();
    let session = SessionState::new(provider.current_user());
    let _forwarder = session.attach(provider.subscribe());
    let mut rx = session.subscribe();

    provider.sign_up("a@example.com", "pw").await.unwrap();
    rx.changed().await.unwrap();
    assert!(rx.borrow_and_update().user.is_some());

    provider.sign_out().await.unwrap();
    rx.changed().await.unwrap();
    let snapshot = rx.borrow().clone();
    assert!(snapshot.user.is_none());
    assert!(!snapshot.loading);
}

#[tokio::test]
async fn sign_in_round_trip_and_bad_credentials() {
    let provider = MemoryIdentityProvider::new();
    let created = provider.sign_up("a@example.com", "pw").await.unwrap();
    provider.sign_out().await.unwrap();

    let again = provider.sign_in("a@example.com", "pw").await.unwrap();
    assert_eq!(again.uid, created.uid);

    provider.sign_out().await.unwrap();
    let err = provider.sign_in("a@example.com", "wrong").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
    assert!(provider.current_user().is_none());
}

#[tokio::test]
async fn duplicate_sign_up_is_rejected() {
    let provider = MemoryIdentityProvider::new();
    provider.sign_up("a@example.com", "pw").await.unwrap();
    let err = provider.sign_up("a@example.com", "pw2").await.unwrap_err();
    assert!(matches!(err, AuthError::AccountExists(_)));
}

// ---------------------------------------------------------------------------
// Session-to-cache wiring
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cache_follows_session_changes() {
    let provider = MemoryIdentityProvider::new();
    let cache = TaskListCache::new(TaskRepository::new(MemoryStore::new()), SEARCH_DELAY);

    let alice = provider.sign_up("alice@example.com", "pw").await.unwrap();
    cache.set_session(provider.current_user().as_ref());
    cache.refresh().await.unwrap();
    cache.create(&form("Alice's task")).await.unwrap();
    assert_eq!(cache.tasks()[0].user_id, alice.uid);

    // A different user signing in empties the collection before any fetch.
    provider.sign_out().await.unwrap();
    cache.set_session(provider.current_user().as_ref());
    assert_eq!(cache.state(), CacheState::Empty);
    assert!(cache.tasks().is_empty());

    let bob = provider.sign_up("bob@example.com", "pw").await.unwrap();
    cache.set_session(provider.current_user().as_ref());
    cache.refresh().await.unwrap();
    // Alice's task stays store-side but is invisible to Bob.
    assert!(cache.tasks().is_empty());
    assert_ne!(alice.uid, bob.uid);
    assert_eq!(cache.repo().store().len(), 1);
}

#[tokio::test]
async fn attached_cache_fetches_without_manual_refresh() {
    let provider = MemoryIdentityProvider::new();
    let session = SessionState::new(provider.current_user());
    let _forwarder = session.attach(provider.subscribe());
    let cache = Arc::new(TaskListCache::new(
        TaskRepository::new(MemoryStore::new()),
        SEARCH_DELAY,
    ));
    let _follower = cache.attach(session.subscribe());

    // Signing in is the only trigger: no refresh() call anywhere.
    provider.sign_up("a@example.com", "pw").await.unwrap();
    for _ in 0..100 {
        if cache.state() == CacheState::Loaded {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(cache.state(), CacheState::Loaded);
    cache.create(&form("Mine")).await.unwrap();

    provider.sign_out().await.unwrap();
    for _ in 0..100 {
        if cache.state() == CacheState::Empty {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(cache.state(), CacheState::Empty);
    assert!(cache.tasks().is_empty());
}
