//! Auth session state and the identity-provider seam.
//!
//! The identity provider is an opaque collaborator: sign-in, sign-up,
//! sign-out, current-user, and a state-change subscription. Session
//! state starts in a loading phase and settles on the provider's first
//! callback; the task cache keys off the session's user to decide what
//! to fetch.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::sync::watch;
use uuid::Uuid;

/// An authenticated user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    /// Provider-assigned stable user id.
    pub uid: String,
    /// Sign-in email address.
    pub email: String,
}

/// Errors raised by the identity provider.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    /// Unknown account or wrong password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Sign-up attempted for an email that already has an account.
    #[error("an account already exists for {0}")]
    AccountExists(String),

    /// Any other provider-side failure.
    #[error("auth provider error: {0}")]
    Provider(String),
}

/// The opaque identity-provider contract.
///
/// `subscribe` is the state-change subscription: the receiver yields the
/// current identity on every sign-in and sign-out. Dropping the receiver
/// is the unsubscribe.
pub trait IdentityProvider: Send + Sync {
    /// Signs an existing account in.
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<UserIdentity, AuthError>> + Send;

    /// Creates an account and signs it in.
    fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<UserIdentity, AuthError>> + Send;

    /// Signs the current account out.
    fn sign_out(&self) -> impl std::future::Future<Output = Result<(), AuthError>> + Send;

    /// The currently signed-in identity, if any.
    fn current_user(&self) -> Option<UserIdentity>;

    /// Subscribes to identity changes.
    fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>>;
}

/// A point-in-time view of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    /// The signed-in user, if any.
    pub user: Option<UserIdentity>,
    /// True until the provider has reported auth state at least once.
    pub loading: bool,
}

/// Session container: holds the current identity plus the loading flag,
/// and broadcasts changes to subscribers.
pub struct SessionState {
    tx: watch::Sender<AuthSession>,
}

impl SessionState {
    /// Creates session state seeded from the provider's synchronously
    /// known user. `loading` stays true until [`apply`](Self::apply) or
    /// an attached subscription delivers the first callback.
    #[must_use]
    pub fn new(initial_user: Option<UserIdentity>) -> Self {
        let (tx, _) = watch::channel(AuthSession {
            user: initial_user,
            loading: true,
        });
        Self { tx }
    }

    /// The current session snapshot.
    #[must_use]
    pub fn snapshot(&self) -> AuthSession {
        self.tx.borrow().clone()
    }

    /// Subscribes to session changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthSession> {
        self.tx.subscribe()
    }

    /// Records a provider callback, clearing the loading flag.
    pub fn apply(&self, user: Option<UserIdentity>) {
        let _ = self.tx.send(AuthSession {
            user,
            loading: false,
        });
    }

    /// Forwards a provider subscription into this session state until
    /// the provider side closes. Returns the forwarding task's handle.
    pub fn attach(&self, mut rx: watch::Receiver<Option<UserIdentity>>) -> tokio::task::JoinHandle<()> {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let user = rx.borrow_and_update().clone();
                tracing::debug!(signed_in = user.is_some(), "auth state changed");
                let _ = tx.send(AuthSession {
                    user,
                    loading: false,
                });
            }
        })
    }
}

struct Account {
    password: String,
    uid: String,
}

/// In-process identity provider with email/password accounts.
///
/// Serves tests and offline demos the way a loopback transport would:
/// the full provider contract with no network behind it.
pub struct MemoryIdentityProvider {
    accounts: Mutex<HashMap<String, Account>>,
    current: watch::Sender<Option<UserIdentity>>,
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryIdentityProvider {
    /// Creates a provider with no accounts and nobody signed in.
    #[must_use]
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self {
            accounts: Mutex::new(HashMap::new()),
            current,
        }
    }
}

impl IdentityProvider for MemoryIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<UserIdentity, AuthError> {
        let identity = {
            let accounts = self.accounts.lock();
            let account = accounts.get(email).ok_or(AuthError::InvalidCredentials)?;
            if account.password != password {
                return Err(AuthError::InvalidCredentials);
            }
            UserIdentity {
                uid: account.uid.clone(),
                email: email.to_string(),
            }
        };
        let _ = self.current.send(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<UserIdentity, AuthError> {
        let identity = {
            let mut accounts = self.accounts.lock();
            if accounts.contains_key(email) {
                return Err(AuthError::AccountExists(email.to_string()));
            }
            let uid = Uuid::now_v7().to_string();
            accounts.insert(
                email.to_string(),
                Account {
                    password: password.to_string(),
                    uid: uid.clone(),
                },
            );
            UserIdentity {
                uid,
                email: email.to_string(),
            }
        };
        let _ = self.current.send(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let _ = self.current.send(None);
        Ok(())
    }

    fn current_user(&self) -> Option<UserIdentity> {
        self.current.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>> {
        self.current.subscribe()
    }
}
