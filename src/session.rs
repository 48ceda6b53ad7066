//! Session state holder.
//!
//! DESIGN
//! ======
//! A `Session` is constructed once by the application around an injected
//! [`KeyValueStore`] and passed by reference to whatever needs it. Two
//! storage keys mirror the in-memory state: `isAuthenticated` holds the
//! literal `"true"` marker and `user` holds the user record as JSON.
//! Construction rehydrates from those keys.
//!
//! The authenticated flag is derived from the presence of a user, so the
//! two can never disagree in memory. Every operation is total: storage
//! failures and malformed persisted data are logged and treated as
//! "unauthenticated" rather than surfaced.
//!
//! Consumers that need to react to changes hold a `watch::Receiver` from
//! [`Session::subscribe`].
//!
//! TRADE-OFFS
//! ==========
//! `login` does not verify credentials against the hosted auth service.
//! The acceptance rule sits behind [`CredentialCheck`]; the default,
//! [`NonEmptyCredentials`], accepts any non-empty pair.

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::storage::KeyValueStore;

/// Storage key for the authenticated marker.
pub const IS_AUTHENTICATED_KEY: &str = "isAuthenticated";
/// Storage key for the JSON-encoded user record.
pub const USER_KEY: &str = "user";
/// The only flag value that counts as authenticated.
pub const AUTHENTICATED_MARKER: &str = "true";

/// The logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email: String,
}

impl User {
    /// The stub login has no directory to consult; the username doubles as email.
    #[must_use]
    pub fn from_username(username: &str) -> Self {
        Self { username: username.to_string(), email: username.to_string() }
    }
}

/// Snapshot of the session: either logged out, or logged in as a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    user: Option<User>,
}

impl SessionState {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}

/// Decides whether a username/password pair may log in.
pub trait CredentialCheck {
    fn accepts(&self, username: &str, password: &str) -> bool;
}

/// Accepts any pair where both parts are non-empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonEmptyCredentials;

impl CredentialCheck for NonEmptyCredentials {
    fn accepts(&self, username: &str, password: &str) -> bool {
        !username.is_empty() && !password.is_empty()
    }
}

/// Current login status, mirrored into persistent storage.
#[derive(Debug)]
pub struct Session<S, C = NonEmptyCredentials> {
    store: S,
    check: C,
    state: SessionState,
    tx: watch::Sender<SessionState>,
}

impl<S: KeyValueStore> Session<S> {
    /// Create a session over `store`, restoring any persisted login.
    pub fn new(store: S) -> Self {
        Self::with_check(store, NonEmptyCredentials)
    }
}

impl<S: KeyValueStore, C: CredentialCheck> Session<S, C> {
    /// Create a session with a custom credential rule, restoring any persisted login.
    pub fn with_check(store: S, check: C) -> Self {
        let mut session = Self {
            store,
            check,
            state: SessionState::default(),
            tx: watch::Sender::new(SessionState::default()),
        };
        session.check_auth();
        session
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.state.user()
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Receiver that observes every subsequent state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Tear the session down, handing back its store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Log in and persist the session. Returns `false`, changing nothing,
    /// when the credentials are rejected.
    pub fn login(&mut self, username: &str, password: &str) -> bool {
        if !self.check.accepts(username, password) {
            tracing::debug!("login rejected");
            return false;
        }

        let user = User::from_username(username);
        self.persist(IS_AUTHENTICATED_KEY, AUTHENTICATED_MARKER);
        match serde_json::to_string(&user) {
            Ok(json) => self.persist(USER_KEY, &json),
            Err(e) => tracing::warn!(error = %e, "failed to encode user record"),
        }
        self.publish(SessionState { user: Some(user) });

        tracing::info!(username, "logged in");
        true
    }

    /// Clear the session and its persisted entries.
    pub fn logout(&mut self) {
        self.erase(IS_AUTHENTICATED_KEY);
        self.erase(USER_KEY);
        self.publish(SessionState::default());
        tracing::info!("logged out");
    }

    /// Re-sync in-memory state from storage and return the resulting flag.
    pub fn check_auth(&mut self) -> bool {
        let user = self.read_persisted();
        self.publish(SessionState { user });
        self.state.is_authenticated()
    }

    fn read_persisted(&self) -> Option<User> {
        let flag = self.load(IS_AUTHENTICATED_KEY)?;
        if flag != AUTHENTICATED_MARKER {
            return None;
        }
        let raw = self.load(USER_KEY)?;
        if raw.is_empty() {
            return None;
        }
        match serde_json::from_str::<User>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, key = USER_KEY, "malformed persisted user; treating as logged out");
                None
            }
        }
    }

    fn load(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, key, "storage read failed");
                None
            }
        }
    }

    fn persist(&mut self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            tracing::warn!(error = %e, key, "storage write failed");
        }
    }

    fn erase(&mut self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            tracing::warn!(error = %e, key, "storage remove failed");
        }
    }

    fn publish(&mut self, next: SessionState) {
        self.state = next;
        let current = &self.state;
        self.tx.send_if_modified(|seen| {
            if *seen == *current {
                false
            } else {
                seen.clone_from(current);
                true
            }
        });
    }
}
