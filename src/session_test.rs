use super::*;
use crate::storage::{FileStore, MemoryStore, StorageError};

/// Store whose every operation fails.
struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("broken".into()))
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("broken".into()))
    }

    fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("broken".into()))
    }
}

fn alice() -> User {
    User { username: "alice".into(), email: "alice".into() }
}

// =============================================================================
// login
// =============================================================================

#[test]
fn login_rejects_empty_username_or_password() {
    let mut session = Session::new(MemoryStore::new());
    assert!(!session.login("", "x"));
    assert!(!session.login("x", ""));
    assert!(!session.login("", ""));
    assert!(!session.is_authenticated());
    assert!(session.user().is_none());
    assert!(session.store().is_empty());
}

#[test]
fn login_sets_user_with_username_as_email() {
    let mut session = Session::new(MemoryStore::new());
    assert!(session.login("alice", "pw"));
    assert!(session.is_authenticated());
    assert_eq!(session.user(), Some(&alice()));
}

#[test]
fn login_persists_marker_and_user_json() {
    let mut session = Session::new(MemoryStore::new());
    session.login("alice", "pw");

    let store = session.into_store();
    assert_eq!(store.get(IS_AUTHENTICATED_KEY).unwrap().as_deref(), Some("true"));
    let raw = store.get(USER_KEY).unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["username"], "alice");
    assert_eq!(json["email"], "alice");
}

#[test]
fn login_accepts_whitespace_credentials() {
    let mut session = Session::new(MemoryStore::new());
    assert!(session.login(" ", " "));
}

#[test]
fn login_with_custom_check() {
    struct OnlyAdmin;
    impl CredentialCheck for OnlyAdmin {
        fn accepts(&self, username: &str, password: &str) -> bool {
            username == "admin" && password == "secret"
        }
    }

    let mut session = Session::with_check(MemoryStore::new(), OnlyAdmin);
    assert!(!session.login("alice", "pw"));
    assert!(session.login("admin", "secret"));
    assert_eq!(session.user().map(|u| u.username.as_str()), Some("admin"));
}

// =============================================================================
// logout
// =============================================================================

#[test]
fn logout_clears_state_and_storage() {
    let mut session = Session::new(MemoryStore::new());
    session.login("alice", "pw");
    session.logout();

    assert!(!session.is_authenticated());
    assert!(session.user().is_none());
    assert!(session.store().is_empty());
}

#[test]
fn logout_when_logged_out_is_noop() {
    let mut session = Session::new(MemoryStore::new());
    session.logout();
    assert_eq!(session.state(), &SessionState::default());
}

// =============================================================================
// check_auth
// =============================================================================

#[test]
fn check_auth_without_persisted_data_is_false() {
    let mut session = Session::new(MemoryStore::new());
    assert!(!session.check_auth());
    assert!(session.user().is_none());
}

#[test]
fn check_auth_round_trips_across_fresh_session() {
    let mut first = Session::new(MemoryStore::new());
    first.login("alice", "pw");
    let before = first.state().clone();

    let mut second = Session::new(first.into_store());
    assert!(second.is_authenticated());
    assert!(second.check_auth());
    assert_eq!(second.state(), &before);
}

#[test]
fn check_auth_requires_literal_true_marker() {
    let mut store = MemoryStore::new();
    store.set(IS_AUTHENTICATED_KEY, "TRUE").unwrap();
    store.set(USER_KEY, r#"{"username":"alice","email":"alice"}"#).unwrap();

    let session = Session::new(store);
    assert!(!session.is_authenticated());
}

#[test]
fn check_auth_requires_user_entry() {
    let mut store = MemoryStore::new();
    store.set(IS_AUTHENTICATED_KEY, "true").unwrap();
    let mut session = Session::new(store);
    assert!(!session.check_auth());

    let mut store = session.into_store();
    store.set(USER_KEY, "").unwrap();
    let mut session = Session::new(store);
    assert!(!session.check_auth());
}

#[test]
fn check_auth_treats_malformed_user_as_logged_out() {
    let mut store = MemoryStore::new();
    store.set(IS_AUTHENTICATED_KEY, "true").unwrap();
    store.set(USER_KEY, "{not json").unwrap();

    let mut session = Session::new(store);
    assert!(!session.check_auth());
    assert!(session.user().is_none());
    // Malformed entries are left in place.
    assert!(session.store().get(USER_KEY).unwrap().is_some());
}

#[test]
fn check_auth_resets_when_storage_cleared_externally() {
    let mut session = Session::new(MemoryStore::new());
    session.login("alice", "pw");

    // Another tab logging out.
    let mut store = session.into_store();
    store.remove(IS_AUTHENTICATED_KEY).unwrap();
    let mut session = Session::new(&mut store);
    assert!(!session.check_auth());
}

#[test]
fn round_trip_through_file_store() {
    let path = std::env::temp_dir()
        .join(format!("topic7-session-{}", uuid::Uuid::new_v4()))
        .join("session.json");

    {
        let mut session = Session::new(FileStore::open(&path).unwrap());
        assert!(session.login("alice", "pw"));
    }

    let session = Session::new(FileStore::open(&path).unwrap());
    assert_eq!(session.user(), Some(&alice()));

    std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
}

// =============================================================================
// storage failures
// =============================================================================

#[test]
fn broken_store_starts_logged_out() {
    let session = Session::new(BrokenStore);
    assert!(!session.is_authenticated());
}

#[test]
fn broken_store_login_still_updates_memory() {
    let mut session = Session::new(BrokenStore);
    assert!(session.login("alice", "pw"));
    assert_eq!(session.user(), Some(&alice()));

    session.logout();
    assert!(!session.is_authenticated());
}

#[test]
fn failed_file_write_does_not_survive_into_fresh_session() {
    let path = std::env::temp_dir()
        .join(format!("topic7-session-{}", uuid::Uuid::new_v4()))
        .join("session.json");
    let dir = path.parent().unwrap().to_path_buf();
    let store = FileStore::open(&path).unwrap();
    std::fs::write(&dir, "").unwrap();

    let mut session = Session::new(store);
    assert!(session.login("alice", "pw"));

    let mut fresh = Session::new(session.into_store());
    assert!(!fresh.check_auth());

    std::fs::remove_file(&dir).unwrap();
}

// =============================================================================
// subscribe
// =============================================================================

#[test]
fn subscriber_sees_login_and_logout() {
    let mut session = Session::new(MemoryStore::new());
    let mut rx = session.subscribe();
    assert!(!rx.has_changed().unwrap());

    session.login("alice", "pw");
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().user(), Some(&alice()));

    session.logout();
    assert!(rx.has_changed().unwrap());
    assert!(!rx.borrow_and_update().is_authenticated());
}

#[test]
fn subscriber_not_notified_without_change() {
    let mut session = Session::new(MemoryStore::new());
    session.login("alice", "pw");
    let rx = session.subscribe();

    session.login("alice", "other");
    session.check_auth();
    assert!(!rx.has_changed().unwrap());
}

#[test]
fn subscriber_starts_from_rehydrated_state() {
    let mut store = MemoryStore::new();
    store.set(IS_AUTHENTICATED_KEY, "true").unwrap();
    store.set(USER_KEY, r#"{"username":"alice","email":"alice"}"#).unwrap();

    let session = Session::new(store);
    let rx = session.subscribe();
    assert!(rx.borrow().is_authenticated());
}

// =============================================================================
// User
// =============================================================================

#[test]
fn user_serializes_with_plain_keys() {
    let json = serde_json::to_string(&alice()).unwrap();
    assert_eq!(json, r#"{"username":"alice","email":"alice"}"#);
}
