use chrono::{Duration, TimeZone, Utc};
use portal_core::{
    DataManager, KeyValueStore, ManualClock, MemoryKeyValueStore, PortalError, Role,
    DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME,
};

fn clock() -> ManualClock {
    let start = Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap();
    ManualClock::stepping(start, Duration::seconds(1))
}

fn open_portal(store: MemoryKeyValueStore) -> DataManager<MemoryKeyValueStore, ManualClock> {
    DataManager::open_with_clock(store, clock()).unwrap()
}

#[test]
fn login_persists_only_user_id_and_role() {
    let mut portal = open_portal(MemoryKeyValueStore::new());
    let admin = portal
        .login(DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD, Role::Admin)
        .unwrap();

    let store = portal.into_store();
    assert_eq!(
        store.get_item("currentUser").unwrap(),
        Some(admin.id.to_string())
    );
    assert_eq!(store.get_item("currentRole").unwrap().as_deref(), Some("admin"));
}

#[test]
fn failed_login_keeps_previous_state() {
    let mut portal = open_portal(MemoryKeyValueStore::new());

    let err = portal
        .login(DEFAULT_ADMIN_USERNAME, "nope", Role::Admin)
        .unwrap_err();
    assert!(matches!(err, PortalError::InvalidCredentials));
    assert!(portal.current_user().is_none());
}

#[test]
fn session_is_restored_on_open() {
    let mut portal = open_portal(MemoryKeyValueStore::new());
    let user = portal.sign_up("alice", "pw", Role::Student).unwrap();
    assert_eq!(portal.current_user().map(|u| u.id), Some(user.id));

    let reopened = open_portal(portal.into_store());
    let session = reopened.current_session().unwrap();
    assert_eq!(session.user_id, user.id);
    assert_eq!(session.role, Role::Student);
}

#[test]
fn logout_clears_persisted_session() {
    let mut portal = open_portal(MemoryKeyValueStore::new());
    portal.sign_up("alice", "pw", Role::Student).unwrap();

    portal.logout().unwrap();

    assert!(portal.current_session().is_none());
    let reopened = open_portal(portal.into_store());
    assert!(reopened.current_user().is_none());
}

#[test]
fn stale_or_mismatched_session_is_discarded() {
    let mut portal = open_portal(MemoryKeyValueStore::new());
    let user = portal.sign_up("alice", "pw", Role::Student).unwrap();
    let mut store = portal.into_store();
    store.set_item("currentRole", "teacher").unwrap();

    let reopened = open_portal(store);
    assert!(reopened.current_session().is_none());
    let store = reopened.into_store();
    assert_eq!(store.get_item("currentUser").unwrap(), None);

    let mut store = store;
    store.set_item("currentUser", "not-a-uuid").unwrap();
    store.set_item("currentRole", "student").unwrap();
    let reopened = open_portal(store);
    assert!(reopened.current_session().is_none());
    assert!(reopened.get_user_by_id(user.id).is_some());
}

#[test]
fn sign_up_with_taken_username_does_not_sign_in() {
    let mut portal = open_portal(MemoryKeyValueStore::new());

    let err = portal
        .sign_up(DEFAULT_ADMIN_USERNAME, "pw", Role::Student)
        .unwrap_err();
    assert!(matches!(err, PortalError::UsernameTaken(_)));
    assert!(portal.current_session().is_none());
}

#[test]
fn portals_under_other_keys_keep_separate_sessions() {
    let mut default_portal = open_portal(MemoryKeyValueStore::new());
    let admin = default_portal
        .login(DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD, Role::Admin)
        .unwrap();

    let mut other = DataManager::open_with(default_portal.into_store(), clock(), "portalB").unwrap();
    assert!(other.current_session().is_none());
    assert_eq!(
        other.session_keys(),
        ("portalB.currentUser".to_string(), "portalB.currentRole".to_string())
    );
    let other_admin = other
        .login(DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD, Role::Admin)
        .unwrap();
    other.logout().unwrap();

    let store = other.into_store();
    assert_eq!(store.get_item("portalB.currentUser").unwrap(), None);
    assert_ne!(other_admin.id, admin.id);
    let reopened = open_portal(store);
    assert_eq!(reopened.current_user().map(|user| user.id), Some(admin.id));
}
