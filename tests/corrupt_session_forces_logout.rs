use rollcalld::model::Role;
use rollcalld::storage::{keys, KeyValue, SqliteKv};
use rollcalld::ReplicaStore;
use std::path::PathBuf;

fn temp_workspace(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "rollcall-{tag}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ))
}

#[test]
fn unknown_role_is_silently_discarded() {
    let dir = temp_workspace("badrole");
    let kv = SqliteKv::open(&dir).expect("open kv");
    kv.set(keys::ROLE, "SUPERADMIN").expect("poison");

    let store = ReplicaStore::open(Box::new(kv), None).expect("open store");
    assert_eq!(store.current_role(), None);
    drop(store);

    // The stale key was cleared, not just ignored.
    let kv = SqliteKv::open(&dir).expect("reopen kv");
    assert_eq!(kv.get(keys::ROLE).expect("get"), None);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn parent_without_resolvable_guardian_is_logged_out() {
    let dir = temp_workspace("orphanparent");
    let kv = SqliteKv::open(&dir).expect("open kv");
    kv.set(keys::ROLE, "PARENT").expect("set role");
    kv.set(keys::GUARDIAN_ID, "999").expect("set guardian");

    let store = ReplicaStore::open(Box::new(kv), None).expect("open store");
    assert_eq!(store.current_role(), None);
    assert!(store.current_guardian().is_none());
    drop(store);

    let kv = SqliteKv::open(&dir).expect("reopen kv");
    assert_eq!(kv.get(keys::ROLE).expect("get"), None);
    assert_eq!(kv.get(keys::GUARDIAN_ID).expect("get"), None);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn valid_cached_session_is_resumed() {
    let dir = temp_workspace("goodrole");
    let kv = SqliteKv::open(&dir).expect("open kv");
    kv.set(keys::ROLE, "TEACHER").expect("set role");

    let store = ReplicaStore::open(Box::new(kv), None).expect("open store");
    assert_eq!(store.current_role(), Some(Role::Teacher));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn parent_resumes_once_the_guardian_resolves() {
    // First boot seeds the demo snapshot (guardian 1) and persists it.
    let dir = temp_workspace("parentok");
    {
        let kv = SqliteKv::open(&dir).expect("open kv");
        let _ = ReplicaStore::open(Box::new(kv), None).expect("first boot");
    }
    let kv = SqliteKv::open(&dir).expect("reopen kv");
    kv.set(keys::ROLE, "PARENT").expect("set role");
    kv.set(keys::GUARDIAN_ID, "1").expect("set guardian");

    let store = ReplicaStore::open(Box::new(kv), None).expect("open store");
    assert_eq!(store.current_role(), Some(Role::Parent));
    assert_eq!(store.current_guardian().expect("guardian").id, 1);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn stored_token_without_remote_api_is_dropped() {
    let dir = temp_workspace("staletoken");
    let kv = SqliteKv::open(&dir).expect("open kv");
    kv.set(keys::TOKEN, "stale").expect("set token");

    let store = ReplicaStore::open(Box::new(kv), None).expect("open store");
    assert_eq!(store.current_role(), None);
    drop(store);

    let kv = SqliteKv::open(&dir).expect("reopen kv");
    assert_eq!(kv.get(keys::TOKEN).expect("get"), None);
    let _ = std::fs::remove_dir_all(&dir);
}
