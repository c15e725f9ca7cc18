mod common;

use common::{online_store, MockApi};
use rollcalld::model::Role;
use rollcalld::store::StudentFilter;
use serde_json::json;

#[test]
fn present_collections_fully_replace_local_rows() {
    let bootstrap = json!({
        "currentUser": { "role": "DIRECTOR" },
        "tenant": { "id": 7, "name": "Jardín Azul" },
        "features": ["withdrawals"],
        "students": [
            { "id": 41, "fullName": "Zoe Quiroga", "courseId": null,
              "photoRef": null, "evidencePref": "NONE" }
        ]
    });
    let store = online_store(MockApi::with_bootstrap(bootstrap));

    // Three seeded students are gone; the server's one row is the truth now.
    let students = store.students(&StudentFilter::default());
    assert_eq!(students.len(), 1);
    assert_eq!(students[0].id, 41);

    // Absent collections were left alone.
    assert!(store.guardian(1).is_some());

    assert_eq!(store.current_role(), Some(Role::Director));
    assert_eq!(store.tenant().expect("tenant").name, "Jardín Azul");
}

#[test]
fn features_gate_only_while_signed_in() {
    let bootstrap = json!({ "features": ["withdrawals"] });
    let mut store = online_store(MockApi::with_bootstrap(bootstrap));
    assert!(store.feature_enabled("withdrawals"));
    assert!(!store.feature_enabled("notifications"));

    // Back in demo mode everything is available.
    store.logout();
    assert!(store.feature_enabled("notifications"));
}

#[test]
fn bootstrap_parent_without_guardian_rolls_the_login_back() {
    let bootstrap = json!({
        "currentUser": { "role": "PARENT", "guardianId": 999 }
    });
    let mut store = rollcalld::ReplicaStore::open(
        Box::new(rollcalld::storage::MemoryKv::new()),
        Some(Box::new(MockApi::with_bootstrap(bootstrap))),
    )
    .expect("open store");

    // The login call itself fails closed instead of leaving a broken session.
    assert!(store.login_with_token("tok").is_ok());
    assert_eq!(store.current_role(), None);
    assert!(!store.remote_active());
}

#[test]
fn unknown_bootstrap_role_fails_closed() {
    let bootstrap = json!({ "currentUser": { "role": "SUPERADMIN" } });
    let mut store = rollcalld::ReplicaStore::open(
        Box::new(rollcalld::storage::MemoryKv::new()),
        Some(Box::new(MockApi::with_bootstrap(bootstrap))),
    )
    .expect("open store");
    assert!(store.login_with_token("tok").is_ok());
    assert_eq!(store.current_role(), None);
    assert!(!store.remote_active());
}
