use rollcalld::model::{EventKind, EventSource};
use rollcalld::storage::SqliteKv;
use rollcalld::store::{NewEvent, NewTeacher, StudentPatch};
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

fn open(dir: &PathBuf) -> ReplicaStore {
    let kv = SqliteKv::open(dir).expect("open kv");
    ReplicaStore::open(Box::new(kv), None).expect("open store")
}

#[test]
fn reopened_store_sees_the_exact_same_snapshot() {
    let dir = temp_workspace("restart");

    let mut store = open(&dir);
    store
        .add_teacher(NewTeacher {
            full_name: "Rosa Aguirre".to_string(),
            can_enroll_biometric: true,
        })
        .expect("create");
    store
        .update_student(
            1,
            StudentPatch {
                full_name: Some("Ana R. Robles".to_string()),
                ..Default::default()
            },
        )
        .expect("update");
    store
        .record_event(NewEvent {
            student_id: 1,
            kind: EventKind::In,
            source: EventSource::Nfc,
            timestamp: None,
            evidence_ref: Some("srv-123".to_string()),
        })
        .expect("record");
    let before = serde_json::to_value(store.snapshot()).expect("encode");
    drop(store);

    let reopened = open(&dir);
    let after = serde_json::to_value(reopened.snapshot()).expect("encode");
    assert_eq!(after, before);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn corrupt_snapshot_reseeds_instead_of_crashing() {
    let dir = temp_workspace("corrupt");
    {
        let kv = SqliteKv::open(&dir).expect("open kv");
        use rollcalld::storage::{keys, KeyValue};
        kv.set(keys::SNAPSHOT, "{not json").expect("poison");
    }
    let store = open(&dir);
    // Demo data again, not a panic and not an empty store.
    assert_eq!(store.students(&Default::default()).len(), 3);
    let _ = std::fs::remove_dir_all(&dir);
}
