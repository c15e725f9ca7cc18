mod common;

use common::offline_store;
use rollcalld::model::{EventKind, EventSource};
use rollcalld::store::{EventFilter, NewEvent};

#[test]
fn cascade_strips_links_and_purges_events() {
    let mut store = offline_store();
    store
        .record_event(NewEvent {
            student_id: 1,
            kind: EventKind::In,
            source: EventSource::Manual,
            timestamp: None,
            evidence_ref: None,
        })
        .expect("record");
    store
        .record_event(NewEvent {
            student_id: 2,
            kind: EventKind::In,
            source: EventSource::Manual,
            timestamp: None,
            evidence_ref: None,
        })
        .expect("record");

    store.delete_student(1).expect("delete");

    assert!(store.student(1).is_none());
    // Guardian and pickup lose the link but keep their other student.
    assert_eq!(store.guardian(1).expect("guardian").student_ids, vec![2]);
    assert_eq!(store.pickup(1).expect("pickup").student_ids, vec![2]);
    // Only the deleted student's events are purged.
    let remaining = store.events(&EventFilter::default());
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].student_id, 2);
}

#[test]
fn cascade_only_runs_for_students() {
    let mut store = offline_store();
    store
        .record_event(NewEvent {
            student_id: 3,
            kind: EventKind::In,
            source: EventSource::Manual,
            timestamp: None,
            evidence_ref: None,
        })
        .expect("record");
    // Deleting a device removes just the device row.
    store.delete_device(1).expect("delete device");
    assert!(store.device(1).is_none());
    assert_eq!(store.events(&EventFilter::default()).len(), 1);
    assert_eq!(store.guardian(1).expect("guardian").student_ids, vec![1, 2]);
}
