mod common;

use common::{online_store, MockApi};
use rollcalld::store::{NewStudent, StudentFilter, StudentPatch};
use rollcalld::StoreError;

fn new_student(name: &str) -> NewStudent {
    NewStudent {
        full_name: name.to_string(),
        course_id: Some(1),
        photo_ref: None,
        evidence_pref: Default::default(),
    }
}

#[test]
fn rejected_create_adds_nothing() {
    let mut store = online_store(MockApi::rejecting());
    let before = store.students(&StudentFilter::default());
    let err = store.add_student(new_student("Delia Funes")).unwrap_err();
    assert!(matches!(err, StoreError::Remote(_)));
    assert_eq!(store.students(&StudentFilter::default()), before);
}

#[test]
fn rejected_update_leaves_the_row_as_it_was() {
    let mut store = online_store(MockApi::new());
    let before = store.student(1).expect("seed row").clone();
    let err = store
        .update_student(
            1,
            StudentPatch {
                full_name: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::Remote(_)));
    assert_eq!(store.student(1), Some(&before));
}

#[test]
fn rejected_delete_keeps_the_row() {
    let mut store = online_store(MockApi::rejecting());
    let err = store.delete_student(1).unwrap_err();
    assert!(matches!(err, StoreError::Remote(_)));
    assert!(store.student(1).is_some());
    // No cascade ran either.
    assert_eq!(store.guardian(1).expect("guardian").student_ids, vec![1, 2]);
}

#[test]
fn accepted_create_takes_the_server_id() {
    let mut store = online_store(MockApi::new());
    let saved = store.add_student(new_student("Delia Funes")).expect("create");
    // Server ids start at 100 in the mock; no locally-minted id survives.
    assert_eq!(saved.id, 100);
    assert_eq!(store.students(&StudentFilter::default()).len(), 4);
    // A second accepted create must not duplicate the first row.
    let again = store.add_student(new_student("Emilio Sosa")).expect("create");
    assert_eq!(again.id, 101);
    assert_eq!(store.students(&StudentFilter::default()).len(), 5);
}
