mod common;

use common::offline_store;
use rollcalld::model::{RecordStatus, TeacherStatus};
use rollcalld::store::GuardianFilter;

#[test]
fn deleted_guardian_stays_addressable_by_id() {
    let mut store = offline_store();
    let deleted = store.delete_guardian(1).expect("delete");
    assert_eq!(deleted.status, RecordStatus::Deleted);

    // Default listing still returns the row; a status filter hides it.
    let all = store.guardians(&GuardianFilter::default());
    assert_eq!(all.len(), 1);
    let active = store.guardians(&GuardianFilter {
        status: Some(RecordStatus::Active),
        ..Default::default()
    });
    assert!(active.is_empty());

    let fetched = store.guardian(1).expect("still addressable");
    assert_eq!(fetched.status, RecordStatus::Deleted);
    assert_eq!(fetched.student_ids, vec![1, 2]);
}

#[test]
fn restore_is_idempotent() {
    let mut store = offline_store();
    store.delete_guardian(1).expect("delete");
    let once = store.restore_guardian(1).expect("restore");
    assert_eq!(once.status, RecordStatus::Active);
    let twice = store.restore_guardian(1).expect("restore again");
    assert_eq!(twice, once);
}

#[test]
fn teacher_restore_does_not_touch_on_leave() {
    let mut store = offline_store();
    store.delete_teacher(2).expect("delete");
    assert_eq!(store.teacher(2).expect("row").status, TeacherStatus::Deleted);
    let revived = store.restore_teacher(2).expect("restore");
    assert_eq!(revived.status, TeacherStatus::Active);

    // Restoring someone who was never deleted changes nothing.
    use rollcalld::store::TeacherPatch;
    store
        .update_teacher(
            1,
            TeacherPatch {
                status: Some(TeacherStatus::OnLeave),
                ..Default::default()
            },
        )
        .expect("patch");
    let untouched = store.restore_teacher(1).expect("restore no-op");
    assert_eq!(untouched.status, TeacherStatus::OnLeave);
}

#[test]
fn course_delete_refuses_while_students_enrolled() {
    let mut store = offline_store();
    assert!(store.delete_course(1).is_err());

    // Move everyone out, then the flip goes through.
    use rollcalld::store::StudentPatch;
    for sid in [1, 3] {
        store
            .update_student(
                sid,
                StudentPatch {
                    course_id: Some(None),
                    ..Default::default()
                },
            )
            .expect("unenroll");
    }
    let deleted = store.delete_course(1).expect("delete empty course");
    assert_eq!(deleted.status, RecordStatus::Deleted);
}
