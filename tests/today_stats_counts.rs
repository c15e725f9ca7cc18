mod common;

use common::offline_store;
use chrono::{NaiveDate, NaiveTime};
use rollcalld::model::{EventKind, EventSource};
use rollcalld::store::{NewEvent, StatScope};
use rollcalld::ReplicaStore;

fn record(store: &mut ReplicaStore, student: i64, kind: EventKind, date: NaiveDate, h: u32, m: u32) {
    store
        .record_event(NewEvent {
            student_id: student,
            kind,
            source: EventSource::Qr,
            timestamp: Some(date.and_time(NaiveTime::from_hms_opt(h, m, 0).expect("time"))),
            evidence_ref: None,
        })
        .expect("record");
}

#[test]
fn present_late_and_missing_are_counted_once_each() {
    let mut store = offline_store();
    // A Monday; seed schedule starts 08:00 for both courses.
    let date = NaiveDate::from_ymd_opt(2026, 8, 24).expect("date");

    record(&mut store, 1, EventKind::In, date, 7, 58);
    record(&mut store, 3, EventKind::In, date, 8, 25);
    // A duplicate scan later in the day must not double-count the student.
    record(&mut store, 3, EventKind::In, date, 8, 40);
    // Student 2 never shows up.

    let stats = store.stats_for(date, StatScope::School);
    assert_eq!(stats.total_in, 2);
    assert_eq!(stats.total_out, 0);
    assert_eq!(stats.late_count, 1);
    assert_eq!(stats.no_in_count, 1);
}

#[test]
fn out_events_count_distinct_students() {
    let mut store = offline_store();
    let date = NaiveDate::from_ymd_opt(2026, 8, 24).expect("date");
    record(&mut store, 1, EventKind::In, date, 8, 0);
    record(&mut store, 1, EventKind::Out, date, 14, 0);
    record(&mut store, 1, EventKind::Out, date, 14, 5);

    let stats = store.stats_for(date, StatScope::School);
    assert_eq!(stats.total_in, 1);
    assert_eq!(stats.total_out, 1);
}

#[test]
fn course_scope_ignores_other_courses() {
    let mut store = offline_store();
    let date = NaiveDate::from_ymd_opt(2026, 8, 24).expect("date");
    record(&mut store, 1, EventKind::In, date, 8, 0);
    record(&mut store, 2, EventKind::In, date, 8, 0);

    // Course 1 enrolls students 1 and 3.
    let stats = store.stats_for(date, StatScope::Course(1));
    assert_eq!(stats.total_in, 1);
    assert_eq!(stats.no_in_count, 1);
}

#[test]
fn events_on_other_days_are_invisible() {
    let mut store = offline_store();
    let mon = NaiveDate::from_ymd_opt(2026, 8, 24).expect("date");
    let tue = mon.succ_opt().expect("date");
    record(&mut store, 1, EventKind::In, mon, 8, 0);

    let stats = store.stats_for(tue, StatScope::School);
    assert_eq!(stats.total_in, 0);
    assert_eq!(stats.no_in_count, 3);
}
