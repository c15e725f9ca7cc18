mod common;

use chrono::{NaiveDate, NaiveTime};
use common::offline_store;
use rollcalld::model::{EventKind, EventSource, WithdrawalStatus};
use rollcalld::store::{NewEvent, NewWithdrawal};

fn at(h: u32, m: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 8, 24)
        .expect("date")
        .and_time(NaiveTime::from_hms_opt(h, m, 0).expect("time"))
}

#[test]
fn request_approve_complete_links_the_out_event() {
    let mut store = offline_store();
    let w = store
        .request_withdrawal(NewWithdrawal {
            student_id: 1,
            authorized_pickup_id: 1,
            scheduled_at: at(12, 0),
        })
        .expect("request");
    assert_eq!(w.status, WithdrawalStatus::Pending);

    let w = store.decide_withdrawal(w.id, true).expect("approve");
    assert_eq!(w.status, WithdrawalStatus::Approved);

    let out = store
        .record_event(NewEvent {
            student_id: 1,
            kind: EventKind::Out,
            source: EventSource::Qr,
            timestamp: Some(at(12, 5)),
            evidence_ref: None,
        })
        .expect("out event");
    let w = store.complete_withdrawal(w.id, Some(out.id)).expect("complete");
    assert_eq!(w.status, WithdrawalStatus::Completed);
    assert_eq!(w.withdrawal_event_id, Some(out.id));
}

#[test]
fn rejected_request_cannot_be_completed() {
    let mut store = offline_store();
    let w = store
        .request_withdrawal(NewWithdrawal {
            student_id: 1,
            authorized_pickup_id: 1,
            scheduled_at: at(12, 0),
        })
        .expect("request");
    let w = store.decide_withdrawal(w.id, false).expect("reject");
    assert_eq!(w.status, WithdrawalStatus::Rejected);
    assert!(store.complete_withdrawal(w.id, None).is_err());
    assert!(store.decide_withdrawal(w.id, true).is_err());
}

#[test]
fn unauthorized_or_inactive_pickup_is_refused() {
    let mut store = offline_store();
    // Pickup 1 covers students 1 and 2, not 3.
    assert!(store
        .request_withdrawal(NewWithdrawal {
            student_id: 3,
            authorized_pickup_id: 1,
            scheduled_at: at(12, 0),
        })
        .is_err());

    store.deactivate_pickup(1).expect("deactivate");
    assert!(store
        .request_withdrawal(NewWithdrawal {
            student_id: 1,
            authorized_pickup_id: 1,
            scheduled_at: at(12, 0),
        })
        .is_err());
}

#[test]
fn overdue_requests_expire_locally() {
    let mut store = offline_store();
    let w = store
        .request_withdrawal(NewWithdrawal {
            student_id: 1,
            authorized_pickup_id: 1,
            scheduled_at: at(12, 0),
        })
        .expect("request");

    // Not due yet.
    assert_eq!(store.expire_due_withdrawals(at(11, 0)).expect("sweep"), 0);
    assert_eq!(store.expire_due_withdrawals(at(12, 30)).expect("sweep"), 1);
    assert_eq!(
        store.withdrawal(w.id).expect("row").status,
        WithdrawalStatus::Expired
    );
    // Terminal states are left alone by later sweeps.
    assert_eq!(store.expire_due_withdrawals(at(13, 0)).expect("sweep"), 0);
}
