use super::mutate::{apply_create, find, mode_of};
use super::ReplicaStore;
use crate::error::StoreError;
use crate::model::{AttendanceEvent, EventKind, EventSource, EvidencePref};
use crate::remote::EntityKind;
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub student_id: i64,
    pub kind: EventKind,
    pub source: EventSource,
    /// Defaults to the wall clock when the gate device does not stamp one.
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(default)]
    pub evidence_ref: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub student_id: Option<i64>,
    pub course_id: Option<i64>,
    pub kind: Option<EventKind>,
    pub source: Option<EventSource>,
    /// Inclusive, day-granularity bounds on the event timestamp.
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ReplicaStore {
    /// Newest first; events with equal timestamps keep insertion order.
    pub fn events(&self, filter: &EventFilter) -> Vec<AttendanceEvent> {
        let mut out: Vec<AttendanceEvent> = self
            .snapshot
            .attendance_events
            .iter()
            .filter(|e| filter.student_id.map_or(true, |sid| e.student_id == sid))
            .filter(|e| {
                filter.course_id.map_or(true, |cid| {
                    find(&self.snapshot.students, e.student_id)
                        .map_or(false, |s| s.course_id == Some(cid))
                })
            })
            .filter(|e| filter.kind.map_or(true, |k| e.kind == k))
            .filter(|e| filter.source.map_or(true, |s| e.source == s))
            .filter(|e| filter.from.map_or(true, |d| e.timestamp.date() >= d))
            .filter(|e| filter.to.map_or(true, |d| e.timestamp.date() <= d))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        out
    }

    pub fn event(&self, id: i64) -> Option<&AttendanceEvent> {
        find(&self.snapshot.attendance_events, id)
    }

    /// Append-only: the event log is the nearest thing to a ledger here, so
    /// there is no update or single-event delete path.
    pub fn record_event(&mut self, new: NewEvent) -> Result<AttendanceEvent, StoreError> {
        let Some(student) = find(&self.snapshot.students, new.student_id) else {
            return Err(StoreError::invalid(format!(
                "student {} not found",
                new.student_id
            )));
        };
        // Offline capture stores the blob locally; the store mints the ref.
        let evidence_ref = match new.evidence_ref {
            Some(r) => Some(r),
            None if !self.remote_active() && student.evidence_pref != EvidencePref::None => {
                Some(format!("local-{}", Uuid::new_v4()))
            }
            None => None,
        };
        let draft = AttendanceEvent {
            id: 0,
            student_id: new.student_id,
            kind: new.kind,
            timestamp: new
                .timestamp
                .unwrap_or_else(|| Local::now().naive_local()),
            source: new.source,
            evidence_ref,
        };
        let mode = mode_of(&self.api, &self.session.token);
        let saved = apply_create(
            mode,
            EntityKind::AttendanceEvent,
            &mut self.snapshot.attendance_events,
            draft,
        )?;
        self.persist()?;
        Ok(saved)
    }
}
