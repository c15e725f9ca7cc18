//! Derived numbers. Everything here is a linear pass over the snapshot,
//! recomputed on every call; at this data scale an index would be overhead.

use super::ReplicaStore;
use crate::model::{EventKind, SchoolDay, Student};
use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayStats {
    /// Students with at least one IN event.
    pub total_in: usize,
    /// Students with at least one OUT event.
    pub total_out: usize,
    /// Students whose first IN arrived after the scheduled in-time plus
    /// grace.
    pub late_count: usize,
    /// Enrolled students with no IN event.
    pub no_in_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatScope {
    School,
    Course(i64),
}

/// Effective school day for a course, after overlaying exceptions on the
/// weekly schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPlan {
    Closed,
    Open {
        in_time: NaiveTime,
        out_time: NaiveTime,
    },
}

impl ReplicaStore {
    pub fn today_stats(&self) -> TodayStats {
        self.stats_for(Local::now().date_naive(), StatScope::School)
    }

    pub fn stats_for(&self, date: NaiveDate, scope: StatScope) -> TodayStats {
        let in_scope = |s: &Student| match scope {
            StatScope::School => true,
            StatScope::Course(cid) => s.course_id == Some(cid),
        };
        let enrolled = self
            .snapshot
            .students
            .iter()
            .filter(|s| in_scope(s))
            .count();

        let mut first_in: HashMap<i64, NaiveDateTime> = HashMap::new();
        let mut out_students: HashSet<i64> = HashSet::new();
        for e in &self.snapshot.attendance_events {
            if e.timestamp.date() != date {
                continue;
            }
            let known = self
                .snapshot
                .students
                .iter()
                .any(|s| s.id == e.student_id && in_scope(s));
            if !known {
                continue;
            }
            match e.kind {
                EventKind::In => {
                    first_in
                        .entry(e.student_id)
                        .and_modify(|t| *t = (*t).min(e.timestamp))
                        .or_insert(e.timestamp);
                }
                EventKind::Out => {
                    out_students.insert(e.student_id);
                }
            }
        }

        let late_count = first_in
            .iter()
            .filter(|(sid, ts)| self.is_late(**sid, **ts))
            .count();

        TodayStats {
            total_in: first_in.len(),
            total_out: out_students.len(),
            late_count,
            no_in_count: enrolled.saturating_sub(first_in.len()),
        }
    }

    /// Strictly later than the scheduled in-time plus the configured grace.
    /// No schedule row for that weekday means nobody is late.
    fn is_late(&self, student_id: i64, ts: NaiveDateTime) -> bool {
        let Some(course_id) = self
            .snapshot
            .students
            .iter()
            .find(|s| s.id == student_id)
            .and_then(|s| s.course_id)
        else {
            return false;
        };
        let Some(day) = SchoolDay::from_date(ts.date()) else {
            return false;
        };
        let Some(in_time) = self
            .snapshot
            .schedules
            .iter()
            .find(|s| s.course_id == course_id && s.weekday == day)
            .map(|s| s.in_time)
        else {
            return false;
        };
        ts.time() > in_time + Duration::minutes(self.grace_minutes())
    }

    /// Days with an IN event over weekdays in range, inclusive. Holiday
    /// exceptions are deliberately not consulted; `day_plan` is the overlay
    /// view.
    pub fn attendance_percentage(&self, student_id: i64, from: NaiveDate, to: NaiveDate) -> f64 {
        let mut weekdays = 0usize;
        let mut present = 0usize;
        let mut date = from;
        while date <= to {
            if SchoolDay::from_date(date).is_some() {
                weekdays += 1;
                let attended = self.snapshot.attendance_events.iter().any(|e| {
                    e.student_id == student_id
                        && e.kind == EventKind::In
                        && e.timestamp.date() == date
                });
                if attended {
                    present += 1;
                }
            }
            date += Duration::days(1);
        }
        if weekdays == 0 {
            return 0.0;
        }
        100.0 * present as f64 / weekdays as f64
    }

    /// Course-scoped exceptions beat global ones; an exception without an
    /// in-time closes the day outright.
    pub fn day_plan(&self, course_id: i64, date: NaiveDate) -> DayPlan {
        let Some(day) = SchoolDay::from_date(date) else {
            return DayPlan::Closed;
        };
        let slot = self
            .snapshot
            .schedules
            .iter()
            .find(|s| s.course_id == course_id && s.weekday == day);

        let exception = self
            .snapshot
            .schedule_exceptions
            .iter()
            .filter(|e| e.date == date)
            .filter(|e| e.course_id.is_none() || e.course_id == Some(course_id))
            .max_by_key(|e| e.course_id.is_some());
        if let Some(e) = exception {
            return match e.in_time {
                None => DayPlan::Closed,
                Some(in_time) => {
                    let out_time = e
                        .out_time
                        .or(slot.map(|s| s.out_time))
                        .unwrap_or(in_time);
                    DayPlan::Open { in_time, out_time }
                }
            };
        }

        match slot {
            Some(s) => DayPlan::Open {
                in_time: s.in_time,
                out_time: s.out_time,
            },
            None => DayPlan::Closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{EventKind, EventSource};
    use crate::storage::MemoryKv;
    use crate::store::{NewEvent, NewStudent, ReplicaStore, ScheduleSlot, StatScope};
    use chrono::{NaiveDate, NaiveTime};

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn store_with_one_student() -> (ReplicaStore, i64, i64) {
        let mut store = ReplicaStore::open(Box::new(MemoryKv::new()), None).expect("open");
        let course = store.courses(&Default::default())[0].id;
        let student = store
            .add_student(NewStudent {
                full_name: "Test Kid".to_string(),
                course_id: Some(course),
                photo_ref: None,
                evidence_pref: Default::default(),
            })
            .expect("add student")
            .id;
        (store, course, student)
    }

    fn check_in(store: &mut ReplicaStore, student: i64, date: NaiveDate, time: NaiveTime) {
        store
            .record_event(NewEvent {
                student_id: student,
                kind: EventKind::In,
                source: EventSource::Manual,
                timestamp: Some(date.and_time(time)),
                evidence_ref: None,
            })
            .expect("record event");
    }

    #[test]
    fn arrival_exactly_on_time_is_not_late() {
        let (mut store, course, student) = store_with_one_student();
        // Seed schedule is 08:00; a Monday.
        let date = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        check_in(&mut store, student, date, t(8, 0));
        let stats = store.stats_for(date, StatScope::Course(course));
        assert_eq!(stats.late_count, 0);
        check_in(&mut store, student, date, t(8, 1));
        // Still judged by the earliest IN of the day.
        let stats = store.stats_for(date, StatScope::Course(course));
        assert_eq!(stats.late_count, 0);
    }

    #[test]
    fn grace_period_moves_the_late_boundary() {
        let (mut store, course, student) = store_with_one_student();
        let date = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        check_in(&mut store, student, date, t(8, 7));
        assert_eq!(store.stats_for(date, StatScope::Course(course)).late_count, 1);
        store.set_grace_minutes(10);
        assert_eq!(store.stats_for(date, StatScope::Course(course)).late_count, 0);
    }

    #[test]
    fn day_plan_prefers_course_exception_over_global() {
        let (mut store, course, _student) = store_with_one_student();
        let date = NaiveDate::from_ymd_opt(2026, 8, 26).unwrap();
        store
            .add_schedule_exception(crate::store::NewException {
                date,
                course_id: None,
                in_time: None,
                out_time: None,
                reason: Some("strike".to_string()),
            })
            .expect("global exception");
        assert_eq!(store.day_plan(course, date), crate::store::DayPlan::Closed);
        store
            .add_schedule_exception(crate::store::NewException {
                date,
                course_id: Some(course),
                in_time: Some(t(10, 0)),
                out_time: None,
                reason: None,
            })
            .expect("course exception");
        assert_eq!(
            store.day_plan(course, date),
            crate::store::DayPlan::Open {
                in_time: t(10, 0),
                out_time: t(14, 0)
            }
        );
    }

    #[test]
    fn day_plan_falls_back_to_weekly_schedule() {
        let (mut store, course, _student) = store_with_one_student();
        store
            .set_schedule(ScheduleSlot {
                course_id: course,
                weekday: crate::model::SchoolDay::Thu,
                in_time: t(9, 0),
                out_time: t(13, 0),
            })
            .expect("set schedule");
        let thursday = NaiveDate::from_ymd_opt(2026, 8, 27).unwrap();
        assert_eq!(
            store.day_plan(course, thursday),
            crate::store::DayPlan::Open {
                in_time: t(9, 0),
                out_time: t(13, 0)
            }
        );
        let saturday = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        assert_eq!(store.day_plan(course, saturday), crate::store::DayPlan::Closed);
    }

    #[test]
    fn percentage_counts_weekdays_only() {
        let (mut store, _course, student) = store_with_one_student();
        // Mon 2026-08-24 .. Sun 2026-08-30: five weekdays.
        let mon = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        let sun = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        check_in(&mut store, student, mon, t(8, 0));
        check_in(&mut store, student, mon.succ_opt().unwrap(), t(8, 0));
        let pct = store.attendance_percentage(student, mon, sun);
        assert!((pct - 40.0).abs() < 1e-9);
    }
}
