use crate::model::*;
use crate::snapshot::Snapshot;
use chrono::{NaiveDate, NaiveTime};

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).expect("seed time")
}

/// Built-in demo dataset, loaded once when the durable snapshot key is absent
/// or unreadable. Small on purpose: enough rows to drive every screen.
pub fn demo_snapshot() -> Snapshot {
    let mut snap = Snapshot::empty();

    snap.courses = vec![
        Course {
            id: 1,
            name: "1A".to_string(),
            grade: "1".to_string(),
            status: RecordStatus::Active,
            teacher_ids: vec![1],
        },
        Course {
            id: 2,
            name: "2B".to_string(),
            grade: "2".to_string(),
            status: RecordStatus::Active,
            teacher_ids: vec![2],
        },
    ];

    snap.teachers = vec![
        Teacher {
            id: 1,
            full_name: "Lucía Herrera".to_string(),
            status: TeacherStatus::Active,
            can_enroll_biometric: true,
        },
        Teacher {
            id: 2,
            full_name: "Marcos Vidal".to_string(),
            status: TeacherStatus::Active,
            can_enroll_biometric: false,
        },
    ];

    snap.students = vec![
        Student {
            id: 1,
            full_name: "Ana Robles".to_string(),
            course_id: Some(1),
            photo_ref: None,
            evidence_pref: EvidencePref::Photo,
        },
        Student {
            id: 2,
            full_name: "Bruno Robles".to_string(),
            course_id: Some(2),
            photo_ref: None,
            evidence_pref: EvidencePref::None,
        },
        Student {
            id: 3,
            full_name: "Carla Miranda".to_string(),
            course_id: Some(1),
            photo_ref: None,
            evidence_pref: EvidencePref::None,
        },
    ];

    snap.guardians = vec![Guardian {
        id: 1,
        full_name: "Paula Robles".to_string(),
        phone: Some("+54 11 5555-0101".to_string()),
        email: Some("paula@example.com".to_string()),
        student_ids: vec![1, 2],
        status: RecordStatus::Active,
    }];

    // Mon-Fri, one row per course per weekday.
    let weekdays = [
        SchoolDay::Mon,
        SchoolDay::Tue,
        SchoolDay::Wed,
        SchoolDay::Thu,
        SchoolDay::Fri,
    ];
    let mut id = 0;
    for course in &snap.courses {
        for day in weekdays {
            id += 1;
            snap.schedules.push(Schedule {
                id,
                course_id: course.id,
                weekday: day,
                in_time: t(8, 0),
                out_time: t(14, 0),
            });
        }
    }

    snap.schedule_exceptions = vec![ScheduleException {
        id: 1,
        date: NaiveDate::from_ymd_opt(2026, 7, 9).expect("seed date"),
        course_id: None,
        in_time: None,
        out_time: None,
        reason: Some("Independence Day".to_string()),
    }];

    snap.devices = vec![Device {
        id: 1,
        gate: "Main gate".to_string(),
        battery_pct: Some(87),
        pending_count: 0,
        last_sync: None,
        status: DeviceStatus::Online,
    }];

    snap.authorized_pickups = vec![AuthorizedPickup {
        id: 1,
        guardian_id: 1,
        full_name: "Jorge Robles".to_string(),
        relationship: Relationship::Grandparent,
        student_ids: vec![1, 2],
        has_qr: true,
        has_photo: false,
        is_active: true,
    }];

    snap
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_data_is_internally_consistent() {
        let snap = demo_snapshot();
        for s in &snap.students {
            if let Some(cid) = s.course_id {
                assert!(snap.courses.iter().any(|c| c.id == cid));
            }
        }
        for g in &snap.guardians {
            for sid in &g.student_ids {
                assert!(snap.students.iter().any(|s| s.id == *sid));
            }
        }
        // One schedule row per (course, weekday).
        for sc in &snap.schedules {
            let dup = snap
                .schedules
                .iter()
                .filter(|o| o.course_id == sc.course_id && o.weekday == sc.weekday)
                .count();
            assert_eq!(dup, 1);
        }
    }
}
