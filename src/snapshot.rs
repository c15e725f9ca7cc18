use crate::model::{
    Absence, AttendanceEvent, AuthorizedPickup, Course, Device, Guardian, Notification, Schedule,
    ScheduleException, SchoolDay, Student, Teacher, WithdrawalRequest,
};
use crate::remote::EntityKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Bump when an entity shape changes incompatibly; add a step to
/// `migrate_value` alongside.
pub const SNAPSHOT_VERSION: u32 = 1;

/// The whole replica, serialized to a single durable key after every
/// mutation. No partial writes, no batching.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub guardians: Vec<Guardian>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
    #[serde(default)]
    pub schedule_exceptions: Vec<ScheduleException>,
    #[serde(default)]
    pub attendance_events: Vec<AttendanceEvent>,
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub absences: Vec<Absence>,
    #[serde(default)]
    pub authorized_pickups: Vec<AuthorizedPickup>,
    #[serde(default)]
    pub withdrawal_requests: Vec<WithdrawalRequest>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub teachers: Vec<Teacher>,
}

impl Snapshot {
    pub fn empty() -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            ..Snapshot::default()
        }
    }

    /// Parse a persisted snapshot, migrating older envelopes. `None` means
    /// the stored text is unusable; the caller re-seeds and logs, the user
    /// never sees it.
    pub fn parse(raw: &str) -> Option<Snapshot> {
        let mut value: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "persisted snapshot is not valid JSON");
                return None;
            }
        };
        if let Err(e) = migrate_value(&mut value) {
            tracing::warn!(error = %e, "persisted snapshot migration failed");
            return None;
        }
        match serde_json::from_value::<Snapshot>(value) {
            Ok(mut snap) => {
                snap.version = SNAPSHOT_VERSION;
                Some(snap)
            }
            Err(e) => {
                tracing::warn!(error = %e, "persisted snapshot has an unusable shape");
                None
            }
        }
    }

    /// Replace one collection from a remote `list` answer, which is either a
    /// bare array or `{items, total}`.
    pub fn replace_collection(&mut self, kind: EntityKind, v: &Value) -> Result<(), serde_json::Error> {
        let items = v.get("items").unwrap_or(v).clone();
        match kind {
            EntityKind::Student => self.students = serde_json::from_value(items)?,
            EntityKind::Guardian => self.guardians = serde_json::from_value(items)?,
            EntityKind::Course => self.courses = serde_json::from_value(items)?,
            EntityKind::Schedule => self.schedules = serde_json::from_value(items)?,
            EntityKind::ScheduleException => {
                self.schedule_exceptions = serde_json::from_value(items)?
            }
            EntityKind::AttendanceEvent => self.attendance_events = serde_json::from_value(items)?,
            EntityKind::Device => self.devices = serde_json::from_value(items)?,
            EntityKind::Absence => self.absences = serde_json::from_value(items)?,
            EntityKind::AuthorizedPickup => {
                self.authorized_pickups = serde_json::from_value(items)?
            }
            EntityKind::WithdrawalRequest => {
                self.withdrawal_requests = serde_json::from_value(items)?
            }
            EntityKind::Notification => self.notifications = serde_json::from_value(items)?,
            EntityKind::Teacher => self.teachers = serde_json::from_value(items)?,
        }
        Ok(())
    }
}

/// v0 -> v1: schedule weekdays were stored as 1=Mon..5=Fri integers; they are
/// named days now. Rows with out-of-range integers are dropped rather than
/// guessed at.
fn migrate_value(value: &mut Value) -> Result<(), String> {
    let version = value.get("version").and_then(|v| v.as_u64()).unwrap_or(0);
    if version >= u64::from(SNAPSHOT_VERSION) {
        return Ok(());
    }

    let Some(schedules) = value.get_mut("schedules").and_then(|v| v.as_array_mut()) else {
        return Ok(());
    };
    let mut migrated = Vec::with_capacity(schedules.len());
    for row in schedules.drain(..) {
        let Some(n) = row.get("weekday").and_then(|w| w.as_i64()) else {
            migrated.push(row);
            continue;
        };
        match SchoolDay::from_monday1(n) {
            Some(day) => {
                let mut row = row;
                row["weekday"] = serde_json::to_value(day).map_err(|e| e.to_string())?;
                migrated.push(row);
            }
            None => {
                tracing::warn!(weekday = n, "dropping schedule row with out-of-range weekday");
            }
        }
    }
    *schedules = migrated;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_json_yields_none() {
        assert!(Snapshot::parse("{not json").is_none());
        assert!(Snapshot::parse("[1,2,3]").is_none());
    }

    #[test]
    fn missing_collections_default_empty() {
        let snap = Snapshot::parse(r#"{"version":1}"#).expect("parse");
        assert!(snap.students.is_empty());
        assert!(snap.notifications.is_empty());
    }

    #[test]
    fn v0_integer_weekdays_become_named_days() {
        let raw = r#"{
            "schedules": [
                {"id":1,"courseId":7,"weekday":1,"inTime":"08:00:00","outTime":"14:00:00"},
                {"id":2,"courseId":7,"weekday":5,"inTime":"08:30:00","outTime":"13:00:00"},
                {"id":3,"courseId":7,"weekday":9,"inTime":"08:00:00","outTime":"14:00:00"}
            ]
        }"#;
        let snap = Snapshot::parse(raw).expect("parse v0");
        assert_eq!(snap.version, SNAPSHOT_VERSION);
        // The out-of-range row is dropped, the rest are renamed.
        assert_eq!(snap.schedules.len(), 2);
        assert_eq!(snap.schedules[0].weekday, SchoolDay::Mon);
        assert_eq!(snap.schedules[1].weekday, SchoolDay::Fri);
    }

    #[test]
    fn current_version_passes_through_untouched() {
        let snap = Snapshot::parse(
            r#"{"version":1,"schedules":[{"id":1,"courseId":7,"weekday":"WED","inTime":"08:00:00","outTime":"14:00:00"}]}"#,
        )
        .expect("parse v1");
        assert_eq!(snap.schedules[0].weekday, SchoolDay::Wed);
    }
}
