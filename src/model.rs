use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// School-week day. Raw weekday integers never cross module boundaries;
/// calendar dates convert here and nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchoolDay {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
}

impl SchoolDay {
    /// None on Saturday/Sunday.
    pub fn from_date(date: NaiveDate) -> Option<SchoolDay> {
        match date.weekday() {
            chrono::Weekday::Mon => Some(SchoolDay::Mon),
            chrono::Weekday::Tue => Some(SchoolDay::Tue),
            chrono::Weekday::Wed => Some(SchoolDay::Wed),
            chrono::Weekday::Thu => Some(SchoolDay::Thu),
            chrono::Weekday::Fri => Some(SchoolDay::Fri),
            _ => None,
        }
    }

    /// Legacy snapshots stored weekdays as 1=Mon..5=Fri.
    pub fn from_monday1(n: i64) -> Option<SchoolDay> {
        match n {
            1 => Some(SchoolDay::Mon),
            2 => Some(SchoolDay::Tue),
            3 => Some(SchoolDay::Wed),
            4 => Some(SchoolDay::Thu),
            5 => Some(SchoolDay::Fri),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    Active,
    Deleted,
}

impl Default for RecordStatus {
    fn default() -> Self {
        RecordStatus::Active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeacherStatus {
    Active,
    Inactive,
    OnLeave,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    In,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventSource {
    Qr,
    Nfc,
    Manual,
    Biometric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvidencePref {
    None,
    Photo,
    Audio,
}

impl Default for EvidencePref {
    fn default() -> Self {
        EvidencePref::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceStatus {
    Online,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AbsenceKind {
    Illness,
    Appointment,
    Family,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
    Cancelled,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Relationship {
    Mother,
    Father,
    Grandparent,
    Sibling,
    Relative,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Channel {
    Email,
    Sms,
    Push,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationStatus {
    Pending,
    Delivered,
    Failed,
}

/// Operator role for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Director,
    Teacher,
    Parent,
    Kiosk,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Director => "DIRECTOR",
            Role::Teacher => "TEACHER",
            Role::Parent => "PARENT",
            Role::Kiosk => "KIOSK",
        }
    }

    pub fn parse(raw: &str) -> Option<Role> {
        match raw {
            "DIRECTOR" => Some(Role::Director),
            "TEACHER" => Some(Role::Teacher),
            "PARENT" => Some(Role::Parent),
            "KIOSK" => Some(Role::Kiosk),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub full_name: String,
    pub course_id: Option<i64>,
    pub photo_ref: Option<String>,
    #[serde(default)]
    pub evidence_pref: EvidencePref,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guardian {
    pub id: i64,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub student_ids: Vec<i64>,
    #[serde(default)]
    pub status: RecordStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub grade: String,
    #[serde(default)]
    pub status: RecordStatus,
    #[serde(default)]
    pub teacher_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: i64,
    pub course_id: i64,
    pub weekday: SchoolDay,
    pub in_time: NaiveTime,
    pub out_time: NaiveTime,
}

/// Date-scoped schedule override. `course_id: None` means the override is
/// global; `in_time: None` means no school that day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleException {
    pub id: i64,
    pub date: NaiveDate,
    pub course_id: Option<i64>,
    pub in_time: Option<NaiveTime>,
    pub out_time: Option<NaiveTime>,
    pub reason: Option<String>,
}

/// Append-only: events are never updated or individually deleted, only purged
/// by the student-delete cascade in offline mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEvent {
    pub id: i64,
    pub student_id: i64,
    pub kind: EventKind,
    pub timestamp: NaiveDateTime,
    pub source: EventSource,
    pub evidence_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: i64,
    pub gate: String,
    pub battery_pct: Option<u8>,
    #[serde(default)]
    pub pending_count: u32,
    pub last_sync: Option<NaiveDateTime>,
    pub status: DeviceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Absence {
    pub id: i64,
    pub student_id: i64,
    pub kind: AbsenceKind,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub status: RequestStatus,
    pub attachment_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizedPickup {
    pub id: i64,
    pub guardian_id: i64,
    pub full_name: String,
    pub relationship: Relationship,
    pub student_ids: Vec<i64>,
    #[serde(default)]
    pub has_qr: bool,
    #[serde(default)]
    pub has_photo: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    pub id: i64,
    pub student_id: i64,
    pub authorized_pickup_id: i64,
    pub scheduled_at: NaiveDateTime,
    pub status: WithdrawalStatus,
    /// Set once the pickup is completed at the gate.
    pub withdrawal_event_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    pub channel: Channel,
    pub status: NotificationStatus,
    pub created_at: NaiveDateTime,
    pub retry_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: i64,
    pub full_name: String,
    pub status: TeacherStatus,
    #[serde(default)]
    pub can_enroll_biometric: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Option<i64>,
    pub name: String,
}

/// Anything the replica keeps in an id-addressed collection.
pub(crate) trait Record: Clone {
    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);
}

macro_rules! impl_record {
    ($($ty:ty),+ $(,)?) => {
        $(impl Record for $ty {
            fn id(&self) -> i64 {
                self.id
            }
            fn set_id(&mut self, id: i64) {
                self.id = id;
            }
        })+
    };
}

impl_record!(
    Student,
    Guardian,
    Course,
    Schedule,
    ScheduleException,
    AttendanceEvent,
    Device,
    Absence,
    AuthorizedPickup,
    WithdrawalRequest,
    Notification,
    Teacher,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn school_day_skips_weekends() {
        // 2026-08-24 is a Monday.
        let mon = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        assert_eq!(SchoolDay::from_date(mon), Some(SchoolDay::Mon));
        assert_eq!(
            SchoolDay::from_date(mon + chrono::Days::new(4)),
            Some(SchoolDay::Fri)
        );
        assert_eq!(SchoolDay::from_date(mon + chrono::Days::new(5)), None);
        assert_eq!(SchoolDay::from_date(mon + chrono::Days::new(6)), None);
    }

    #[test]
    fn role_parse_rejects_unknown() {
        assert_eq!(Role::parse("PARENT"), Some(Role::Parent));
        assert_eq!(Role::parse("SUPERADMIN"), None);
        assert_eq!(Role::parse("parent"), None);
    }

    #[test]
    fn status_wire_names_match_server() {
        assert_eq!(
            serde_json::to_string(&TeacherStatus::OnLeave).unwrap(),
            "\"ON_LEAVE\""
        );
        assert_eq!(
            serde_json::to_string(&EventSource::Qr).unwrap(),
            "\"QR\""
        );
    }
}
