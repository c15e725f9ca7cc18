//! The Local Replica Store: one owned instance, constructed at startup and
//! handed by reference to whatever consumes it. Every view reads from it
//! synchronously; every mutation funnels through the write strategy in
//! `mutate` and ends with a whole-snapshot persist.

mod absences;
mod attendance;
mod cascade;
mod courses;
mod devices;
mod guardians;
mod mutate;
mod notifications;
mod pickups;
mod session;
mod stats;
mod students;
mod teachers;

pub use absences::{AbsenceFilter, NewAbsence};
pub use attendance::{EventFilter, NewEvent};
pub use courses::{CourseFilter, CoursePatch, NewCourse, NewException, ScheduleSlot};
pub use devices::{DevicePatch, NewDevice};
pub use guardians::{GuardianFilter, GuardianPatch, NewGuardian};
pub use notifications::NotificationFilter;
pub use pickups::{NewPickup, NewWithdrawal, PickupFilter, PickupPatch, WithdrawalFilter};
pub use stats::{DayPlan, StatScope, TodayStats};
pub use students::{NewStudent, StudentFilter, StudentPatch};
pub use teachers::{NewTeacher, TeacherFilter, TeacherPatch};

use crate::error::StoreError;
use crate::remote::{EntityKind, RemoteApi};
use crate::seed;
use crate::snapshot::Snapshot;
use crate::storage::{keys, KeyValue};
use chrono::NaiveDate;

pub struct ReplicaStore {
    pub(crate) kv: Box<dyn KeyValue>,
    pub(crate) api: Option<Box<dyn RemoteApi>>,
    pub(crate) snapshot: Snapshot,
    pub(crate) session: session::Session,
    grace_minutes: i64,
}

impl ReplicaStore {
    /// An empty, uninitialized store. Call `initialize` (or use `open`)
    /// before serving reads.
    pub fn new(kv: Box<dyn KeyValue>, api: Option<Box<dyn RemoteApi>>) -> ReplicaStore {
        ReplicaStore {
            kv,
            api,
            snapshot: Snapshot::empty(),
            session: session::Session::default(),
            grace_minutes: 0,
        }
    }

    pub fn open(
        kv: Box<dyn KeyValue>,
        api: Option<Box<dyn RemoteApi>>,
    ) -> Result<ReplicaStore, StoreError> {
        let mut store = ReplicaStore::new(kv, api);
        store.initialize()?;
        Ok(store)
    }

    /// Load the persisted snapshot (seeding demo data when absent or
    /// unusable), then restore the session, preferring a server bootstrap
    /// over anything cached locally.
    pub fn initialize(&mut self) -> Result<(), StoreError> {
        let stored = self.kv.get(keys::SNAPSHOT).map_err(StoreError::Storage)?;
        self.snapshot = match stored.as_deref() {
            Some(raw) if !raw.trim().is_empty() => match Snapshot::parse(raw) {
                Some(snap) => snap,
                None => {
                    tracing::warn!("stored snapshot unusable, re-seeding demo data");
                    seed::demo_snapshot()
                }
            },
            _ => {
                tracing::info!("no stored snapshot, seeding demo data");
                seed::demo_snapshot()
            }
        };
        self.persist()?;
        self.restore_session()
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Minutes past the scheduled in-time before an arrival counts as late.
    /// One knob for both dashboards and reports.
    pub fn set_grace_minutes(&mut self, minutes: i64) {
        self.grace_minutes = minutes.max(0);
    }

    pub fn grace_minutes(&self) -> i64 {
        self.grace_minutes
    }

    pub fn remote_active(&self) -> bool {
        self.api.is_some() && self.session.token.is_some()
    }

    /// Whole-snapshot write-through after every mutation.
    pub(crate) fn persist(&self) -> Result<(), StoreError> {
        let raw = serde_json::to_string(&self.snapshot)?;
        self.kv
            .set(keys::SNAPSHOT, &raw)
            .map_err(StoreError::Storage)
    }

    /// Re-pull every collection from the remote side. Authenticated only.
    pub fn refresh(&mut self) -> Result<(), StoreError> {
        if self.session.token.is_none() {
            return Err(StoreError::invalid("refresh requires a signed-in session"));
        }
        let Some(api) = self.api.as_deref() else {
            return Err(StoreError::invalid("refresh requires a remote API"));
        };
        const ALL: [EntityKind; 12] = [
            EntityKind::Student,
            EntityKind::Guardian,
            EntityKind::Course,
            EntityKind::Schedule,
            EntityKind::ScheduleException,
            EntityKind::AttendanceEvent,
            EntityKind::Device,
            EntityKind::Absence,
            EntityKind::AuthorizedPickup,
            EntityKind::WithdrawalRequest,
            EntityKind::Notification,
            EntityKind::Teacher,
        ];
        for kind in ALL {
            let v = api.list(kind)?;
            self.snapshot.replace_collection(kind, &v)?;
        }
        self.persist()
    }

    fn signed_in_api(&self) -> Result<&dyn RemoteApi, StoreError> {
        if self.session.token.is_none() {
            return Err(StoreError::invalid("only available when signed in"));
        }
        self.api
            .as_deref()
            .ok_or_else(|| StoreError::invalid("only available when signed in"))
    }

    /// Bearer-authenticated photo/audio bytes. Demo mode has no remote blobs.
    pub fn fetch_media(&self, media_ref: &str) -> Result<Vec<u8>, StoreError> {
        Ok(self.signed_in_api()?.fetch_media(media_ref)?)
    }

    pub fn export_attendance_csv(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<u8>, StoreError> {
        let query = [("from", from.to_string()), ("to", to.to_string())];
        Ok(self
            .signed_in_api()?
            .export_csv(EntityKind::AttendanceEvent, &query)?)
    }
}
