use super::mutate::{apply_create, apply_hard_delete, apply_update, find, mode_of};
use super::ReplicaStore;
use crate::error::StoreError;
use crate::model::{Absence, AbsenceKind, RequestStatus};
use crate::remote::EntityKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAbsence {
    pub student_id: i64,
    pub kind: AbsenceKind,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    #[serde(default)]
    pub attachment_ref: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AbsenceFilter {
    pub student_id: Option<i64>,
    pub status: Option<RequestStatus>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusPatch {
    status: RequestStatus,
}

impl ReplicaStore {
    pub fn absences(&self, filter: &AbsenceFilter) -> Vec<Absence> {
        self.snapshot
            .absences
            .iter()
            .filter(|a| filter.student_id.map_or(true, |sid| a.student_id == sid))
            .filter(|a| filter.status.map_or(true, |s| a.status == s))
            .cloned()
            .collect()
    }

    pub fn absence(&self, id: i64) -> Option<&Absence> {
        find(&self.snapshot.absences, id)
    }

    pub fn request_absence(&mut self, new: NewAbsence) -> Result<Absence, StoreError> {
        if find(&self.snapshot.students, new.student_id).is_none() {
            return Err(StoreError::invalid(format!(
                "student {} not found",
                new.student_id
            )));
        }
        if new.date_from > new.date_to {
            return Err(StoreError::invalid("absence range is inverted"));
        }
        let draft = Absence {
            id: 0,
            student_id: new.student_id,
            kind: new.kind,
            date_from: new.date_from,
            date_to: new.date_to,
            status: RequestStatus::Pending,
            attachment_ref: new.attachment_ref,
        };
        let mode = mode_of(&self.api, &self.session.token);
        let saved = apply_create(mode, EntityKind::Absence, &mut self.snapshot.absences, draft)?;
        self.persist()?;
        Ok(saved)
    }

    /// Approve or reject. Only a pending request can be decided.
    pub fn decide_absence(
        &mut self,
        id: i64,
        decision: RequestStatus,
    ) -> Result<Absence, StoreError> {
        if decision == RequestStatus::Pending {
            return Err(StoreError::invalid("a decision must approve or reject"));
        }
        match find(&self.snapshot.absences, id) {
            Some(a) if a.status != RequestStatus::Pending => {
                return Err(StoreError::invalid("absence request was already decided"));
            }
            Some(_) => {}
            None => {
                return Err(StoreError::NotFound {
                    kind: EntityKind::Absence.label(),
                    id,
                })
            }
        }
        let patch = StatusPatch { status: decision };
        let mode = mode_of(&self.api, &self.session.token);
        let saved = apply_update(
            mode,
            EntityKind::Absence,
            &mut self.snapshot.absences,
            id,
            &patch,
            |row, p| row.status = p.status,
        )?;
        self.persist()?;
        Ok(saved)
    }

    pub fn delete_absence(&mut self, id: i64) -> Result<(), StoreError> {
        let mode = mode_of(&self.api, &self.session.token);
        apply_hard_delete(mode, EntityKind::Absence, &mut self.snapshot.absences, id)?;
        self.persist()
    }
}
