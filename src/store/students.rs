use super::cascade::run_cascades;
use super::mutate::{apply_create, apply_hard_delete, apply_update, find, mode_of};
use super::ReplicaStore;
use crate::error::StoreError;
use crate::model::{EvidencePref, Student};
use crate::remote::EntityKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub full_name: String,
    #[serde(default)]
    pub course_id: Option<i64>,
    #[serde(default)]
    pub photo_ref: Option<String>,
    #[serde(default)]
    pub evidence_pref: EvidencePref,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Double-Option: outer = "field present in patch", inner = new value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<Option<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_ref: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_pref: Option<EvidencePref>,
}

impl StudentPatch {
    fn apply(&self, row: &mut Student) {
        if let Some(name) = &self.full_name {
            row.full_name = name.clone();
        }
        if let Some(course_id) = self.course_id {
            row.course_id = course_id;
        }
        if let Some(photo_ref) = &self.photo_ref {
            row.photo_ref = photo_ref.clone();
        }
        if let Some(pref) = self.evidence_pref {
            row.evidence_pref = pref;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    pub course_id: Option<i64>,
    pub name: Option<String>,
}

impl ReplicaStore {
    pub fn students(&self, filter: &StudentFilter) -> Vec<Student> {
        let needle = filter.name.as_deref().map(|n| n.to_lowercase());
        self.snapshot
            .students
            .iter()
            .filter(|s| filter.course_id.map_or(true, |cid| s.course_id == Some(cid)))
            .filter(|s| {
                needle
                    .as_deref()
                    .map_or(true, |n| s.full_name.to_lowercase().contains(n))
            })
            .cloned()
            .collect()
    }

    pub fn student(&self, id: i64) -> Option<&Student> {
        find(&self.snapshot.students, id)
    }

    pub fn add_student(&mut self, new: NewStudent) -> Result<Student, StoreError> {
        let full_name = new.full_name.trim().to_string();
        if full_name.is_empty() {
            return Err(StoreError::invalid("student name must not be empty"));
        }
        if let Some(cid) = new.course_id {
            if find(&self.snapshot.courses, cid).is_none() {
                return Err(StoreError::invalid(format!("course {cid} not found")));
            }
        }
        let draft = Student {
            id: 0,
            full_name,
            course_id: new.course_id,
            photo_ref: new.photo_ref,
            evidence_pref: new.evidence_pref,
        };
        let mode = mode_of(&self.api, &self.session.token);
        let saved = apply_create(mode, EntityKind::Student, &mut self.snapshot.students, draft)?;
        self.persist()?;
        Ok(saved)
    }

    pub fn update_student(&mut self, id: i64, patch: StudentPatch) -> Result<Student, StoreError> {
        if let Some(name) = &patch.full_name {
            if name.trim().is_empty() {
                return Err(StoreError::invalid("student name must not be empty"));
            }
        }
        if let Some(Some(cid)) = patch.course_id {
            if find(&self.snapshot.courses, cid).is_none() {
                return Err(StoreError::invalid(format!("course {cid} not found")));
            }
        }
        let mode = mode_of(&self.api, &self.session.token);
        let saved = apply_update(
            mode,
            EntityKind::Student,
            &mut self.snapshot.students,
            id,
            &patch,
            |row, p| p.apply(row),
        )?;
        self.persist()?;
        Ok(saved)
    }

    /// True removal. Offline, the declared cascades also strip the student
    /// from guardians/pickups and purge their events; signed in, the server
    /// owns the cascade.
    pub fn delete_student(&mut self, id: i64) -> Result<(), StoreError> {
        let offline = !self.remote_active();
        let mode = mode_of(&self.api, &self.session.token);
        apply_hard_delete(mode, EntityKind::Student, &mut self.snapshot.students, id)?;
        if offline {
            run_cascades(&mut self.snapshot, EntityKind::Student, id);
        }
        self.persist()
    }
}
