use super::mutate::{apply_create, apply_restore, apply_soft_delete, apply_update, find, mode_of};
use super::ReplicaStore;
use crate::error::StoreError;
use crate::model::{Course, Teacher, TeacherStatus};
use crate::remote::EntityKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeacher {
    pub full_name: String,
    #[serde(default)]
    pub can_enroll_biometric: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// ACTIVE/INACTIVE/ON_LEAVE moves; DELETED goes through `delete_teacher`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TeacherStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_enroll_biometric: Option<bool>,
}

impl TeacherPatch {
    fn apply(&self, row: &mut Teacher) {
        if let Some(name) = &self.full_name {
            row.full_name = name.clone();
        }
        if let Some(status) = self.status {
            row.status = status;
        }
        if let Some(b) = self.can_enroll_biometric {
            row.can_enroll_biometric = b;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TeacherFilter {
    pub status: Option<TeacherStatus>,
    pub name: Option<String>,
}

impl ReplicaStore {
    pub fn teachers(&self, filter: &TeacherFilter) -> Vec<Teacher> {
        let needle = filter.name.as_deref().map(|n| n.to_lowercase());
        self.snapshot
            .teachers
            .iter()
            .filter(|t| filter.status.map_or(true, |s| t.status == s))
            .filter(|t| {
                needle
                    .as_deref()
                    .map_or(true, |n| t.full_name.to_lowercase().contains(n))
            })
            .cloned()
            .collect()
    }

    pub fn teacher(&self, id: i64) -> Option<&Teacher> {
        find(&self.snapshot.teachers, id)
    }

    /// Derived, not stored: membership lives on the course side.
    pub fn courses_for_teacher(&self, teacher_id: i64) -> Vec<Course> {
        self.snapshot
            .courses
            .iter()
            .filter(|c| c.teacher_ids.contains(&teacher_id))
            .cloned()
            .collect()
    }

    pub fn add_teacher(&mut self, new: NewTeacher) -> Result<Teacher, StoreError> {
        let full_name = new.full_name.trim().to_string();
        if full_name.is_empty() {
            return Err(StoreError::invalid("teacher name must not be empty"));
        }
        let draft = Teacher {
            id: 0,
            full_name,
            status: TeacherStatus::Active,
            can_enroll_biometric: new.can_enroll_biometric,
        };
        let mode = mode_of(&self.api, &self.session.token);
        let saved = apply_create(mode, EntityKind::Teacher, &mut self.snapshot.teachers, draft)?;
        self.persist()?;
        Ok(saved)
    }

    pub fn update_teacher(&mut self, id: i64, patch: TeacherPatch) -> Result<Teacher, StoreError> {
        if let Some(name) = &patch.full_name {
            if name.trim().is_empty() {
                return Err(StoreError::invalid("teacher name must not be empty"));
            }
        }
        if patch.status == Some(TeacherStatus::Deleted) {
            return Err(StoreError::invalid(
                "use the delete operation to retire a teacher",
            ));
        }
        let mode = mode_of(&self.api, &self.session.token);
        let saved = apply_update(
            mode,
            EntityKind::Teacher,
            &mut self.snapshot.teachers,
            id,
            &patch,
            |row, p| p.apply(row),
        )?;
        self.persist()?;
        Ok(saved)
    }

    pub fn delete_teacher(&mut self, id: i64) -> Result<Teacher, StoreError> {
        let mode = mode_of(&self.api, &self.session.token);
        let saved = apply_soft_delete(
            mode,
            EntityKind::Teacher,
            &mut self.snapshot.teachers,
            id,
            |t| t.status = TeacherStatus::Deleted,
        )?;
        self.persist()?;
        Ok(saved)
    }

    /// Idempotent: restoring a teacher who is already active (or on leave)
    /// changes nothing and still succeeds.
    pub fn restore_teacher(&mut self, id: i64) -> Result<Teacher, StoreError> {
        let mode = mode_of(&self.api, &self.session.token);
        let saved = apply_restore(
            mode,
            EntityKind::Teacher,
            &mut self.snapshot.teachers,
            id,
            |t| {
                if t.status == TeacherStatus::Deleted {
                    t.status = TeacherStatus::Active;
                }
            },
        )?;
        self.persist()?;
        Ok(saved)
    }
}
