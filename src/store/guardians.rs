use super::mutate::{apply_create, apply_restore, apply_soft_delete, apply_update, find, mode_of};
use super::ReplicaStore;
use crate::error::StoreError;
use crate::model::{Guardian, RecordStatus};
use crate::remote::EntityKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGuardian {
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub student_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardianPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_ids: Option<Vec<i64>>,
}

impl GuardianPatch {
    fn apply(&self, row: &mut Guardian) {
        if let Some(name) = &self.full_name {
            row.full_name = name.clone();
        }
        if let Some(phone) = &self.phone {
            row.phone = phone.clone();
        }
        if let Some(email) = &self.email {
            row.email = email.clone();
        }
        if let Some(ids) = &self.student_ids {
            row.student_ids = ids.clone();
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GuardianFilter {
    pub status: Option<RecordStatus>,
    pub name: Option<String>,
    pub student_id: Option<i64>,
}

impl ReplicaStore {
    pub fn guardians(&self, filter: &GuardianFilter) -> Vec<Guardian> {
        let needle = filter.name.as_deref().map(|n| n.to_lowercase());
        self.snapshot
            .guardians
            .iter()
            .filter(|g| filter.status.map_or(true, |s| g.status == s))
            .filter(|g| {
                filter
                    .student_id
                    .map_or(true, |sid| g.student_ids.contains(&sid))
            })
            .filter(|g| {
                needle
                    .as_deref()
                    .map_or(true, |n| g.full_name.to_lowercase().contains(n))
            })
            .cloned()
            .collect()
    }

    /// Soft-deleted guardians are still addressable by id.
    pub fn guardian(&self, id: i64) -> Option<&Guardian> {
        find(&self.snapshot.guardians, id)
    }

    fn check_students(&self, student_ids: &[i64]) -> Result<(), StoreError> {
        if student_ids.is_empty() {
            return Err(StoreError::invalid(
                "a guardian must be linked to at least one student",
            ));
        }
        for sid in student_ids {
            if find(&self.snapshot.students, *sid).is_none() {
                return Err(StoreError::invalid(format!("student {sid} not found")));
            }
        }
        Ok(())
    }

    pub fn add_guardian(&mut self, new: NewGuardian) -> Result<Guardian, StoreError> {
        let full_name = new.full_name.trim().to_string();
        if full_name.is_empty() {
            return Err(StoreError::invalid("guardian name must not be empty"));
        }
        self.check_students(&new.student_ids)?;
        let draft = Guardian {
            id: 0,
            full_name,
            phone: new.phone,
            email: new.email,
            student_ids: new.student_ids,
            status: RecordStatus::Active,
        };
        let mode = mode_of(&self.api, &self.session.token);
        let saved = apply_create(mode, EntityKind::Guardian, &mut self.snapshot.guardians, draft)?;
        self.persist()?;
        Ok(saved)
    }

    pub fn update_guardian(&mut self, id: i64, patch: GuardianPatch) -> Result<Guardian, StoreError> {
        if let Some(name) = &patch.full_name {
            if name.trim().is_empty() {
                return Err(StoreError::invalid("guardian name must not be empty"));
            }
        }
        if let Some(ids) = &patch.student_ids {
            self.check_students(ids)?;
        }
        let mode = mode_of(&self.api, &self.session.token);
        let saved = apply_update(
            mode,
            EntityKind::Guardian,
            &mut self.snapshot.guardians,
            id,
            &patch,
            |row, p| p.apply(row),
        )?;
        self.persist()?;
        Ok(saved)
    }

    /// Status flip, never removal: students and pickups keep referencing the
    /// row.
    pub fn delete_guardian(&mut self, id: i64) -> Result<Guardian, StoreError> {
        let mode = mode_of(&self.api, &self.session.token);
        let saved = apply_soft_delete(
            mode,
            EntityKind::Guardian,
            &mut self.snapshot.guardians,
            id,
            |g| g.status = RecordStatus::Deleted,
        )?;
        self.persist()?;
        Ok(saved)
    }

    pub fn restore_guardian(&mut self, id: i64) -> Result<Guardian, StoreError> {
        let mode = mode_of(&self.api, &self.session.token);
        let saved = apply_restore(
            mode,
            EntityKind::Guardian,
            &mut self.snapshot.guardians,
            id,
            |g| g.status = RecordStatus::Active,
        )?;
        self.persist()?;
        Ok(saved)
    }
}
