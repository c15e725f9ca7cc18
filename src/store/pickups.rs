use super::mutate::{apply_create, apply_restore, apply_soft_delete, apply_update, find, mode_of};
use super::ReplicaStore;
use crate::error::StoreError;
use crate::model::{AuthorizedPickup, Relationship, WithdrawalRequest, WithdrawalStatus};
use crate::remote::EntityKind;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPickup {
    pub guardian_id: i64,
    pub full_name: String,
    pub relationship: Relationship,
    pub student_ids: Vec<i64>,
    #[serde(default)]
    pub has_qr: bool,
    #[serde(default)]
    pub has_photo: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<Relationship>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_qr: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_photo: Option<bool>,
}

impl PickupPatch {
    fn apply(&self, row: &mut AuthorizedPickup) {
        if let Some(name) = &self.full_name {
            row.full_name = name.clone();
        }
        if let Some(rel) = self.relationship {
            row.relationship = rel;
        }
        if let Some(ids) = &self.student_ids {
            row.student_ids = ids.clone();
        }
        if let Some(q) = self.has_qr {
            row.has_qr = q;
        }
        if let Some(p) = self.has_photo {
            row.has_photo = p;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PickupFilter {
    pub guardian_id: Option<i64>,
    pub student_id: Option<i64>,
    pub active_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWithdrawal {
    pub student_id: i64,
    pub authorized_pickup_id: i64,
    pub scheduled_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default)]
pub struct WithdrawalFilter {
    pub student_id: Option<i64>,
    pub status: Option<WithdrawalStatus>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct WithdrawalPatch {
    status: WithdrawalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    withdrawal_event_id: Option<i64>,
}

impl ReplicaStore {
    pub fn pickups(&self, filter: &PickupFilter) -> Vec<AuthorizedPickup> {
        self.snapshot
            .authorized_pickups
            .iter()
            .filter(|p| filter.guardian_id.map_or(true, |gid| p.guardian_id == gid))
            .filter(|p| {
                filter
                    .student_id
                    .map_or(true, |sid| p.student_ids.contains(&sid))
            })
            .filter(|p| !filter.active_only || p.is_active)
            .cloned()
            .collect()
    }

    pub fn pickup(&self, id: i64) -> Option<&AuthorizedPickup> {
        find(&self.snapshot.authorized_pickups, id)
    }

    fn check_pickup_students(&self, student_ids: &[i64]) -> Result<(), StoreError> {
        if student_ids.is_empty() {
            return Err(StoreError::invalid(
                "a pickup must be authorized for at least one student",
            ));
        }
        for sid in student_ids {
            if find(&self.snapshot.students, *sid).is_none() {
                return Err(StoreError::invalid(format!("student {sid} not found")));
            }
        }
        Ok(())
    }

    pub fn add_pickup(&mut self, new: NewPickup) -> Result<AuthorizedPickup, StoreError> {
        let full_name = new.full_name.trim().to_string();
        if full_name.is_empty() {
            return Err(StoreError::invalid("pickup name must not be empty"));
        }
        if find(&self.snapshot.guardians, new.guardian_id).is_none() {
            return Err(StoreError::invalid(format!(
                "guardian {} not found",
                new.guardian_id
            )));
        }
        self.check_pickup_students(&new.student_ids)?;
        let draft = AuthorizedPickup {
            id: 0,
            guardian_id: new.guardian_id,
            full_name,
            relationship: new.relationship,
            student_ids: new.student_ids,
            has_qr: new.has_qr,
            has_photo: new.has_photo,
            is_active: true,
        };
        let mode = mode_of(&self.api, &self.session.token);
        let saved = apply_create(
            mode,
            EntityKind::AuthorizedPickup,
            &mut self.snapshot.authorized_pickups,
            draft,
        )?;
        self.persist()?;
        Ok(saved)
    }

    pub fn update_pickup(
        &mut self,
        id: i64,
        patch: PickupPatch,
    ) -> Result<AuthorizedPickup, StoreError> {
        if let Some(name) = &patch.full_name {
            if name.trim().is_empty() {
                return Err(StoreError::invalid("pickup name must not be empty"));
            }
        }
        if let Some(ids) = &patch.student_ids {
            self.check_pickup_students(ids)?;
        }
        let mode = mode_of(&self.api, &self.session.token);
        let saved = apply_update(
            mode,
            EntityKind::AuthorizedPickup,
            &mut self.snapshot.authorized_pickups,
            id,
            &patch,
            |row, p| p.apply(row),
        )?;
        self.persist()?;
        Ok(saved)
    }

    /// Soft deactivation; withdrawal requests keep referencing the row.
    pub fn deactivate_pickup(&mut self, id: i64) -> Result<AuthorizedPickup, StoreError> {
        let mode = mode_of(&self.api, &self.session.token);
        let saved = apply_soft_delete(
            mode,
            EntityKind::AuthorizedPickup,
            &mut self.snapshot.authorized_pickups,
            id,
            |p| p.is_active = false,
        )?;
        self.persist()?;
        Ok(saved)
    }

    pub fn restore_pickup(&mut self, id: i64) -> Result<AuthorizedPickup, StoreError> {
        let mode = mode_of(&self.api, &self.session.token);
        let saved = apply_restore(
            mode,
            EntityKind::AuthorizedPickup,
            &mut self.snapshot.authorized_pickups,
            id,
            |p| p.is_active = true,
        )?;
        self.persist()?;
        Ok(saved)
    }

    pub fn withdrawals(&self, filter: &WithdrawalFilter) -> Vec<WithdrawalRequest> {
        self.snapshot
            .withdrawal_requests
            .iter()
            .filter(|w| filter.student_id.map_or(true, |sid| w.student_id == sid))
            .filter(|w| filter.status.map_or(true, |s| w.status == s))
            .cloned()
            .collect()
    }

    pub fn withdrawal(&self, id: i64) -> Option<&WithdrawalRequest> {
        find(&self.snapshot.withdrawal_requests, id)
    }

    pub fn request_withdrawal(
        &mut self,
        new: NewWithdrawal,
    ) -> Result<WithdrawalRequest, StoreError> {
        if find(&self.snapshot.students, new.student_id).is_none() {
            return Err(StoreError::invalid(format!(
                "student {} not found",
                new.student_id
            )));
        }
        let Some(pickup) = find(&self.snapshot.authorized_pickups, new.authorized_pickup_id)
        else {
            return Err(StoreError::invalid(format!(
                "authorized pickup {} not found",
                new.authorized_pickup_id
            )));
        };
        if !pickup.is_active {
            return Err(StoreError::invalid("pickup person is deactivated"));
        }
        if !pickup.student_ids.contains(&new.student_id) {
            return Err(StoreError::invalid(
                "pickup person is not authorized for this student",
            ));
        }
        let draft = WithdrawalRequest {
            id: 0,
            student_id: new.student_id,
            authorized_pickup_id: new.authorized_pickup_id,
            scheduled_at: new.scheduled_at,
            status: WithdrawalStatus::Pending,
            withdrawal_event_id: None,
        };
        let mode = mode_of(&self.api, &self.session.token);
        let saved = apply_create(
            mode,
            EntityKind::WithdrawalRequest,
            &mut self.snapshot.withdrawal_requests,
            draft,
        )?;
        self.persist()?;
        Ok(saved)
    }

    fn transition_withdrawal(
        &mut self,
        id: i64,
        allowed_from: &[WithdrawalStatus],
        to: WithdrawalStatus,
        event_id: Option<i64>,
    ) -> Result<WithdrawalRequest, StoreError> {
        match find(&self.snapshot.withdrawal_requests, id) {
            Some(w) if !allowed_from.contains(&w.status) => {
                return Err(StoreError::invalid(format!(
                    "withdrawal request cannot move to {:?} from {:?}",
                    to, w.status
                )));
            }
            Some(_) => {}
            None => {
                return Err(StoreError::NotFound {
                    kind: EntityKind::WithdrawalRequest.label(),
                    id,
                })
            }
        }
        let patch = WithdrawalPatch {
            status: to,
            withdrawal_event_id: event_id,
        };
        let mode = mode_of(&self.api, &self.session.token);
        let saved = apply_update(
            mode,
            EntityKind::WithdrawalRequest,
            &mut self.snapshot.withdrawal_requests,
            id,
            &patch,
            |row, p| {
                row.status = p.status;
                if let Some(eid) = p.withdrawal_event_id {
                    row.withdrawal_event_id = Some(eid);
                }
            },
        )?;
        self.persist()?;
        Ok(saved)
    }

    pub fn decide_withdrawal(
        &mut self,
        id: i64,
        approve: bool,
    ) -> Result<WithdrawalRequest, StoreError> {
        let to = if approve {
            WithdrawalStatus::Approved
        } else {
            WithdrawalStatus::Rejected
        };
        self.transition_withdrawal(id, &[WithdrawalStatus::Pending], to, None)
    }

    pub fn cancel_withdrawal(&mut self, id: i64) -> Result<WithdrawalRequest, StoreError> {
        self.transition_withdrawal(
            id,
            &[WithdrawalStatus::Pending, WithdrawalStatus::Approved],
            WithdrawalStatus::Cancelled,
            None,
        )
    }

    /// Mark an approved request as carried out at the gate, linking the OUT
    /// event the caller just recorded.
    pub fn complete_withdrawal(
        &mut self,
        id: i64,
        event_id: Option<i64>,
    ) -> Result<WithdrawalRequest, StoreError> {
        self.transition_withdrawal(
            id,
            &[WithdrawalStatus::Approved],
            WithdrawalStatus::Completed,
            event_id,
        )
    }

    /// Local housekeeping only: flip overdue pending/approved requests to
    /// EXPIRED. Signed in, the server runs its own sweep.
    pub fn expire_due_withdrawals(&mut self, now: NaiveDateTime) -> Result<usize, StoreError> {
        if self.remote_active() {
            return Ok(0);
        }
        let mut expired = 0;
        for w in &mut self.snapshot.withdrawal_requests {
            let due = w.scheduled_at < now
                && matches!(
                    w.status,
                    WithdrawalStatus::Pending | WithdrawalStatus::Approved
                );
            if due {
                w.status = WithdrawalStatus::Expired;
                expired += 1;
            }
        }
        if expired > 0 {
            self.persist()?;
        }
        Ok(expired)
    }
}
