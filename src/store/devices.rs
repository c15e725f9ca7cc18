use super::mutate::{apply_create, apply_hard_delete, apply_update, find, mode_of};
use super::ReplicaStore;
use crate::error::StoreError;
use crate::model::{Device, DeviceStatus};
use crate::remote::EntityKind;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDevice {
    pub gate: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevicePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_pct: Option<Option<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<Option<NaiveDateTime>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DeviceStatus>,
}

impl DevicePatch {
    fn apply(&self, row: &mut Device) {
        if let Some(gate) = &self.gate {
            row.gate = gate.clone();
        }
        if let Some(b) = self.battery_pct {
            row.battery_pct = b;
        }
        if let Some(p) = self.pending_count {
            row.pending_count = p;
        }
        if let Some(ls) = self.last_sync {
            row.last_sync = ls;
        }
        if let Some(s) = self.status {
            row.status = s;
        }
    }
}

impl ReplicaStore {
    pub fn devices(&self) -> Vec<Device> {
        self.snapshot.devices.clone()
    }

    pub fn device(&self, id: i64) -> Option<&Device> {
        find(&self.snapshot.devices, id)
    }

    pub fn register_device(&mut self, new: NewDevice) -> Result<Device, StoreError> {
        let gate = new.gate.trim().to_string();
        if gate.is_empty() {
            return Err(StoreError::invalid("device gate must not be empty"));
        }
        let draft = Device {
            id: 0,
            gate,
            battery_pct: None,
            pending_count: 0,
            last_sync: None,
            status: DeviceStatus::Online,
        };
        let mode = mode_of(&self.api, &self.session.token);
        let saved = apply_create(mode, EntityKind::Device, &mut self.snapshot.devices, draft)?;
        self.persist()?;
        Ok(saved)
    }

    pub fn update_device(&mut self, id: i64, patch: DevicePatch) -> Result<Device, StoreError> {
        let mode = mode_of(&self.api, &self.session.token);
        let saved = apply_update(
            mode,
            EntityKind::Device,
            &mut self.snapshot.devices,
            id,
            &patch,
            |row, p| p.apply(row),
        )?;
        self.persist()?;
        Ok(saved)
    }

    pub fn delete_device(&mut self, id: i64) -> Result<(), StoreError> {
        let mode = mode_of(&self.api, &self.session.token);
        apply_hard_delete(mode, EntityKind::Device, &mut self.snapshot.devices, id)?;
        self.persist()
    }
}
