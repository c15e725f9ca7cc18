//! The one place that knows about the two write paths. Entity methods pick a
//! mode per call and delegate; they never branch on "am I authenticated"
//! themselves.

use crate::error::StoreError;
use crate::model::Record;
use crate::remote::{EntityKind, RemoteApi};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub(crate) enum WriteMode<'a> {
    /// Offline/demo: mutate in memory only, ids are `max+1`.
    Local,
    /// Authenticated: round-trip first, then reconcile memory from the
    /// server's representation.
    Remote(&'a dyn RemoteApi),
}

/// Re-evaluated on every mutation; a credential expiring mid-session routes
/// the next call offline without touching in-flight ones.
pub(crate) fn mode_of<'a>(
    api: &'a Option<Box<dyn RemoteApi>>,
    token: &Option<String>,
) -> WriteMode<'a> {
    match (api, token) {
        (Some(api), Some(_)) => WriteMode::Remote(api.as_ref()),
        _ => WriteMode::Local,
    }
}

pub(crate) fn next_id<T: Record>(coll: &[T]) -> i64 {
    coll.iter().map(|r| r.id()).max().unwrap_or(0) + 1
}

pub(crate) fn find<T: Record>(coll: &[T], id: i64) -> Option<&T> {
    coll.iter().find(|r| r.id() == id)
}

/// Replace-by-id, append if unseen. An update racing a stale local id must
/// never produce a duplicate row.
pub(crate) fn upsert<T: Record>(coll: &mut Vec<T>, row: T) {
    match coll.iter_mut().find(|r| r.id() == row.id()) {
        Some(slot) => *slot = row,
        None => coll.push(row),
    }
}

pub(crate) fn apply_create<T>(
    mode: WriteMode<'_>,
    kind: EntityKind,
    coll: &mut Vec<T>,
    mut draft: T,
) -> Result<T, StoreError>
where
    T: Record + Serialize + DeserializeOwned,
{
    match mode {
        WriteMode::Local => {
            draft.set_id(next_id(coll));
            coll.push(draft.clone());
            Ok(draft)
        }
        WriteMode::Remote(api) => {
            let payload = serde_json::to_value(&draft)?;
            let saved: T = serde_json::from_value(api.create(kind, &payload)?)?;
            upsert(coll, saved.clone());
            Ok(saved)
        }
    }
}

pub(crate) fn apply_update<T, P>(
    mode: WriteMode<'_>,
    kind: EntityKind,
    coll: &mut Vec<T>,
    id: i64,
    patch: &P,
    apply: impl FnOnce(&mut T, &P),
) -> Result<T, StoreError>
where
    T: Record + Serialize + DeserializeOwned,
    P: Serialize,
{
    match mode {
        WriteMode::Local => {
            let slot = coll
                .iter_mut()
                .find(|r| r.id() == id)
                .ok_or(StoreError::NotFound {
                    kind: kind.label(),
                    id,
                })?;
            apply(slot, patch);
            Ok(slot.clone())
        }
        WriteMode::Remote(api) => {
            let payload = serde_json::to_value(patch)?;
            let saved: T = serde_json::from_value(api.update(kind, id, &payload)?)?;
            upsert(coll, saved.clone());
            Ok(saved)
        }
    }
}

/// Status-flip delete for entities other rows still reference. The row stays
/// in the collection.
pub(crate) fn apply_soft_delete<T>(
    mode: WriteMode<'_>,
    kind: EntityKind,
    coll: &mut Vec<T>,
    id: i64,
    flip: impl FnOnce(&mut T),
) -> Result<T, StoreError>
where
    T: Record + Serialize + DeserializeOwned,
{
    let missing = StoreError::NotFound {
        kind: kind.label(),
        id,
    };
    match mode {
        WriteMode::Local => {
            let slot = coll.iter_mut().find(|r| r.id() == id).ok_or(missing)?;
            flip(slot);
            Ok(slot.clone())
        }
        WriteMode::Remote(api) => match api.delete(kind, id)? {
            Some(v) => {
                let saved: T = serde_json::from_value(v)?;
                upsert(coll, saved.clone());
                Ok(saved)
            }
            // Server answered with no body: flip the cached copy; it stays
            // authoritative at the next bootstrap.
            None => {
                let slot = coll.iter_mut().find(|r| r.id() == id).ok_or(missing)?;
                flip(slot);
                Ok(slot.clone())
            }
        },
    }
}

/// True removal. Cascades are the caller's business and run only offline.
pub(crate) fn apply_hard_delete<T>(
    mode: WriteMode<'_>,
    kind: EntityKind,
    coll: &mut Vec<T>,
    id: i64,
) -> Result<T, StoreError>
where
    T: Record,
{
    if let WriteMode::Remote(api) = mode {
        api.delete(kind, id)?;
    }
    let pos = coll
        .iter()
        .position(|r| r.id() == id)
        .ok_or(StoreError::NotFound {
            kind: kind.label(),
            id,
        })?;
    Ok(coll.remove(pos))
}

/// Inverse status flip. Idempotent: reviving an already-active row is a
/// no-op success.
pub(crate) fn apply_restore<T>(
    mode: WriteMode<'_>,
    kind: EntityKind,
    coll: &mut Vec<T>,
    id: i64,
    revive: impl FnOnce(&mut T),
) -> Result<T, StoreError>
where
    T: Record + Serialize + DeserializeOwned,
{
    match mode {
        WriteMode::Local => {
            let slot = coll
                .iter_mut()
                .find(|r| r.id() == id)
                .ok_or(StoreError::NotFound {
                    kind: kind.label(),
                    id,
                })?;
            revive(slot);
            Ok(slot.clone())
        }
        WriteMode::Remote(api) => {
            let saved: T = serde_json::from_value(api.restore(kind, id)?)?;
            upsert(coll, saved.clone());
            Ok(saved)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Device, DeviceStatus};

    fn dev(id: i64) -> Device {
        Device {
            id,
            gate: format!("gate-{id}"),
            battery_pct: None,
            pending_count: 0,
            last_sync: None,
            status: DeviceStatus::Online,
        }
    }

    #[test]
    fn next_id_is_max_plus_one_not_len() {
        assert_eq!(next_id::<Device>(&[]), 1);
        assert_eq!(next_id(&[dev(1), dev(7)]), 8);
        // A hole left by a delete is never reused.
        assert_eq!(next_id(&[dev(7)]), 8);
    }

    #[test]
    fn upsert_replaces_instead_of_duplicating() {
        let mut coll = vec![dev(1), dev(2)];
        let mut updated = dev(2);
        updated.gate = "side gate".to_string();
        upsert(&mut coll, updated);
        assert_eq!(coll.len(), 2);
        assert_eq!(coll[1].gate, "side gate");
        upsert(&mut coll, dev(9));
        assert_eq!(coll.len(), 3);
    }
}
