//! Operator identity, bootstrap, and tenant feature gating.
//!
//! Corrupt session state (a role outside the enumerated set, a parent with no
//! resolvable guardian, a failed bootstrap) is never surfaced as an error:
//! there is no well-defined user to report it against, so the store logs and
//! forces a clean logout instead.

use super::ReplicaStore;
use crate::error::StoreError;
use crate::model::{Guardian, Role, Tenant};
use crate::remote::Bootstrap;
use crate::storage::keys;
use serde_json::Value;
use std::collections::HashSet;

#[derive(Default)]
pub(crate) struct Session {
    pub role: Option<Role>,
    pub guardian_id: Option<i64>,
    pub token: Option<String>,
    pub tenant: Option<Tenant>,
    pub features: HashSet<String>,
}

impl ReplicaStore {
    /// Startup path: a stored credential wins over a cached role, and a
    /// bootstrap failure discards the stale session rather than trusting it.
    pub(crate) fn restore_session(&mut self) -> Result<(), StoreError> {
        let token = self.kv.get(keys::TOKEN).map_err(StoreError::Storage)?;
        match (token, self.api.is_some()) {
            (Some(token), true) => self.resume_remote(token),
            (Some(_), false) => {
                tracing::warn!("stored credential but no remote API, logging out");
                self.force_logout();
                Ok(())
            }
            (None, _) => self.resume_cached(),
        }
    }

    fn resume_remote(&mut self, token: String) -> Result<(), StoreError> {
        self.session.token = Some(token.clone());
        let outcome = match self.api.as_deref() {
            Some(api) => {
                api.auth(Some(&token));
                api.bootstrap()
            }
            None => return Err(StoreError::invalid("no remote API configured")),
        };
        match outcome {
            Ok(v) => match self.apply_bootstrap(&v) {
                Ok(()) => Ok(()),
                Err(e) => {
                    tracing::warn!(error = %e, "bootstrap response unusable, logging out");
                    self.force_logout();
                    Ok(())
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "bootstrap failed, discarding cached session");
                self.force_logout();
                Ok(())
            }
        }
    }

    fn resume_cached(&mut self) -> Result<(), StoreError> {
        let Some(raw) = self.kv.get(keys::ROLE).map_err(StoreError::Storage)? else {
            return Ok(());
        };
        let Some(role) = Role::parse(&raw) else {
            tracing::warn!(role = %raw, "stored role outside the enumerated set, logging out");
            self.force_logout();
            return Ok(());
        };
        if role == Role::Parent {
            let gid = self
                .kv
                .get(keys::GUARDIAN_ID)
                .map_err(StoreError::Storage)?
                .and_then(|s| s.parse::<i64>().ok());
            let resolvable = gid
                .map(|id| self.snapshot.guardians.iter().any(|g| g.id == id))
                .unwrap_or(false);
            if !resolvable {
                tracing::warn!("parent session without a resolvable guardian, logging out");
                self.force_logout();
                return Ok(());
            }
            self.session.guardian_id = gid;
        }
        self.session.role = Some(role);
        if let Some(raw) = self.kv.get(keys::TENANT).map_err(StoreError::Storage)? {
            self.session.tenant = serde_json::from_str(&raw).ok();
        }
        Ok(())
    }

    /// Exchange a bearer credential for a full session. On rejection nothing
    /// of the half-built session survives.
    pub fn login_with_token(&mut self, token: &str) -> Result<(), StoreError> {
        let outcome = match self.api.as_deref() {
            Some(api) => {
                api.auth(Some(token));
                api.bootstrap()
            }
            None => return Err(StoreError::invalid("no remote API configured")),
        };
        match outcome {
            Ok(v) => {
                self.session.token = Some(token.to_string());
                self.kv
                    .set(keys::TOKEN, token)
                    .map_err(StoreError::Storage)?;
                match self.apply_bootstrap(&v) {
                    Ok(()) => Ok(()),
                    Err(e) => {
                        self.force_logout();
                        Err(e)
                    }
                }
            }
            Err(e) => {
                self.force_logout();
                Err(e.into())
            }
        }
    }

    /// Credential-less operation: pick a role, mutate locally only.
    pub fn enter_demo(&mut self, role: Role, guardian_id: Option<i64>) -> Result<(), StoreError> {
        let guardian_id = if role == Role::Parent {
            let Some(gid) = guardian_id else {
                return Err(StoreError::invalid("a parent session requires a guardian"));
            };
            if !self.snapshot.guardians.iter().any(|g| g.id == gid) {
                return Err(StoreError::invalid(format!("guardian {gid} not found")));
            }
            Some(gid)
        } else {
            None
        };

        self.session.token = None;
        if let Some(api) = self.api.as_deref() {
            api.auth(None);
        }
        self.kv.remove(keys::TOKEN).map_err(StoreError::Storage)?;
        self.kv
            .set(keys::ROLE, role.as_str())
            .map_err(StoreError::Storage)?;
        match guardian_id {
            Some(gid) => self
                .kv
                .set(keys::GUARDIAN_ID, &gid.to_string())
                .map_err(StoreError::Storage)?,
            None => self.kv.remove(keys::GUARDIAN_ID).map_err(StoreError::Storage)?,
        }
        self.session.role = Some(role);
        self.session.guardian_id = guardian_id;
        Ok(())
    }

    pub fn logout(&mut self) {
        tracing::info!("logout");
        self.force_logout();
    }

    /// Best-effort wipe: session fields, credential, cached tenant. Storage
    /// hiccups are logged, not propagated; there is nobody to report them to.
    pub(crate) fn force_logout(&mut self) {
        self.session = Session::default();
        if let Some(api) = self.api.as_deref() {
            api.auth(None);
        }
        for key in [keys::ROLE, keys::GUARDIAN_ID, keys::TOKEN, keys::TENANT] {
            if let Err(e) = self.kv.remove(key) {
                tracing::warn!(key, error = %e, "failed to clear session key");
            }
        }
    }

    /// Apply a bootstrap bundle: any collection present fully replaces the
    /// local one, then the claimed identity is validated against the fresh
    /// data.
    pub(crate) fn apply_bootstrap(&mut self, v: &Value) -> Result<(), StoreError> {
        let boot: Bootstrap = serde_json::from_value(v.clone())?;

        if let Some(rows) = boot.students {
            self.snapshot.students = rows;
        }
        if let Some(rows) = boot.guardians {
            self.snapshot.guardians = rows;
        }
        if let Some(rows) = boot.courses {
            self.snapshot.courses = rows;
        }
        if let Some(rows) = boot.schedules {
            self.snapshot.schedules = rows;
        }
        if let Some(rows) = boot.schedule_exceptions {
            self.snapshot.schedule_exceptions = rows;
        }
        if let Some(rows) = boot.attendance_events {
            self.snapshot.attendance_events = rows;
        }
        if let Some(rows) = boot.devices {
            self.snapshot.devices = rows;
        }
        if let Some(rows) = boot.absences {
            self.snapshot.absences = rows;
        }
        if let Some(rows) = boot.authorized_pickups {
            self.snapshot.authorized_pickups = rows;
        }
        if let Some(rows) = boot.withdrawal_requests {
            self.snapshot.withdrawal_requests = rows;
        }
        if let Some(rows) = boot.notifications {
            self.snapshot.notifications = rows;
        }
        if let Some(rows) = boot.teachers {
            self.snapshot.teachers = rows;
        }
        if let Some(tenant) = boot.tenant {
            if let Ok(raw) = serde_json::to_string(&tenant) {
                if let Err(e) = self.kv.set(keys::TENANT, &raw) {
                    tracing::warn!(error = %e, "failed to cache tenant info");
                }
            }
            self.session.tenant = Some(tenant);
        }
        if let Some(features) = boot.features {
            self.session.features = features.into_iter().collect();
        }
        self.persist()?;

        if let Some(user) = boot.current_user {
            match user.role.as_deref() {
                Some(raw) => match Role::parse(raw) {
                    Some(Role::Parent) => {
                        let resolvable = user
                            .guardian_id
                            .map(|id| self.snapshot.guardians.iter().any(|g| g.id == id))
                            .unwrap_or(false);
                        if !resolvable {
                            tracing::warn!("bootstrap parent without resolvable guardian, logging out");
                            self.force_logout();
                            return Ok(());
                        }
                        self.session.role = Some(Role::Parent);
                        self.session.guardian_id = user.guardian_id;
                        self.kv
                            .set(keys::ROLE, Role::Parent.as_str())
                            .map_err(StoreError::Storage)?;
                        if let Some(gid) = user.guardian_id {
                            self.kv
                                .set(keys::GUARDIAN_ID, &gid.to_string())
                                .map_err(StoreError::Storage)?;
                        }
                    }
                    Some(role) => {
                        self.session.role = Some(role);
                        self.session.guardian_id = None;
                        self.kv
                            .set(keys::ROLE, role.as_str())
                            .map_err(StoreError::Storage)?;
                        self.kv
                            .remove(keys::GUARDIAN_ID)
                            .map_err(StoreError::Storage)?;
                    }
                    None => {
                        tracing::warn!(role = raw, "bootstrap role outside the enumerated set, logging out");
                        self.force_logout();
                        return Ok(());
                    }
                },
                None => {}
            }
        }
        Ok(())
    }

    pub fn current_role(&self) -> Option<Role> {
        self.session.role
    }

    pub fn current_guardian(&self) -> Option<&Guardian> {
        let gid = self.session.guardian_id?;
        self.snapshot.guardians.iter().find(|g| g.id == gid)
    }

    pub fn tenant(&self) -> Option<&Tenant> {
        self.session.tenant.as_ref()
    }

    /// Demo mode shows everything; authenticated mode is strict membership in
    /// the tenant's feature set.
    pub fn feature_enabled(&self, name: &str) -> bool {
        if self.session.token.is_none() {
            return true;
        }
        self.session.features.contains(name)
    }

    pub fn set_dark_mode(&self, on: bool) -> Result<(), StoreError> {
        self.kv
            .set(keys::DARK_MODE, if on { "1" } else { "0" })
            .map_err(StoreError::Storage)
    }

    pub fn dark_mode(&self) -> bool {
        matches!(self.kv.get(keys::DARK_MODE), Ok(Some(v)) if v == "1")
    }
}
