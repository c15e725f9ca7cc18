//! Guardian-initiated paperwork: absence justifications, authorized pickup
//! people, withdrawal requests, and the mirrored notification feed.

use crate::ipc::error::{err, ok, store_err};
use crate::ipc::helpers::{
    opt_bool, opt_field, opt_i64, parse_params, require_i64, to_result,
};
use crate::ipc::types::{AppState, Request};
use crate::model::RequestStatus;
use crate::store::{
    AbsenceFilter, NewAbsence, NewPickup, NewWithdrawal, NotificationFilter, PickupFilter,
    PickupPatch, WithdrawalFilter,
};
use chrono::Local;
use serde_json::json;

fn handle_absences_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let status = match opt_field(&req.id, &req.params, "status") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let filter = AbsenceFilter {
        student_id: opt_i64(&req.params, "studentId"),
        status,
    };
    to_result(&req.id, &state.store.absences(&filter))
}

fn handle_absences_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.absence(id) {
        Some(a) => to_result(&req.id, a),
        None => err(&req.id, "not_found", format!("absence {id} not found"), None),
    }
}

fn handle_absences_request(state: &mut AppState, req: &Request) -> serde_json::Value {
    let new: NewAbsence = match parse_params(&req.id, &req.params) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.request_absence(new) {
        Ok(saved) => to_result(&req.id, &saved),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_absences_decide(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let decision: Option<RequestStatus> = match opt_field(&req.id, &req.params, "decision") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(decision) = decision else {
        return err(&req.id, "bad_params", "missing decision", None);
    };
    match state.store.decide_absence(id, decision) {
        Ok(saved) => to_result(&req.id, &saved),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_absences_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.delete_absence(id) {
        Ok(()) => ok(&req.id, json!({ "deleted": true })),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_pickups_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let filter = PickupFilter {
        guardian_id: opt_i64(&req.params, "guardianId"),
        student_id: opt_i64(&req.params, "studentId"),
        active_only: opt_bool(&req.params, "activeOnly").unwrap_or(false),
    };
    to_result(&req.id, &state.store.pickups(&filter))
}

fn handle_pickups_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.pickup(id) {
        Some(p) => to_result(&req.id, p),
        None => err(&req.id, "not_found", format!("pickup {id} not found"), None),
    }
}

fn handle_pickups_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let new: NewPickup = match parse_params(&req.id, &req.params) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.add_pickup(new) {
        Ok(saved) => to_result(&req.id, &saved),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_pickups_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let patch: PickupPatch = match parse_params(&req.id, &req.params) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.update_pickup(id, patch) {
        Ok(saved) => to_result(&req.id, &saved),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_pickups_deactivate(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.deactivate_pickup(id) {
        Ok(saved) => to_result(&req.id, &saved),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_pickups_restore(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.restore_pickup(id) {
        Ok(saved) => to_result(&req.id, &saved),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_withdrawals_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let status = match opt_field(&req.id, &req.params, "status") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let filter = WithdrawalFilter {
        student_id: opt_i64(&req.params, "studentId"),
        status,
    };
    to_result(&req.id, &state.store.withdrawals(&filter))
}

fn handle_withdrawals_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.withdrawal(id) {
        Some(w) => to_result(&req.id, w),
        None => err(
            &req.id,
            "not_found",
            format!("withdrawal request {id} not found"),
            None,
        ),
    }
}

fn handle_withdrawals_request(state: &mut AppState, req: &Request) -> serde_json::Value {
    let new: NewWithdrawal = match parse_params(&req.id, &req.params) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.request_withdrawal(new) {
        Ok(saved) => to_result(&req.id, &saved),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_withdrawals_decide(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(approve) = opt_bool(&req.params, "approve") else {
        return err(&req.id, "bad_params", "missing approve", None);
    };
    match state.store.decide_withdrawal(id, approve) {
        Ok(saved) => to_result(&req.id, &saved),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_withdrawals_cancel(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.cancel_withdrawal(id) {
        Ok(saved) => to_result(&req.id, &saved),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_withdrawals_complete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let event_id = opt_i64(&req.params, "eventId");
    match state.store.complete_withdrawal(id, event_id) {
        Ok(saved) => to_result(&req.id, &saved),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_withdrawals_expire_due(state: &mut AppState, req: &Request) -> serde_json::Value {
    match state.store.expire_due_withdrawals(Local::now().naive_local()) {
        Ok(count) => ok(&req.id, json!({ "expired": count })),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_notifications_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let status = match opt_field(&req.id, &req.params, "status") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let channel = match opt_field(&req.id, &req.params, "channel") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let filter = NotificationFilter { status, channel };
    to_result(&req.id, &state.store.notifications(&filter))
}

fn handle_notifications_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.notification(id) {
        Some(n) => to_result(&req.id, n),
        None => err(
            &req.id,
            "not_found",
            format!("notification {id} not found"),
            None,
        ),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "absences.list" => Some(handle_absences_list(state, req)),
        "absences.get" => Some(handle_absences_get(state, req)),
        "absences.request" => Some(handle_absences_request(state, req)),
        "absences.decide" => Some(handle_absences_decide(state, req)),
        "absences.delete" => Some(handle_absences_delete(state, req)),
        "pickups.list" => Some(handle_pickups_list(state, req)),
        "pickups.get" => Some(handle_pickups_get(state, req)),
        "pickups.create" => Some(handle_pickups_create(state, req)),
        "pickups.update" => Some(handle_pickups_update(state, req)),
        "pickups.deactivate" => Some(handle_pickups_deactivate(state, req)),
        "pickups.restore" => Some(handle_pickups_restore(state, req)),
        "withdrawals.list" => Some(handle_withdrawals_list(state, req)),
        "withdrawals.get" => Some(handle_withdrawals_get(state, req)),
        "withdrawals.request" => Some(handle_withdrawals_request(state, req)),
        "withdrawals.decide" => Some(handle_withdrawals_decide(state, req)),
        "withdrawals.cancel" => Some(handle_withdrawals_cancel(state, req)),
        "withdrawals.complete" => Some(handle_withdrawals_complete(state, req)),
        "withdrawals.expireDue" => Some(handle_withdrawals_expire_due(state, req)),
        "notifications.list" => Some(handle_notifications_list(state, req)),
        "notifications.get" => Some(handle_notifications_get(state, req)),
        _ => None,
    }
}
