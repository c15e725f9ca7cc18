use crate::ipc::error::{err, store_err};
use crate::ipc::helpers::{opt_field, opt_i64, opt_str, parse_params, require_i64, to_result};
use crate::ipc::types::{AppState, Request};
use crate::store::{GuardianFilter, GuardianPatch, NewGuardian};

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let status = match opt_field(&req.id, &req.params, "status") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let filter = GuardianFilter {
        status,
        name: opt_str(&req.params, "name"),
        student_id: opt_i64(&req.params, "studentId"),
    };
    to_result(&req.id, &state.store.guardians(&filter))
}

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.guardian(id) {
        Some(g) => to_result(&req.id, g),
        None => err(&req.id, "not_found", format!("guardian {id} not found"), None),
    }
}

fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let new: NewGuardian = match parse_params(&req.id, &req.params) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.add_guardian(new) {
        Ok(saved) => to_result(&req.id, &saved),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let patch: GuardianPatch = match parse_params(&req.id, &req.params) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.update_guardian(id, patch) {
        Ok(saved) => to_result(&req.id, &saved),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.delete_guardian(id) {
        Ok(saved) => to_result(&req.id, &saved),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_restore(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.restore_guardian(id) {
        Ok(saved) => to_result(&req.id, &saved),
        Err(e) => store_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "guardians.list" => Some(handle_list(state, req)),
        "guardians.get" => Some(handle_get(state, req)),
        "guardians.create" => Some(handle_create(state, req)),
        "guardians.update" => Some(handle_update(state, req)),
        "guardians.delete" => Some(handle_delete(state, req)),
        "guardians.restore" => Some(handle_restore(state, req)),
        _ => None,
    }
}
