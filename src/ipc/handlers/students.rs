use crate::ipc::error::{err, ok, store_err};
use crate::ipc::helpers::{opt_i64, opt_str, parse_params, require_i64, to_result};
use crate::ipc::types::{AppState, Request};
use crate::store::{NewStudent, StudentFilter, StudentPatch};
use serde_json::json;

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let filter = StudentFilter {
        course_id: opt_i64(&req.params, "courseId"),
        name: opt_str(&req.params, "name"),
    };
    to_result(&req.id, &state.store.students(&filter))
}

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.student(id) {
        Some(s) => to_result(&req.id, s),
        None => err(&req.id, "not_found", format!("student {id} not found"), None),
    }
}

fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let new: NewStudent = match parse_params(&req.id, &req.params) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.add_student(new) {
        Ok(saved) => to_result(&req.id, &saved),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let patch: StudentPatch = match parse_params(&req.id, &req.params) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.update_student(id, patch) {
        Ok(saved) => to_result(&req.id, &saved),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.delete_student(id) {
        Ok(()) => ok(&req.id, json!({ "deleted": true })),
        Err(e) => store_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_list(state, req)),
        "students.get" => Some(handle_get(state, req)),
        "students.create" => Some(handle_create(state, req)),
        "students.update" => Some(handle_update(state, req)),
        "students.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
