//! Staff and gate hardware: teachers and kiosk devices.

use crate::ipc::error::{err, ok, store_err};
use crate::ipc::helpers::{opt_field, opt_str, parse_params, require_i64, to_result};
use crate::ipc::types::{AppState, Request};
use crate::store::{DevicePatch, NewDevice, NewTeacher, TeacherFilter, TeacherPatch};
use serde_json::json;

fn handle_devices_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    to_result(&req.id, &state.store.devices())
}

fn handle_devices_register(state: &mut AppState, req: &Request) -> serde_json::Value {
    let new: NewDevice = match parse_params(&req.id, &req.params) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.register_device(new) {
        Ok(saved) => to_result(&req.id, &saved),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_devices_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let patch: DevicePatch = match parse_params(&req.id, &req.params) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.update_device(id, patch) {
        Ok(saved) => to_result(&req.id, &saved),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_devices_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.delete_device(id) {
        Ok(()) => ok(&req.id, json!({ "deleted": true })),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_teachers_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let status = match opt_field(&req.id, &req.params, "status") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let filter = TeacherFilter {
        status,
        name: opt_str(&req.params, "name"),
    };
    to_result(&req.id, &state.store.teachers(&filter))
}

fn handle_teachers_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.teacher(id) {
        Some(t) => to_result(&req.id, t),
        None => err(&req.id, "not_found", format!("teacher {id} not found"), None),
    }
}

fn handle_teachers_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let new: NewTeacher = match parse_params(&req.id, &req.params) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.add_teacher(new) {
        Ok(saved) => to_result(&req.id, &saved),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_teachers_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let patch: TeacherPatch = match parse_params(&req.id, &req.params) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.update_teacher(id, patch) {
        Ok(saved) => to_result(&req.id, &saved),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_teachers_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.delete_teacher(id) {
        Ok(saved) => to_result(&req.id, &saved),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_teachers_restore(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.restore_teacher(id) {
        Ok(saved) => to_result(&req.id, &saved),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_teachers_courses(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    to_result(&req.id, &state.store.courses_for_teacher(id))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "devices.list" => Some(handle_devices_list(state, req)),
        "devices.register" => Some(handle_devices_register(state, req)),
        "devices.update" => Some(handle_devices_update(state, req)),
        "devices.delete" => Some(handle_devices_delete(state, req)),
        "teachers.list" => Some(handle_teachers_list(state, req)),
        "teachers.get" => Some(handle_teachers_get(state, req)),
        "teachers.create" => Some(handle_teachers_create(state, req)),
        "teachers.update" => Some(handle_teachers_update(state, req)),
        "teachers.delete" => Some(handle_teachers_delete(state, req)),
        "teachers.restore" => Some(handle_teachers_restore(state, req)),
        "teachers.courses" => Some(handle_teachers_courses(state, req)),
        _ => None,
    }
}
