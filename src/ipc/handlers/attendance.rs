use crate::ipc::error::{ok, store_err};
use crate::ipc::helpers::{
    opt_date, opt_field, opt_i64, parse_params, require_date, require_i64, to_result,
};
use crate::ipc::types::{AppState, Request};
use crate::store::{EventFilter, NewEvent, StatScope};
use serde_json::json;

fn handle_record(state: &mut AppState, req: &Request) -> serde_json::Value {
    let new: NewEvent = match parse_params(&req.id, &req.params) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.record_event(new) {
        Ok(saved) => to_result(&req.id, &saved),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let kind = match opt_field(&req.id, &req.params, "kind") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let source = match opt_field(&req.id, &req.params, "source") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let from = match opt_date(&req.id, &req.params, "from") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let to = match opt_date(&req.id, &req.params, "to") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let filter = EventFilter {
        student_id: opt_i64(&req.params, "studentId"),
        course_id: opt_i64(&req.params, "courseId"),
        kind,
        source,
        from,
        to,
    };
    to_result(&req.id, &state.store.events(&filter))
}

fn handle_stats_today(state: &mut AppState, req: &Request) -> serde_json::Value {
    to_result(&req.id, &state.store.today_stats())
}

fn handle_stats(state: &mut AppState, req: &Request) -> serde_json::Value {
    let date = match require_date(&req.id, &req.params, "date") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let scope = match opt_i64(&req.params, "courseId") {
        Some(cid) => StatScope::Course(cid),
        None => StatScope::School,
    };
    to_result(&req.id, &state.store.stats_for(date, scope))
}

fn handle_percentage(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match require_i64(&req.id, &req.params, "studentId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let from = match require_date(&req.id, &req.params, "from") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let to = match require_date(&req.id, &req.params, "to") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let pct = state.store.attendance_percentage(student_id, from, to);
    ok(&req.id, json!({ "percentage": pct }))
}

fn handle_export_csv(state: &mut AppState, req: &Request) -> serde_json::Value {
    let from = match require_date(&req.id, &req.params, "from") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let to = match require_date(&req.id, &req.params, "to") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.export_attendance_csv(from, to) {
        Ok(bytes) => ok(
            &req.id,
            json!({ "csv": String::from_utf8_lossy(&bytes).into_owned() }),
        ),
        Err(e) => store_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.record" => Some(handle_record(state, req)),
        "attendance.list" => Some(handle_list(state, req)),
        "attendance.statsToday" => Some(handle_stats_today(state, req)),
        "attendance.stats" => Some(handle_stats(state, req)),
        "attendance.percentage" => Some(handle_percentage(state, req)),
        "attendance.exportCsv" => Some(handle_export_csv(state, req)),
        _ => None,
    }
}
