use crate::ipc::error::{err, ok, store_err};
use crate::ipc::helpers::{
    opt_date, opt_field, opt_i64, parse_params, require_date, require_i64, to_result,
};
use crate::ipc::types::{AppState, Request};
use crate::store::{CourseFilter, CoursePatch, DayPlan, NewCourse, NewException, ScheduleSlot};
use serde_json::json;

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let status = match opt_field(&req.id, &req.params, "status") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let filter = CourseFilter {
        status,
        teacher_id: opt_i64(&req.params, "teacherId"),
    };
    to_result(&req.id, &state.store.courses(&filter))
}

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.course(id) {
        Some(c) => to_result(&req.id, c),
        None => err(&req.id, "not_found", format!("course {id} not found"), None),
    }
}

fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let new: NewCourse = match parse_params(&req.id, &req.params) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.add_course(new) {
        Ok(saved) => to_result(&req.id, &saved),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let patch: CoursePatch = match parse_params(&req.id, &req.params) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.update_course(id, patch) {
        Ok(saved) => to_result(&req.id, &saved),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.delete_course(id) {
        Ok(saved) => to_result(&req.id, &saved),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_restore(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.restore_course(id) {
        Ok(saved) => to_result(&req.id, &saved),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_schedules(state: &mut AppState, req: &Request) -> serde_json::Value {
    let course_id = match require_i64(&req.id, &req.params, "courseId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    to_result(&req.id, &state.store.schedules_for_course(course_id))
}

fn handle_set_schedule(state: &mut AppState, req: &Request) -> serde_json::Value {
    let slot: ScheduleSlot = match parse_params(&req.id, &req.params) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.set_schedule(slot) {
        Ok(saved) => to_result(&req.id, &saved),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_delete_schedule(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.delete_schedule(id) {
        Ok(()) => ok(&req.id, json!({ "deleted": true })),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_exceptions(state: &mut AppState, req: &Request) -> serde_json::Value {
    let date = match opt_date(&req.id, &req.params, "date") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    to_result(&req.id, &state.store.schedule_exceptions(date))
}

fn handle_add_exception(state: &mut AppState, req: &Request) -> serde_json::Value {
    let new: NewException = match parse_params(&req.id, &req.params) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.add_schedule_exception(new) {
        Ok(saved) => to_result(&req.id, &saved),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_delete_exception(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match require_i64(&req.id, &req.params, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.delete_schedule_exception(id) {
        Ok(()) => ok(&req.id, json!({ "deleted": true })),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_day_plan(state: &mut AppState, req: &Request) -> serde_json::Value {
    let course_id = match require_i64(&req.id, &req.params, "courseId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let date = match require_date(&req.id, &req.params, "date") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let plan = match state.store.day_plan(course_id, date) {
        DayPlan::Closed => json!({ "open": false }),
        DayPlan::Open { in_time, out_time } => json!({
            "open": true,
            "inTime": in_time.to_string(),
            "outTime": out_time.to_string(),
        }),
    };
    ok(&req.id, plan)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "courses.list" => Some(handle_list(state, req)),
        "courses.get" => Some(handle_get(state, req)),
        "courses.create" => Some(handle_create(state, req)),
        "courses.update" => Some(handle_update(state, req)),
        "courses.delete" => Some(handle_delete(state, req)),
        "courses.restore" => Some(handle_restore(state, req)),
        "courses.schedules" => Some(handle_schedules(state, req)),
        "courses.setSchedule" => Some(handle_set_schedule(state, req)),
        "courses.deleteSchedule" => Some(handle_delete_schedule(state, req)),
        "courses.exceptions" => Some(handle_exceptions(state, req)),
        "courses.addException" => Some(handle_add_exception(state, req)),
        "courses.deleteException" => Some(handle_delete_exception(state, req)),
        "courses.dayPlan" => Some(handle_day_plan(state, req)),
        _ => None,
    }
}
