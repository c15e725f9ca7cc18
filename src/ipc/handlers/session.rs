use crate::ipc::error::{err, ok, store_err};
use crate::ipc::helpers::{opt_bool, opt_i64, require_str};
use crate::ipc::types::{AppState, Request};
use crate::model::Role;
use serde_json::json;

fn status_json(state: &AppState) -> serde_json::Value {
    json!({
        "role": state.store.current_role().map(|r| r.as_str()),
        "guardianId": state.store.current_guardian().map(|g| g.id),
        "tenant": serde_json::to_value(state.store.tenant()).unwrap_or(serde_json::Value::Null),
        "remote": state.store.remote_active(),
        "darkMode": state.store.dark_mode(),
    })
}

fn handle_status(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, status_json(state))
}

fn handle_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let token = match require_str(&req.id, &req.params, "token") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.login_with_token(&token) {
        Ok(()) => ok(&req.id, status_json(state)),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_demo(state: &mut AppState, req: &Request) -> serde_json::Value {
    let raw = match require_str(&req.id, &req.params, "role") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(role) = Role::parse(&raw) else {
        return err(&req.id, "bad_params", format!("unknown role: {raw}"), None);
    };
    let guardian_id = opt_i64(&req.params, "guardianId");
    match state.store.enter_demo(role, guardian_id) {
        Ok(()) => ok(&req.id, status_json(state)),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_logout(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.store.logout();
    ok(&req.id, status_json(state))
}

fn handle_feature(state: &mut AppState, req: &Request) -> serde_json::Value {
    let name = match require_str(&req.id, &req.params, "name") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    ok(
        &req.id,
        json!({ "name": name, "enabled": state.store.feature_enabled(&name) }),
    )
}

fn handle_set_dark_mode(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(on) = opt_bool(&req.params, "on") else {
        return err(&req.id, "bad_params", "missing on", None);
    };
    match state.store.set_dark_mode(on) {
        Ok(()) => ok(&req.id, json!({ "darkMode": on })),
        Err(e) => store_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "session.status" => Some(handle_status(state, req)),
        "session.login" => Some(handle_login(state, req)),
        "session.demo" => Some(handle_demo(state, req)),
        "session.logout" => Some(handle_logout(state, req)),
        "session.feature" => Some(handle_feature(state, req)),
        "session.setDarkMode" => Some(handle_set_dark_mode(state, req)),
        _ => None,
    }
}
